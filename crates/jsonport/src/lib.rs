// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-driven JSON conversion for runtime-described records.
//!
//! Converts structured application values — records with named typed
//! fields, enumerations, date/time values and nested containers — into a
//! JSON value tree and back, preserving enough declared-type information to
//! reconstruct the original value exactly.
//!
//! # Features
//!
//! - **TypeExpr / SchemaRegistry**: declare record and enumeration types at
//!   runtime
//! - **TypeDescriptor**: declared types resolve once into immutable shape
//!   descriptors, memoized in bounded LRU caches
//! - **Dispatch engine**: a single recursive match over descriptor tags
//!   drives both conversion directions; round trips are exact
//! - **File codec**: atomic file writes with transparent gzip compression
//!   on `.gz` / `.gzip` suffixes
//!
//! # Example
//!
//! ```rust
//! use jsonport::{JsonPort, RecordBuilder, TypeExpr, Value};
//!
//! let mut port = JsonPort::new();
//! port.register_record(
//!     RecordBuilder::new("User")
//!         .field("name", TypeExpr::Str)
//!         .field("age", TypeExpr::Int)
//!         .build(),
//! )
//! .unwrap();
//!
//! let user = Value::record(
//!     "User",
//!     [("name", Value::from("John")), ("age", Value::from(30i64))],
//! );
//!
//! let wire = port.dump(&user).unwrap();
//! assert_eq!(wire["name"], "John");
//!
//! let back = port.load(&wire, &TypeExpr::named("User")).unwrap();
//! assert_eq!(back, user);
//! ```

mod builder;
mod cache;
mod descriptor;
mod error;
mod file;
mod port;
mod resolver;
mod schema;
mod timefmt;
mod value;
mod wire;

pub use builder::{EnumBuilder, RecordBuilder};
pub use cache::{DescriptorCache, LookupStats};
pub use descriptor::{
    EnumDescriptor, EnumMember, FieldDescriptor, MapDescriptor, RecordDescriptor, TupleDescriptor,
    TypeDescriptor, TypeKind,
};
pub use error::{
    DeserializationError, FileError, PortError, ResolveError, SerializationError,
};
pub use port::JsonPort;
pub use resolver::{CacheStats, TypeResolver, HINT_CACHE_CAPACITY, NAMED_CACHE_CAPACITY};
pub use schema::{
    EnumDecl, EnumLiteral, FieldDecl, RecordDecl, SchemaError, SchemaRegistry, TypeDecl, TypeExpr,
};
pub use value::{DateTimeValue, EnumValue, RecordValue, Value};

#[cfg(test)]
mod tests;
