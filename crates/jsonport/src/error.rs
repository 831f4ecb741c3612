// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for the conversion engine.
//!
//! Every engine failure is either a [`SerializationError`] or a
//! [`DeserializationError`], both grouped under the [`PortError`] base kind.
//! There is no partial success: a detected problem aborts the whole
//! conversion. Each variant carries structured context so callers can build
//! field-level diagnostics without parsing messages.

use std::fmt;
use std::io;

use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// ResolveError
// ---------------------------------------------------------------------------

/// Failure while resolving a declared type into a shape descriptor.
///
/// Never surfaced on its own: it folds into whichever operation triggered
/// the resolution ([`SerializationError::Resolve`] or
/// [`DeserializationError::Resolve`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A named type was not found in the schema registry.
    UnknownType(String),
    /// A mapping key type with no reversible string form.
    InvalidMapKey { key_type: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(name) => write!(f, "unknown type `{}`", name),
            Self::InvalidMapKey { key_type } => {
                write!(f, "map key type `{}` has no string form", key_type)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

// ---------------------------------------------------------------------------
// SerializationError
// ---------------------------------------------------------------------------

/// Errors raised while converting a value to its wire form.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializationError {
    /// A record on the active path refers back to itself.
    CircularReference { object_type: String },
    /// The value's shape does not fit its declared type.
    UnsupportedValue { expected: String, found: String },
    /// A record value lacks a declared field.
    MissingField { object_type: String, field: String },
    /// The value matches none of a union's alternatives.
    NoUnionMatch { expected: String, found: String },
    /// The declared type could not be resolved.
    Resolve(ResolveError),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircularReference { object_type } => {
                write!(f, "circular reference detected in `{}`", object_type)
            }
            Self::UnsupportedValue { expected, found } => {
                write!(f, "cannot serialize: expected {}, found {}", expected, found)
            }
            Self::MissingField { object_type, field } => {
                write!(f, "record `{}` is missing field `{}`", object_type, field)
            }
            Self::NoUnionMatch { expected, found } => {
                write!(f, "value of kind {} matches no alternative of {}", found, expected)
            }
            Self::Resolve(err) => write!(f, "type resolution failed: {}", err),
        }
    }
}

impl std::error::Error for SerializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for SerializationError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}

// ---------------------------------------------------------------------------
// DeserializationError
// ---------------------------------------------------------------------------

/// Errors raised while reconstructing a value from its wire form.
#[derive(Debug, Clone, PartialEq)]
pub enum DeserializationError {
    /// Wire value has a different JSON type than the declared one expects.
    TypeMismatch { expected: String, value: JsonValue },
    /// A required record field is absent from the wire object.
    MissingField { object_type: String, field: String },
    /// A date/time string failed to parse.
    InvalidDateTime { expected: String, value: String },
    /// No enumeration member owns the wire value.
    UnknownEnumValue { enum_name: String, value: JsonValue },
    /// No union alternative reconstructed the wire value.
    NoUnionMatch { expected: String, value: JsonValue },
    /// A fixed-arity tuple received the wrong element count.
    LengthMismatch { expected: usize, found: usize },
    /// A stringified map key failed to parse back to its key type.
    InvalidMapKey { expected: String, key: String },
    /// The input was not valid JSON text.
    InvalidJson(String),
    /// The declared type could not be resolved.
    Resolve(ResolveError),
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, value } => {
                write!(f, "type mismatch: expected {}, got {}", expected, value)
            }
            Self::MissingField { object_type, field } => {
                write!(
                    f,
                    "missing required field `{}` for record `{}`",
                    field, object_type
                )
            }
            Self::InvalidDateTime { expected, value } => {
                write!(f, "invalid {} literal: `{}`", expected, value)
            }
            Self::UnknownEnumValue { enum_name, value } => {
                write!(f, "no member of `{}` has value {}", enum_name, value)
            }
            Self::NoUnionMatch { expected, value } => {
                write!(f, "{} matches no alternative of {}", value, expected)
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {} elements, got {}", expected, found)
            }
            Self::InvalidMapKey { expected, key } => {
                write!(f, "cannot parse map key `{}` as {}", key, expected)
            }
            Self::InvalidJson(msg) => write!(f, "invalid JSON: {}", msg),
            Self::Resolve(err) => write!(f, "type resolution failed: {}", err),
        }
    }
}

impl std::error::Error for DeserializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResolveError> for DeserializationError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}

// ---------------------------------------------------------------------------
// PortError
// ---------------------------------------------------------------------------

/// Base error kind covering both conversion directions.
#[derive(Debug, Clone, PartialEq)]
pub enum PortError {
    Serialization(SerializationError),
    Deserialization(DeserializationError),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialization(err) => write!(f, "serialization error: {}", err),
            Self::Deserialization(err) => write!(f, "deserialization error: {}", err),
        }
    }
}

impl std::error::Error for PortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Deserialization(err) => Some(err),
        }
    }
}

impl From<SerializationError> for PortError {
    fn from(err: SerializationError) -> Self {
        Self::Serialization(err)
    }
}

impl From<DeserializationError> for PortError {
    fn from(err: DeserializationError) -> Self {
        Self::Deserialization(err)
    }
}

// ---------------------------------------------------------------------------
// FileError
// ---------------------------------------------------------------------------

/// Errors from the file codec layered on top of the engine.
///
/// Byte-level I/O failures keep their native [`io::ErrorKind`]; only
/// codec-level failures (bad JSON, type mismatch) are engine kinds.
#[derive(Debug)]
pub enum FileError {
    Io(io::Error),
    Port(PortError),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Port(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Port(err) => Some(err),
        }
    }
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PortError> for FileError {
    fn from(err: PortError) -> Self {
        Self::Port(err)
    }
}

impl From<SerializationError> for FileError {
    fn from(err: SerializationError) -> Self {
        Self::Port(PortError::Serialization(err))
    }
}

impl From<DeserializationError> for FileError {
    fn from(err: DeserializationError) -> Self {
        Self::Port(PortError::Deserialization(err))
    }
}
