// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shape descriptors: the normalized form declared types are resolved into.
//!
//! A [`TypeDescriptor`] is immutable once built and shared via [`Arc`]; the
//! conversion engine dispatches on its [`TypeKind`] tag instead of
//! re-inspecting runtime values. Descriptors are acyclic even for recursive
//! record declarations: a named type appearing in a nested position stays a
//! by-name [`TypeKind::Ref`] that is looked up (through the cache) when the
//! engine reaches it.

use std::sync::Arc;

use crate::schema::EnumLiteral;
use crate::value::Value;

/// Shape tag enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
    DateTime,
    Date,
    Time,
    /// Enumeration with its member table.
    Enum(EnumDescriptor),
    /// Record with its ordered field list.
    Record(RecordDescriptor),
    List(Arc<TypeDescriptor>),
    Set(Arc<TypeDescriptor>),
    Tuple(TupleDescriptor),
    Map(MapDescriptor),
    Optional(Arc<TypeDescriptor>),
    /// Ordered alternatives, tried in declaration order.
    Union(Vec<Arc<TypeDescriptor>>),
    /// Deferred by-name reference to a registered record or enumeration.
    Ref(String),
}

/// A complete shape descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Human-readable type name, used in diagnostics.
    pub name: String,
    /// Shape kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Check if this is a record descriptor.
    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    /// Check if this is an enumeration descriptor.
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    /// Get fields if this is a record.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Record(rec) => Some(&rec.fields),
            _ => None,
        }
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields()?.iter().find(|f| f.name == name)
    }
}

/// Field descriptor for record members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Field shape.
    pub descriptor: Arc<TypeDescriptor>,
    /// Default value used when input data omits the field.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// Create a required field descriptor.
    pub fn new(name: impl Into<String>, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            descriptor,
            default: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the field carries a default.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Record shape: name plus ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Enumeration member.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumLiteral,
}

/// Enumeration shape: the declared member table in order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    /// Get a member by name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Raw value of a member, if it exists.
    pub fn value_of(&self, member: &str) -> Option<&EnumLiteral> {
        self.member(member).map(|m| &m.value)
    }

    /// Member owning a raw value. When several members share a value, the
    /// first declared member wins.
    pub fn member_for(&self, value: &EnumLiteral) -> Option<&str> {
        self.members
            .iter()
            .find(|m| &m.value == value)
            .map(|m| m.name.as_str())
    }
}

/// Tuple shape: fixed arity with one descriptor per position, or a
/// homogeneous variadic element descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleDescriptor {
    Fixed(Vec<Arc<TypeDescriptor>>),
    Variadic(Arc<TypeDescriptor>),
}

/// Mapping shape: key and value descriptors. Keys are stringified on the
/// wire and parsed back through the key descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDescriptor {
    pub key: Arc<TypeDescriptor>,
    pub value: Arc<TypeDescriptor>,
}
