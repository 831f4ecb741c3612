// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record and enumeration declarations.

use crate::schema::{EnumDecl, EnumLiteral, FieldDecl, RecordDecl, TypeExpr};
use crate::value::Value;

/// Builder for record declarations.
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<FieldDecl>,
}

impl RecordBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, expr: TypeExpr) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            expr,
            default: None,
        });
        self
    }

    /// Add a field with a default used when input data omits it.
    pub fn field_default(
        mut self,
        name: impl Into<String>,
        expr: TypeExpr,
        default: Value,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            expr,
            default: Some(default),
        });
        self
    }

    /// Add an optional field defaulting to null.
    pub fn optional_field(mut self, name: impl Into<String>, expr: TypeExpr) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            expr: TypeExpr::optional(expr),
            default: Some(Value::Null),
        });
        self
    }

    /// Build the record declaration.
    pub fn build(self) -> RecordDecl {
        RecordDecl {
            name: self.name,
            fields: self.fields,
        }
    }
}

/// Builder for enumeration declarations.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    members: Vec<(String, EnumLiteral)>,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member with its raw value (a string or a number).
    pub fn member(mut self, name: impl Into<String>, value: impl Into<EnumLiteral>) -> Self {
        self.members.push((name.into(), value.into()));
        self
    }

    /// Build the enumeration declaration.
    pub fn build(self) -> EnumDecl {
        EnumDecl {
            name: self.name,
            members: self.members,
        }
    }
}
