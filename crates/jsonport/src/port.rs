// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The public conversion engine: a schema registry plus a cached resolver.

use serde_json::Value as JsonValue;

use crate::error::{DeserializationError, SerializationError};
use crate::resolver::{CacheStats, TypeResolver};
use crate::schema::{EnumDecl, RecordDecl, SchemaError, SchemaRegistry, TypeExpr};
use crate::value::Value;
use crate::wire::{JsonDecoder, JsonEncoder};

/// Type-driven JSON conversion engine.
///
/// Holds the registered type declarations and the descriptor caches.
/// Registration takes `&mut self`; conversions take `&self` and are safe to
/// run concurrently from multiple threads.
pub struct JsonPort {
    registry: SchemaRegistry,
    resolver: TypeResolver,
}

impl JsonPort {
    /// Create an engine with default cache capacities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
            resolver: TypeResolver::new(),
        }
    }

    /// Create an engine with explicit cache capacities (named types /
    /// optional-union hints).
    #[must_use]
    pub fn with_cache_capacities(named: usize, hints: usize) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            resolver: TypeResolver::with_capacities(named, hints),
        }
    }

    /// Register a record declaration.
    pub fn register_record(&mut self, decl: RecordDecl) -> Result<(), SchemaError> {
        self.registry.register_record(decl)
    }

    /// Register an enumeration declaration.
    pub fn register_enum(&mut self, decl: EnumDecl) -> Result<(), SchemaError> {
        self.registry.register_enum(decl)
    }

    /// The registered declarations.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Serialize a value to its JSON wire form, deriving the declared type
    /// from the value itself (records and enumerations by their type name).
    pub fn dump(&self, value: &Value) -> Result<JsonValue, SerializationError> {
        let expr = infer_expr(value);
        self.dump_as(value, &expr)
    }

    /// Serialize a value against an explicit declared type.
    pub fn dump_as(
        &self,
        value: &Value,
        expr: &TypeExpr,
    ) -> Result<JsonValue, SerializationError> {
        let descriptor = self.resolver.resolve(expr, &self.registry)?;
        JsonEncoder::new(&self.resolver, &self.registry).encode(value, &descriptor)
    }

    /// Reconstruct a value of the declared type from its JSON wire form.
    pub fn load(
        &self,
        json: &JsonValue,
        expr: &TypeExpr,
    ) -> Result<Value, DeserializationError> {
        let descriptor = self.resolver.resolve(expr, &self.registry)?;
        JsonDecoder::new(&self.resolver, &self.registry).decode(json, &descriptor)
    }

    /// Hit/miss counters of the descriptor caches.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.stats()
    }

    /// Drop all cached descriptors; later conversions recompute them from
    /// the registered declarations.
    pub fn clear_caches(&self) {
        self.resolver.clear();
    }
}

impl Default for JsonPort {
    fn default() -> Self {
        Self::new()
    }
}

/// Declared-type expression of a value's own runtime shape.
///
/// Records and enumerations carry their type name; container element types
/// are unified across the elements, distinct shapes becoming a union in
/// first-seen order. Inference stops at record boundaries (a nested record
/// contributes only its name), so it terminates even on cyclic graphs.
fn infer_expr(value: &Value) -> TypeExpr {
    match value {
        Value::Null => TypeExpr::Null,
        Value::Bool(_) => TypeExpr::Bool,
        Value::Int(_) => TypeExpr::Int,
        Value::Float(_) => TypeExpr::Float,
        Value::Str(_) => TypeExpr::Str,
        Value::DateTime(_) => TypeExpr::DateTime,
        Value::Date(_) => TypeExpr::Date,
        Value::Time(_) => TypeExpr::Time,
        Value::Enum(ev) => TypeExpr::Named(ev.type_name.clone()),
        Value::Record(record) => TypeExpr::Named(record.type_name().to_string()),
        Value::List(items) => TypeExpr::List(Box::new(unify(items.iter()))),
        Value::Set(items) => TypeExpr::Set(Box::new(unify(items.iter()))),
        Value::Tuple(items) => TypeExpr::Tuple(items.iter().map(infer_expr).collect()),
        Value::Map(entries) => {
            if entries.is_empty() {
                // No entries to carry type information; an empty object
                // serializes the same under any key/value types.
                return TypeExpr::map(TypeExpr::Str, TypeExpr::Null);
            }
            TypeExpr::Map(
                Box::new(unify(entries.iter().map(|(key, _)| key))),
                Box::new(unify(entries.iter().map(|(_, value)| value))),
            )
        }
    }
}

fn unify<'a>(items: impl Iterator<Item = &'a Value>) -> TypeExpr {
    let mut seen: Vec<TypeExpr> = Vec::new();
    for item in items {
        let expr = infer_expr(item);
        if !seen.contains(&expr) {
            seen.push(expr);
        }
    }
    match seen.len() {
        // An empty container carries no element information.
        0 => TypeExpr::Null,
        1 => seen.remove(0),
        _ => TypeExpr::Union(seen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_scalars_and_records() {
        assert_eq!(infer_expr(&Value::from(1i64)), TypeExpr::Int);
        assert_eq!(infer_expr(&Value::Null), TypeExpr::Null);

        let user = Value::record("User", [("name", Value::from("John"))]);
        assert_eq!(infer_expr(&user), TypeExpr::named("User"));

        let role = Value::enum_member("Role", "ADMIN");
        assert_eq!(infer_expr(&role), TypeExpr::named("Role"));
    }

    #[test]
    fn infer_unifies_container_elements() {
        let homogeneous = Value::List(vec![Value::from(1i64), Value::from(2i64)]);
        assert_eq!(infer_expr(&homogeneous), TypeExpr::list(TypeExpr::Int));

        let mixed = Value::List(vec![Value::from(1i64), Value::from("two")]);
        assert_eq!(
            infer_expr(&mixed),
            TypeExpr::list(TypeExpr::union(vec![TypeExpr::Int, TypeExpr::Str]))
        );

        let empty = Value::List(vec![]);
        assert_eq!(infer_expr(&empty), TypeExpr::list(TypeExpr::Null));
    }

    #[test]
    fn infer_tuple_is_positional() {
        let pair = Value::Tuple(vec![Value::from(1i64), Value::from("x")]);
        assert_eq!(
            infer_expr(&pair),
            TypeExpr::tuple(vec![TypeExpr::Int, TypeExpr::Str])
        );
    }

    #[test]
    fn infer_empty_map_serializes() {
        let port = JsonPort::new();
        let wire = port.dump(&Value::Map(vec![])).unwrap();
        assert_eq!(wire, serde_json::json!({}));
    }
}
