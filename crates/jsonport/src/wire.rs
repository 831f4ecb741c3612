// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The conversion engine: descriptor-driven encoding to and decoding from
//! the JSON wire form.
//!
//! Both directions are single recursive matches over [`TypeKind`]; the
//! engine never re-inspects runtime values beyond what the descriptor
//! already encodes. A conversion either fully succeeds or fails with one
//! error — nothing is retried and no partial result is produced.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::descriptor::{
    EnumDescriptor, RecordDescriptor, TupleDescriptor, TypeDescriptor, TypeKind,
};
use crate::error::{DeserializationError, SerializationError};
use crate::resolver::TypeResolver;
use crate::schema::{EnumLiteral, SchemaRegistry};
use crate::timefmt;
use crate::value::{EnumValue, RecordValue, Value};

// ---------------------------------------------------------------------------
// CycleGuard
// ---------------------------------------------------------------------------

/// Records on the active serialization path, tracked by identity.
///
/// An entry is removed on the way back up, so two siblings sharing a
/// sub-object are legal; only a genuine ancestor cycle is rejected.
struct CycleGuard {
    visiting: HashSet<usize>,
}

impl CycleGuard {
    fn new() -> Self {
        Self {
            visiting: HashSet::new(),
        }
    }

    fn enter(&mut self, record: &Arc<RecordValue>) -> bool {
        self.visiting.insert(Arc::as_ptr(record) as usize)
    }

    fn leave(&mut self, record: &Arc<RecordValue>) {
        self.visiting.remove(&(Arc::as_ptr(record) as usize));
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encodes runtime values into JSON wire values.
pub(crate) struct JsonEncoder<'a> {
    resolver: &'a TypeResolver,
    registry: &'a SchemaRegistry,
}

impl<'a> JsonEncoder<'a> {
    pub(crate) fn new(resolver: &'a TypeResolver, registry: &'a SchemaRegistry) -> Self {
        Self { resolver, registry }
    }

    /// Encode a complete value. The cycle guard lives exactly as long as
    /// this one top-level call.
    pub(crate) fn encode(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<JsonValue, SerializationError> {
        let mut guard = CycleGuard::new();
        self.encode_value(value, descriptor, &mut guard)
    }

    fn encode_value(
        &self,
        value: &Value,
        descriptor: &TypeDescriptor,
        guard: &mut CycleGuard,
    ) -> Result<JsonValue, SerializationError> {
        match &descriptor.kind {
            TypeKind::Null => match value {
                Value::Null => Ok(JsonValue::Null),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Bool => match value {
                Value::Bool(b) => Ok(JsonValue::Bool(*b)),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Int => match value {
                Value::Int(i) => Ok(JsonValue::from(*i)),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Float => match value {
                Value::Float(x) => encode_float(*x),
                // An integer value under a float declaration widens.
                Value::Int(i) => encode_float(*i as f64),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Str => match value {
                Value::Str(s) => Ok(JsonValue::String(s.clone())),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::DateTime => match value {
                Value::DateTime(dt) => Ok(JsonValue::String(timefmt::format_datetime(dt))),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Date => match value {
                Value::Date(d) => Ok(JsonValue::String(timefmt::format_date(d))),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Time => match value {
                Value::Time(t) => Ok(JsonValue::String(timefmt::format_time(t))),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Enum(en) => match value {
                Value::Enum(ev) => self.encode_enum(en, ev),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Record(rec) => match value {
                Value::Record(record) => self.encode_record(record, rec, guard),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::List(elem) => match value {
                Value::List(items) => self.encode_elements(items, elem, guard),
                other => Err(self.mismatch(descriptor, other)),
            },
            // Set element order on the wire is unspecified.
            TypeKind::Set(elem) => match value {
                Value::Set(items) => self.encode_elements(items, elem, guard),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Tuple(tuple) => match value {
                Value::Tuple(items) => self.encode_tuple(items, tuple, guard),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Map(map) => match value {
                Value::Map(entries) => {
                    let mut object = JsonMap::new();
                    for (key, val) in entries {
                        let key = self.key_to_string(key, &map.key)?;
                        object.insert(key, self.encode_value(val, &map.value, guard)?);
                    }
                    Ok(JsonValue::Object(object))
                }
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Optional(inner) => match value {
                Value::Null => Ok(JsonValue::Null),
                other => self.encode_value(other, inner, guard),
            },
            TypeKind::Union(alternatives) => {
                for alt in alternatives {
                    if self.accepts(value, alt) {
                        return self.encode_value(value, alt, guard);
                    }
                }
                Err(SerializationError::NoUnionMatch {
                    expected: descriptor.name.clone(),
                    found: value.kind_name().to_string(),
                })
            }
            TypeKind::Ref(name) => {
                let resolved = self.resolver.resolve_named(name, self.registry)?;
                self.encode_value(value, &resolved, guard)
            }
        }
    }

    fn encode_enum(
        &self,
        en: &EnumDescriptor,
        ev: &EnumValue,
    ) -> Result<JsonValue, SerializationError> {
        let literal = en.value_of(&ev.member).ok_or_else(|| {
            SerializationError::UnsupportedValue {
                expected: format!("member of `{}`", en.name),
                found: format!("{}.{}", ev.type_name, ev.member),
            }
        })?;
        Ok(literal_to_json(literal))
    }

    fn encode_record(
        &self,
        record: &Arc<RecordValue>,
        rec: &RecordDescriptor,
        guard: &mut CycleGuard,
    ) -> Result<JsonValue, SerializationError> {
        if !guard.enter(record) {
            return Err(SerializationError::CircularReference {
                object_type: record.type_name().to_string(),
            });
        }
        let result = self.encode_record_fields(record, rec, guard);
        guard.leave(record);
        result
    }

    fn encode_record_fields(
        &self,
        record: &Arc<RecordValue>,
        rec: &RecordDescriptor,
        guard: &mut CycleGuard,
    ) -> Result<JsonValue, SerializationError> {
        let mut object = JsonMap::new();
        for field in &rec.fields {
            let encoded = record.with_field(&field.name, |value| match value {
                Some(value) => self.encode_value(value, &field.descriptor, guard),
                None => Err(SerializationError::MissingField {
                    object_type: rec.name.clone(),
                    field: field.name.clone(),
                }),
            })?;
            object.insert(field.name.clone(), encoded);
        }
        Ok(JsonValue::Object(object))
    }

    fn encode_elements(
        &self,
        items: &[Value],
        elem: &TypeDescriptor,
        guard: &mut CycleGuard,
    ) -> Result<JsonValue, SerializationError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.encode_value(item, elem, guard)?);
        }
        Ok(JsonValue::Array(out))
    }

    fn encode_tuple(
        &self,
        items: &[Value],
        tuple: &TupleDescriptor,
        guard: &mut CycleGuard,
    ) -> Result<JsonValue, SerializationError> {
        match tuple {
            TupleDescriptor::Fixed(slots) => {
                if items.len() != slots.len() {
                    return Err(SerializationError::UnsupportedValue {
                        expected: format!("tuple of {} elements", slots.len()),
                        found: format!("tuple of {} elements", items.len()),
                    });
                }
                let mut out = Vec::with_capacity(items.len());
                for (item, slot) in items.iter().zip(slots) {
                    out.push(self.encode_value(item, slot, guard)?);
                }
                Ok(JsonValue::Array(out))
            }
            TupleDescriptor::Variadic(elem) => self.encode_elements(items, elem, guard),
        }
    }

    /// Canonical string form of a map key.
    fn key_to_string(
        &self,
        key: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<String, SerializationError> {
        match (&descriptor.kind, key) {
            (TypeKind::Str, Value::Str(s)) => Ok(s.clone()),
            (TypeKind::Int, Value::Int(i)) => Ok(i.to_string()),
            (TypeKind::Bool, Value::Bool(b)) => Ok(b.to_string()),
            (TypeKind::Float, Value::Float(x)) => Ok(x.to_string()),
            (TypeKind::DateTime, Value::DateTime(dt)) => Ok(timefmt::format_datetime(dt)),
            (TypeKind::Date, Value::Date(d)) => Ok(timefmt::format_date(d)),
            (TypeKind::Time, Value::Time(t)) => Ok(timefmt::format_time(t)),
            (TypeKind::Enum(en), Value::Enum(ev)) => {
                let literal = en.value_of(&ev.member).ok_or_else(|| {
                    SerializationError::UnsupportedValue {
                        expected: format!("member of `{}`", en.name),
                        found: format!("{}.{}", ev.type_name, ev.member),
                    }
                })?;
                Ok(literal.to_string())
            }
            (TypeKind::Ref(name), _) => {
                let resolved = self.resolver.resolve_named(name, self.registry)?;
                self.key_to_string(key, &resolved)
            }
            (_, other) => Err(self.mismatch(descriptor, other)),
        }
    }

    /// Shallow shape test used to pick a union alternative for a value.
    fn accepts(&self, value: &Value, descriptor: &TypeDescriptor) -> bool {
        match (&descriptor.kind, value) {
            (TypeKind::Null, Value::Null) => true,
            (TypeKind::Bool, Value::Bool(_)) => true,
            (TypeKind::Int, Value::Int(_)) => true,
            (TypeKind::Float, Value::Float(_) | Value::Int(_)) => true,
            (TypeKind::Str, Value::Str(_)) => true,
            (TypeKind::DateTime, Value::DateTime(_)) => true,
            (TypeKind::Date, Value::Date(_)) => true,
            (TypeKind::Time, Value::Time(_)) => true,
            (TypeKind::Enum(en), Value::Enum(ev)) => en.name == ev.type_name,
            (TypeKind::Record(rec), Value::Record(r)) => rec.name == r.type_name(),
            (TypeKind::List(_), Value::List(_)) => true,
            (TypeKind::Set(_), Value::Set(_)) => true,
            (TypeKind::Tuple(_), Value::Tuple(_)) => true,
            (TypeKind::Map(_), Value::Map(_)) => true,
            (TypeKind::Optional(inner), v) => v.is_null() || self.accepts(v, inner),
            (TypeKind::Union(alts), v) => alts.iter().any(|alt| self.accepts(v, alt)),
            (TypeKind::Ref(name), Value::Record(r)) => r.type_name() == name.as_str(),
            (TypeKind::Ref(name), Value::Enum(ev)) => &ev.type_name == name,
            _ => false,
        }
    }

    fn mismatch(&self, descriptor: &TypeDescriptor, value: &Value) -> SerializationError {
        SerializationError::UnsupportedValue {
            expected: descriptor.name.clone(),
            found: value.kind_name().to_string(),
        }
    }
}

fn encode_float(x: f64) -> Result<JsonValue, SerializationError> {
    // JSON has no representation for NaN or infinities.
    Number::from_f64(x)
        .map(JsonValue::Number)
        .ok_or_else(|| SerializationError::UnsupportedValue {
            expected: "finite float".to_string(),
            found: format!("{}", x),
        })
}

fn literal_to_json(literal: &EnumLiteral) -> JsonValue {
    match literal {
        EnumLiteral::Str(s) => JsonValue::String(s.clone()),
        EnumLiteral::Int(i) => JsonValue::from(*i),
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Reconstructs runtime values from JSON wire values.
pub(crate) struct JsonDecoder<'a> {
    resolver: &'a TypeResolver,
    registry: &'a SchemaRegistry,
}

impl<'a> JsonDecoder<'a> {
    pub(crate) fn new(resolver: &'a TypeResolver, registry: &'a SchemaRegistry) -> Self {
        Self { resolver, registry }
    }

    pub(crate) fn decode(
        &self,
        json: &JsonValue,
        descriptor: &TypeDescriptor,
    ) -> Result<Value, DeserializationError> {
        match &descriptor.kind {
            TypeKind::Null => match json {
                JsonValue::Null => Ok(Value::Null),
                other => Err(self.mismatch(descriptor, other)),
            },
            TypeKind::Bool => json
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| self.mismatch(descriptor, json)),
            TypeKind::Int => json
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| self.mismatch(descriptor, json)),
            // `as_f64` also covers JSON integers, which widen into a
            // declared float.
            TypeKind::Float => json
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| self.mismatch(descriptor, json)),
            TypeKind::Str => json
                .as_str()
                .map(|s| Value::Str(s.to_string()))
                .ok_or_else(|| self.mismatch(descriptor, json)),
            TypeKind::DateTime => {
                let text = json.as_str().ok_or_else(|| self.mismatch(descriptor, json))?;
                timefmt::parse_datetime(text)
                    .map(Value::DateTime)
                    .ok_or_else(|| invalid_datetime("datetime", text))
            }
            TypeKind::Date => {
                let text = json.as_str().ok_or_else(|| self.mismatch(descriptor, json))?;
                timefmt::parse_date(text)
                    .map(Value::Date)
                    .ok_or_else(|| invalid_datetime("date", text))
            }
            TypeKind::Time => {
                let text = json.as_str().ok_or_else(|| self.mismatch(descriptor, json))?;
                timefmt::parse_time(text)
                    .map(Value::Time)
                    .ok_or_else(|| invalid_datetime("time", text))
            }
            TypeKind::Enum(en) => self.decode_enum(json, en),
            TypeKind::Record(rec) => self.decode_record(json, rec),
            TypeKind::List(elem) => {
                let items = self.decode_elements(json, descriptor, elem)?;
                Ok(Value::List(items))
            }
            TypeKind::Set(elem) => {
                let items = self.decode_elements(json, descriptor, elem)?;
                // Set semantics: duplicate wire elements collapse silently.
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::Set(unique))
            }
            TypeKind::Tuple(tuple) => self.decode_tuple(json, descriptor, tuple),
            TypeKind::Map(map) => {
                let object = match json {
                    JsonValue::Object(object) => object,
                    other => return Err(self.mismatch(descriptor, other)),
                };
                let mut entries = Vec::with_capacity(object.len());
                for (key, val) in object {
                    entries.push((
                        self.key_from_string(key, &map.key)?,
                        self.decode(val, &map.value)?,
                    ));
                }
                Ok(Value::Map(entries))
            }
            TypeKind::Optional(inner) => {
                if json.is_null() {
                    Ok(Value::Null)
                } else {
                    self.decode(json, inner)
                }
            }
            TypeKind::Union(alternatives) => {
                // First alternative that reconstructs wins; declaration
                // order is the trial order.
                for alt in alternatives {
                    if let Ok(value) = self.decode(json, alt) {
                        return Ok(value);
                    }
                }
                Err(DeserializationError::NoUnionMatch {
                    expected: descriptor.name.clone(),
                    value: json.clone(),
                })
            }
            TypeKind::Ref(name) => {
                let resolved = self.resolver.resolve_named(name, self.registry)?;
                self.decode(json, &resolved)
            }
        }
    }

    fn decode_enum(
        &self,
        json: &JsonValue,
        en: &EnumDescriptor,
    ) -> Result<Value, DeserializationError> {
        let unknown = || DeserializationError::UnknownEnumValue {
            enum_name: en.name.clone(),
            value: json.clone(),
        };
        let literal = json_to_literal(json).ok_or_else(unknown)?;
        let member = en.member_for(&literal).ok_or_else(unknown)?;
        Ok(Value::Enum(EnumValue::new(en.name.clone(), member)))
    }

    fn decode_record(
        &self,
        json: &JsonValue,
        rec: &RecordDescriptor,
    ) -> Result<Value, DeserializationError> {
        let object = match json {
            JsonValue::Object(object) => object,
            other => {
                return Err(DeserializationError::TypeMismatch {
                    expected: rec.name.clone(),
                    value: other.clone(),
                })
            }
        };

        let record = RecordValue::new(rec.name.clone());
        for field in &rec.fields {
            match object.get(&field.name) {
                Some(raw) => {
                    record.set(field.name.clone(), self.decode(raw, &field.descriptor)?);
                }
                None => match &field.default {
                    Some(default) => record.set(field.name.clone(), default.clone()),
                    None => {
                        return Err(DeserializationError::MissingField {
                            object_type: rec.name.clone(),
                            field: field.name.clone(),
                        })
                    }
                },
            }
        }
        // Keys not declared on the record are ignored.
        Ok(Value::Record(Arc::new(record)))
    }

    fn decode_elements(
        &self,
        json: &JsonValue,
        descriptor: &TypeDescriptor,
        elem: &TypeDescriptor,
    ) -> Result<Vec<Value>, DeserializationError> {
        let items = match json {
            JsonValue::Array(items) => items,
            other => return Err(self.mismatch(descriptor, other)),
        };
        items.iter().map(|item| self.decode(item, elem)).collect()
    }

    fn decode_tuple(
        &self,
        json: &JsonValue,
        descriptor: &TypeDescriptor,
        tuple: &TupleDescriptor,
    ) -> Result<Value, DeserializationError> {
        let items = match json {
            JsonValue::Array(items) => items,
            other => return Err(self.mismatch(descriptor, other)),
        };
        match tuple {
            TupleDescriptor::Fixed(slots) => {
                if items.len() != slots.len() {
                    return Err(DeserializationError::LengthMismatch {
                        expected: slots.len(),
                        found: items.len(),
                    });
                }
                let values = items
                    .iter()
                    .zip(slots)
                    .map(|(item, slot)| self.decode(item, slot))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(values))
            }
            TupleDescriptor::Variadic(elem) => {
                let values = items
                    .iter()
                    .map(|item| self.decode(item, elem))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(values))
            }
        }
    }

    /// Invert the canonical key string back to the key descriptor's type.
    fn key_from_string(
        &self,
        key: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<Value, DeserializationError> {
        let invalid = || DeserializationError::InvalidMapKey {
            expected: descriptor.name.clone(),
            key: key.to_string(),
        };
        match &descriptor.kind {
            TypeKind::Str => Ok(Value::Str(key.to_string())),
            TypeKind::Int => key.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            TypeKind::Bool => match key {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            TypeKind::Float => key.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
            TypeKind::DateTime => timefmt::parse_datetime(key)
                .map(Value::DateTime)
                .ok_or_else(invalid),
            TypeKind::Date => timefmt::parse_date(key).map(Value::Date).ok_or_else(invalid),
            TypeKind::Time => timefmt::parse_time(key).map(Value::Time).ok_or_else(invalid),
            TypeKind::Enum(en) => {
                let member = en
                    .member_for(&EnumLiteral::Str(key.to_string()))
                    .or_else(|| {
                        key.parse::<i64>()
                            .ok()
                            .and_then(|i| en.member_for(&EnumLiteral::Int(i)))
                    })
                    .ok_or_else(invalid)?;
                Ok(Value::Enum(EnumValue::new(en.name.clone(), member)))
            }
            TypeKind::Ref(name) => {
                let resolved = self.resolver.resolve_named(name, self.registry)?;
                self.key_from_string(key, &resolved)
            }
            _ => Err(invalid()),
        }
    }

    fn mismatch(&self, descriptor: &TypeDescriptor, json: &JsonValue) -> DeserializationError {
        DeserializationError::TypeMismatch {
            expected: descriptor.name.clone(),
            value: json.clone(),
        }
    }
}

fn invalid_datetime(expected: &str, text: &str) -> DeserializationError {
    DeserializationError::InvalidDateTime {
        expected: expected.to_string(),
        value: text.to_string(),
    }
}

fn json_to_literal(json: &JsonValue) -> Option<EnumLiteral> {
    match json {
        JsonValue::String(s) => Some(EnumLiteral::Str(s.clone())),
        JsonValue::Number(n) => n.as_i64().map(EnumLiteral::Int),
        _ => None,
    }
}
