// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime value model.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::RwLock;

/// A date-time value, either naive or carrying a fixed UTC offset.
///
/// The two forms are kept apart so that the offset survives a round trip:
/// a naive value serializes without an offset suffix, a zoned one with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

/// A member of a declared enumeration, identified by type and member name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Name of the enumeration type.
    pub type_name: String,
    /// Name of the member within that enumeration.
    pub member: String,
}

impl EnumValue {
    /// Create an enum member value.
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

/// A record instance: a named bag of fields.
///
/// Records live behind [`Arc`] so value graphs may share sub-objects, and
/// the field map is lock-guarded so self-referential graphs can be wired up
/// after construction. Reference cycles are legal to *build*; serializing
/// one is rejected by the conversion engine.
#[derive(Debug)]
pub struct RecordValue {
    type_name: String,
    fields: RwLock<HashMap<String, Value>>,
}

impl RecordValue {
    /// Create an empty record of the given declared type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: RwLock::new(HashMap::new()),
        }
    }

    /// Create a record pre-populated with fields.
    pub fn with_fields<K, I>(type_name: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let record = Self::new(type_name);
        {
            let mut map = record.fields.write();
            for (name, value) in fields {
                map.insert(name.into(), value);
            }
        }
        record
    }

    /// Name of the declared record type this value belongs to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Get a field value by name (cloned).
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Set a field value by name.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.fields.write().insert(name.into(), value);
    }

    /// Run `f` against a borrowed field value, avoiding a clone.
    pub fn with_field<R>(&self, name: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let fields = self.fields.read();
        f(fields.get(name))
    }

    /// Whether the record currently holds a field of that name.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// Names of all fields currently set.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }

    /// Number of fields currently set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Returns `true` if no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && *self.fields.read() == *other.fields.read()
    }
}

/// A dynamic value that can hold any supported application shape.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTimeValue),
    Date(NaiveDate),
    Time(NaiveTime),
    /// A member of a declared enumeration.
    Enum(EnumValue),
    /// A record instance (shared, possibly part of a larger graph).
    Record(Arc<RecordValue>),
    List(Vec<Value>),
    /// Unique elements; element order carries no meaning.
    Set(Vec<Value>),
    Tuple(Vec<Value>),
    /// Ordered key/value pairs. Keys are typed values, not just strings.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Create a record value in one step.
    pub fn record<K, I>(type_name: impl Into<String>, fields: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(Arc::new(RecordValue::with_fields(type_name, fields)))
    }

    /// Create an enum member value.
    pub fn enum_member(type_name: impl Into<String>, member: impl Into<String>) -> Value {
        Value::Enum(EnumValue::new(type_name, member))
    }

    /// Check if value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as a record.
    pub fn as_record(&self) -> Option<&Arc<RecordValue>> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as a sequence of elements (list or tuple).
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) | Self::Tuple(v) | Self::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Enum(_) => "enum",
            Self::Record(_) => "record",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "map",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            // Set order is unspecified, so compare as unordered collections.
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.contains(x))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(DateTimeValue::Naive(v))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTime(DateTimeValue::Zoned(v))
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
