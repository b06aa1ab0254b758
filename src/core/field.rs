//! Typed key/value attributes for structured records
//!
//! This module provides:
//! - `FieldValue`: the value of an attribute, including nested groups
//! - `Field`: one ordered key/value pair
//! - `ScopedFields`: fields accumulated on a logger, each remembering the
//!   group path that was open when it was added

use serde::{Serialize, Serializer};
use std::fmt;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// Nested attributes, rendered as an object in JSON and as dotted keys in text
    Group(Vec<Field>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Group(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Group(fields) => serde_json::Value::Object(fields_to_json(fields)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

/// Build a JSON object from ordered fields. Later duplicates win, as in a map.
pub(crate) fn fields_to_json(fields: &[Field]) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for field in fields {
        map.insert(field.key.clone(), field.value.to_json_value());
    }
    map
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(i: $t) -> Self {
                FieldValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(u: $t) -> Self {
                FieldValue::Uint(u as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<Vec<Field>> for FieldValue {
    fn from(fields: Vec<Field>) -> Self {
        FieldValue::Group(fields)
    }
}

/// One structured attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Field holding the `Display` rendering of `value`
    pub fn display(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(key, value.to_string())
    }

    /// Field holding the `Debug` rendering of `value`
    pub fn debug(key: impl Into<String>, value: impl fmt::Debug) -> Self {
        Self::new(key, format!("{:?}", value))
    }

    /// Group of nested fields under `key`
    pub fn group(key: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::new(key, FieldValue::Group(fields))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

/// Fields accumulated by `Logger::with`, tagged with their group depth
///
/// A field added while groups `["a", "b"]` were open belongs inside `a.b`.
/// Only the depth is stored: the group path itself is shared by every field
/// of the logger and only ever grows, so the first `depth` names of the
/// current path are the groups the field was added under.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopedFields {
    entries: Vec<(usize, Field)>,
}

impl ScopedFields {
    pub(crate) fn extend(&mut self, depth: usize, fields: &[Field]) {
        self.entries
            .extend(fields.iter().cloned().map(|field| (depth, field)));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assemble the nested field tree for one record.
    ///
    /// `groups` is the logger's full group path; `record` are per-call
    /// fields, which live in the innermost group. Groups that end up with no
    /// fields are omitted.
    pub(crate) fn assemble(&self, groups: &[String], record: &[Field]) -> Vec<Field> {
        let mut levels: Vec<Vec<Field>> = vec![Vec::new(); groups.len() + 1];
        for (depth, field) in &self.entries {
            levels[*depth].push(field.clone());
        }
        levels[groups.len()].extend(record.iter().cloned());

        // Fold from the innermost group outwards.
        for depth in (1..levels.len()).rev() {
            let inner = std::mem::take(&mut levels[depth]);
            if !inner.is_empty() {
                levels[depth - 1].push(Field::group(groups[depth - 1].clone(), inner));
            }
        }
        levels.swap_remove(0)
    }
}

/// Build a `[Field; N]` from `key => value` pairs.
///
/// ```
/// use ctxlog::{fields, Field};
///
/// let attrs: [Field; 2] = fields!["host" => "localhost", "port" => 5432];
/// assert_eq!(attrs[1].key, "port");
/// ```
#[macro_export]
macro_rules! fields {
    () => {{
        let empty: [$crate::Field; 0] = [];
        empty
    }};
    ($($key:expr => $value:expr),+ $(,)?) => {
        [$($crate::Field::new($key, $value)),+]
    };
}
