use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Value type of a single schema field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    /// 64-bit integer; numeric strings are coerced
    Int,
    /// UTF-8 string
    Str,
    /// String restricted to a fixed literal set
    Enum(&'static [&'static str]),
    /// Nested entity
    Entity(&'static Schema),
    /// Sequence whose elements are each validated against the entity
    SeqOf(&'static Schema),
}

impl FieldType {
    /// Short human-readable description used in error messages and docs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            FieldType::Int => "integer".to_string(),
            FieldType::Str => "string".to_string(),
            FieldType::Enum(allowed) => format!("one of [{}]", allowed.join(", ")),
            FieldType::Entity(schema) => schema.name.to_string(),
            FieldType::SeqOf(schema) => format!("sequence of {}", schema.name),
        }
    }
}

/// A declared field of an entity schema.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub ty: FieldType,
}

impl Field {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            required: true,
            ty,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            required: false,
            ty,
        }
    }
}

/// Named mapping from field name to `{required|optional, value-type}`.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// Structured validation failure.
///
/// Serializes to a JSON tree mirroring the shape of the rejected value:
/// missing keys become the string `"missing-required-key"`, type mismatches an
/// object `{"expected", "got"}`, entity fields a nested object and sequence
/// fields an array holding `null` at every valid position.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    MissingRequiredKey,
    Invalid { expected: String, got: Value },
    Fields(BTreeMap<String, SchemaError>),
    Elements(Vec<Option<SchemaError>>),
}

impl SchemaError {
    pub(crate) fn invalid(expected: impl Into<String>, got: &Value) -> Self {
        SchemaError::Invalid {
            expected: expected.into(),
            got: got.clone(),
        }
    }

    /// Error recorded for `field`, when this is a field-level error map.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&SchemaError> {
        match self {
            SchemaError::Fields(fields) => fields.get(field),
            _ => None,
        }
    }

    /// Render as a JSON value (the 400 response detail).
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for SchemaError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaError::MissingRequiredKey => serializer.serialize_str("missing-required-key"),
            SchemaError::Invalid { expected, got } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("expected", expected)?;
                map.serialize_entry("got", got)?;
                map.end()
            }
            SchemaError::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            SchemaError::Elements(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for e in elements {
                    seq.serialize_element(e)?;
                }
                seq.end()
            }
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl std::error::Error for SchemaError {}
