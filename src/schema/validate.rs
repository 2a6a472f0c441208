use super::types::{FieldType, Schema, SchemaError};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Validate and coerce `raw` against `schema`.
///
/// Returns the fully typed value, or the error tree. Fields the schema does
/// not declare are dropped from the typed value. The two outcomes are
/// exclusive: a typed value is only produced when no field failed.
pub fn validate(schema: &Schema, raw: &Value) -> Result<Value, SchemaError> {
    let Some(obj) = raw.as_object() else {
        return Err(SchemaError::invalid(format!("map ({})", schema.name), raw));
    };

    let mut typed = Map::with_capacity(schema.fields.len());
    let mut errors = BTreeMap::new();

    for field in schema.fields {
        match obj.get(field.name) {
            None | Some(Value::Null) if field.required => {
                errors.insert(field.name.to_string(), SchemaError::MissingRequiredKey);
            }
            None | Some(Value::Null) => {}
            Some(value) => match coerce(&field.ty, value) {
                Ok(v) => {
                    typed.insert(field.name.to_string(), v);
                }
                Err(e) => {
                    errors.insert(field.name.to_string(), e);
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(typed))
    } else {
        Err(SchemaError::Fields(errors))
    }
}

fn coerce(ty: &FieldType, value: &Value) -> Result<Value, SchemaError> {
    match ty {
        FieldType::Int => coerce_int(value).ok_or_else(|| SchemaError::invalid(ty.describe(), value)),
        FieldType::Str => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(SchemaError::invalid(ty.describe(), value)),
        },
        FieldType::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => Ok(value.clone()),
            _ => Err(SchemaError::invalid(ty.describe(), value)),
        },
        FieldType::Entity(schema) => validate(schema, value),
        FieldType::SeqOf(schema) => {
            let Some(items) = value.as_array() else {
                return Err(SchemaError::invalid(ty.describe(), value));
            };
            let mut out = Vec::with_capacity(items.len());
            let mut element_errors = Vec::with_capacity(items.len());
            let mut failed = false;
            for item in items {
                match validate(schema, item) {
                    Ok(v) => {
                        out.push(v);
                        element_errors.push(None);
                    }
                    Err(e) => {
                        failed = true;
                        element_errors.push(Some(e));
                    }
                }
            }
            if failed {
                Err(SchemaError::Elements(element_errors))
            } else {
                Ok(Value::Array(out))
            }
        }
    }
}

fn coerce_int(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_i64().map(|i| Value::Number(Number::from(i))),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}
