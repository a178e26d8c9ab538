use super::{Schema, SchemaType};
use crate::{Error, Result};
use serde_json::Value;

impl Schema {
    /// Checks `value` against this descriptor.
    ///
    /// Node types and `required` keys are enforced; properties the descriptor
    /// does not mention are allowed, and `null` counts as absent for optional
    /// properties.
    pub fn validate(&self, value: &Value) -> Result<()> {
        validate_at(self, value, "")
    }
}

fn validate_at(schema: &Schema, value: &Value, path: &str) -> Result<()> {
    match schema.schema_type {
        SchemaType::Object => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(path, "object", value))?;

            for key in &schema.required {
                match map.get(key) {
                    Some(Value::Null) | None => {
                        return Err(Error::Validation(format!(
                            "{}: missing required property '{}'",
                            display_path(path),
                            key
                        )));
                    }
                    Some(_) => {}
                }
            }

            for (key, property) in &schema.properties {
                match map.get(key) {
                    Some(Value::Null) | None => {}
                    Some(child) => validate_at(property, child, &format!("{}/{}", path, key))?,
                }
            }
            Ok(())
        }
        SchemaType::Array => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(path, "array", value))?;

            if let Some(item_schema) = &schema.items {
                for (index, item) in items.iter().enumerate() {
                    validate_at(item_schema, item, &format!("{}/{}", path, index))?;
                }
            }
            Ok(())
        }
        SchemaType::String if value.is_string() => Ok(()),
        SchemaType::String => Err(mismatch(path, "string", value)),
        SchemaType::Number if value.is_number() => Ok(()),
        SchemaType::Number => Err(mismatch(path, "number", value)),
    }
}

fn mismatch(path: &str, expected: &str, value: &Value) -> Error {
    Error::Validation(format!(
        "{}: expected {}, found {}",
        display_path(path),
        expected,
        kind(value)
    ))
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
