//! Schema validation and light coercion of parsed model output

use crate::config::ExtractorConfig;
use cropwatch_domain::{ExtractionSchema, FieldSpec, FieldType, NumericRange};
use serde_json::{Map, Value};
use std::fmt;

/// Path used when the parsed value itself is not an object
pub const ROOT_PATH: &str = "$";

/// First schema violation found in a parsed value
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Dotted path of the offending field (`a.b[0].c`)
    pub path: String,
    /// What was wrong with it
    pub kind: ViolationKind,
}

/// Kind of schema violation
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// Required field absent
    Missing,
    /// Field present with the wrong JSON type
    WrongType {
        /// Type the schema declares
        expected: &'static str,
        /// Type found in the answer
        found: &'static str,
    },
    /// Number outside its plausible range
    OutOfRange {
        /// Value found
        value: f64,
        /// Declared range
        range: NumericRange,
    },
    /// String not in the enumerated set
    NotAllowed {
        /// Value found
        value: String,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: missing required field", self.path),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.path, expected, found)
            }
            ViolationKind::OutOfRange { value, range } => {
                write!(f, "{}: {} outside range {}", self.path, value, range)
            }
            ViolationKind::NotAllowed { value } => {
                write!(f, "{}: '{}' is not an allowed value", self.path, value)
            }
        }
    }
}

/// Validate `value` against `schema`, applying the coercions enabled in
/// `config` in place
///
/// Fields are checked in declaration order and the first violation is
/// returned. Optional fields that are absent are skipped; optional fields
/// set to `null` are removed.
pub fn validate_value(
    value: &mut Value,
    schema: &ExtractionSchema,
    config: &ExtractorConfig,
) -> Result<(), SchemaViolation> {
    match value {
        Value::Object(map) => validate_fields(map, schema.fields(), "", config),
        other => Err(SchemaViolation {
            path: ROOT_PATH.to_string(),
            kind: ViolationKind::WrongType {
                expected: "object",
                found: json_type_name(other),
            },
        }),
    }
}

fn validate_fields(
    map: &mut Map<String, Value>,
    fields: &[FieldSpec],
    prefix: &str,
    config: &ExtractorConfig,
) -> Result<(), SchemaViolation> {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };

        // An optional `null` is treated as absent
        if !field.required && map.get(&field.name).is_some_and(Value::is_null) {
            map.remove(&field.name);
            continue;
        }

        match map.get_mut(&field.name) {
            None if field.required => {
                return Err(SchemaViolation {
                    path,
                    kind: ViolationKind::Missing,
                })
            }
            None => {}
            Some(member) => validate_type(member, &field.field_type, &path, config)?,
        }
    }
    Ok(())
}

fn validate_type(
    value: &mut Value,
    field_type: &FieldType,
    path: &str,
    config: &ExtractorConfig,
) -> Result<(), SchemaViolation> {
    let wrong_type = |value: &Value| SchemaViolation {
        path: path.to_string(),
        kind: ViolationKind::WrongType {
            expected: field_type.name(),
            found: json_type_name(value),
        },
    };

    match field_type {
        FieldType::Number { range } => {
            if config.coerce_numeric_strings {
                coerce_numeric_string(value);
            }
            let number = value.as_f64().ok_or_else(|| wrong_type(value))?;
            if let Some(range) = range {
                if !range.contains(number) {
                    return Err(SchemaViolation {
                        path: path.to_string(),
                        kind: ViolationKind::OutOfRange {
                            value: number,
                            range: *range,
                        },
                    });
                }
            }
            Ok(())
        }
        FieldType::String => value.is_string().then_some(()).ok_or_else(|| wrong_type(value)),
        FieldType::Boolean => value.is_boolean().then_some(()).ok_or_else(|| wrong_type(value)),
        FieldType::Enum(allowed) => {
            let found = value.as_str().ok_or_else(|| wrong_type(value))?;
            if allowed.iter().any(|a| a == found) {
                return Ok(());
            }
            let canonical = config
                .case_insensitive_enums
                .then(|| allowed.iter().find(|a| a.eq_ignore_ascii_case(found.trim())))
                .flatten();
            match canonical {
                Some(canonical) => {
                    *value = Value::String(canonical.clone());
                    Ok(())
                }
                None => Err(SchemaViolation {
                    path: path.to_string(),
                    kind: ViolationKind::NotAllowed {
                        value: found.to_string(),
                    },
                }),
            }
        }
        FieldType::Array(element) => match value {
            Value::Array(items) => {
                for (idx, item) in items.iter_mut().enumerate() {
                    validate_type(item, element, &format!("{}[{}]", path, idx), config)?;
                }
                Ok(())
            }
            other => Err(wrong_type(other)),
        },
        FieldType::Object(fields) => match value {
            Value::Object(map) => validate_fields(map, fields, path, config),
            other => Err(wrong_type(other)),
        },
    }
}

/// Rewrite `"85"`, `" 0.8 "` or `"85%"` as a JSON number; leave anything
/// else untouched
fn coerce_numeric_string(value: &mut Value) {
    let Value::String(s) = value else {
        return;
    };
    let trimmed = s.trim().trim_end_matches('%').trim_end();

    if let Ok(int) = trimmed.parse::<i64>() {
        *value = Value::from(int);
    } else if let Some(number) = trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        *value = Value::Number(number);
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
