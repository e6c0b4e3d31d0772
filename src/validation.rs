//! Validating request and response data against schema fragments

use jsonschema::{Draft, JSONSchema};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{Result, RoutedocError};

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// JSON pointer into the validated instance
    pub instance_path: String,
    pub message: String,
}

/// Outcome of validating one instance
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "valid");
        }
        for failure in &self.failures {
            let path = if failure.instance_path.is_empty() {
                "/"
            } else {
                failure.instance_path.as_str()
            };
            writeln!(f, "{}: {}", path, failure.message)?;
        }
        Ok(())
    }
}

/// A compiled schema fragment
pub struct FragmentValidator {
    compiled: JSONSchema,
}

impl FragmentValidator {
    /// Compile a fragment as a draft 7 schema
    pub fn new(fragment: &Value) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(fragment)
            .map_err(|e| RoutedocError::InvalidSchema(e.to_string()))?;
        Ok(Self { compiled })
    }

    pub fn validate(&self, instance: &Value) -> ValidationReport {
        let failures = match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| ValidationFailure {
                    instance_path: e.instance_path.to_string(),
                    message: e.to_string(),
                })
                .collect(),
        };
        ValidationReport { failures }
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.compiled.is_valid(instance)
    }
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(single)) => vec![single.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn coerce(raw: &str, types: &[&str]) -> Option<Value> {
    for ty in types {
        let coerced = match *ty {
            "integer" => raw.parse::<i64>().ok().map(Value::from),
            "number" => raw.parse::<f64>().ok().and_then(|n| {
                serde_json::Number::from_f64(n).map(Value::Number)
            }),
            "boolean" => match raw {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            "null" if raw.is_empty() => Some(Value::Null),
            _ => None,
        };
        if coerced.is_some() {
            return coerced;
        }
    }
    None
}

/// Convert string members of an object instance to the scalar types its
/// fragment asks for.
///
/// Query, header and cookie values always arrive as strings. Values that do
/// not parse are left alone so validation reports them.
pub fn coerce_scalars(fragment: &Value, instance: &mut Value) {
    let (Some(properties), Some(members)) = (
        fragment.get("properties").and_then(Value::as_object),
        instance.as_object_mut(),
    ) else {
        return;
    };

    for (name, value) in members.iter_mut() {
        let Some(raw) = value.as_str() else {
            continue;
        };
        let Some(schema) = properties.get(name) else {
            continue;
        };
        let types = declared_types(schema);
        if types.contains(&"string") {
            continue;
        }
        if let Some(coerced) = coerce(raw, &types) {
            *value = coerced;
        }
    }
}

/// Media type without parameters, lowercased
/// (`application/json; charset=utf-8` -> `application/json`)
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
