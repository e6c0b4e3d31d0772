//! Scoped JSON-Schema fragments
//!
//! Extracts a self-contained schema for one request part (cookies, headers,
//! query) or one body (request body by content type, response body by status
//! and content type) from an operation whose references are resolved.
//!
//! Every fragment is post-processed: component schema pointers
//! (`#/components/schemas/X`) become local ones (`#/definitions/X`), and
//! `nullable: true` is folded into a type union with `"null"`.

use serde_json::{Map, Value};

use crate::collector::ReferenceCollector;
use crate::error::{Result, RoutedocError};
use crate::node::{Component, MediaType, Operation, ParameterLocation};
use crate::reference::Slot;
use crate::registry::ComponentRegistry;

/// JSON Schema draft 7 dialect URI
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

const COMPONENT_SCHEMAS: &str = "#/components/schemas/";
const LOCAL_DEFINITIONS: &str = "#/definitions/";

/// Builds schema fragments from resolved operations
#[derive(Debug, Clone)]
pub struct SchemaFragmentBuilder {
    dialect: String,
}

impl Default for SchemaFragmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn resolved<'a, T: Component>(slot: &'a Slot<T>) -> Result<&'a T> {
    slot.get().ok_or_else(|| RoutedocError::UnresolvedReference {
        address: slot
            .as_reference()
            .map(|r| r.address().to_string())
            .unwrap_or_default(),
    })
}

impl SchemaFragmentBuilder {
    pub fn new() -> Self {
        Self::with_dialect(DRAFT_07)
    }

    pub fn with_dialect(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
        }
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Object schema over the parameters of one location.
    ///
    /// Header names are lowercased. Parameters without a schema only count
    /// towards `required`. Returns `None` when nothing was collected for that
    /// location.
    pub fn for_request_part(
        &self,
        operation: &Operation,
        location: ParameterLocation,
    ) -> Result<Option<Value>> {
        let mut required = Vec::new();
        let mut properties = Map::new();

        for slot in &operation.parameters {
            let parameter = resolved(slot)?;
            if parameter.location != location {
                continue;
            }

            let name = match location {
                ParameterLocation::Header => parameter.name.to_lowercase(),
                _ => parameter.name.clone(),
            };
            if parameter.is_required() {
                required.push(Value::String(name.clone()));
            }

            let schema = parameter
                .schema
                .as_ref()
                .or_else(|| parameter.content.values().find_map(|m| m.schema.as_ref()));
            if let Some(schema) = schema {
                properties.insert(name, serde_json::to_value(schema)?);
            }
        }

        if properties.is_empty() && required.is_empty() {
            return Ok(None);
        }

        let mut fragment = Map::new();
        fragment.insert("$schema".to_string(), Value::String(self.dialect.clone()));
        fragment.insert("type".to_string(), Value::String("object".to_string()));
        fragment.insert("required".to_string(), Value::Array(required));
        fragment.insert("properties".to_string(), Value::Object(properties));
        fragment.insert("definitions".to_string(), Value::Object(definitions(operation)?));

        let mut fragment = Value::Object(fragment);
        post_process(&mut fragment);
        Ok(Some(fragment))
    }

    /// Request body schema for one content type.
    ///
    /// Fails with `UnsupportedMediaType` when the operation has a body that
    /// does not declare `content_type`.
    pub fn for_request_body(&self, operation: &Operation, content_type: &str) -> Result<Option<Value>> {
        let Some(slot) = &operation.request_body else {
            return Ok(None);
        };
        let body = resolved(slot)?;
        let Some(media) = body.content.get(content_type) else {
            return Err(RoutedocError::UnsupportedMediaType {
                requested: content_type.to_string(),
                supported: body.media_types(),
            });
        };
        self.for_media_type(operation, media)
    }

    /// Response body schema for one status code and content type
    pub fn for_response_body(
        &self,
        operation: &Operation,
        status: &str,
        content_type: &str,
    ) -> Result<Option<Value>> {
        let Some(slot) = operation.responses.get(status) else {
            return Ok(None);
        };
        let response = resolved(slot)?;
        match response.content.get(content_type) {
            Some(media) => self.for_media_type(operation, media),
            None => Ok(None),
        }
    }

    fn for_media_type(&self, operation: &Operation, media: &MediaType) -> Result<Option<Value>> {
        let Some(schema) = &media.schema else {
            return Ok(None);
        };

        let mut fragment = Map::new();
        fragment.insert("$schema".to_string(), Value::String(self.dialect.clone()));
        if let Value::Object(fields) = serde_json::to_value(schema)? {
            fragment.extend(fields);
        }
        let definitions = definitions(operation)?;
        if !definitions.is_empty() {
            fragment.insert("definitions".to_string(), Value::Object(definitions));
        }

        let mut fragment = Value::Object(fragment);
        post_process(&mut fragment);
        Ok(Some(fragment))
    }
}

/// Rendered schema components reachable from anywhere in the operation,
/// keyed by reference name
fn definitions(operation: &Operation) -> Result<Map<String, Value>> {
    let mut registry = ComponentRegistry::new();
    registry.register(ReferenceCollector::resolved_only().collect(operation, None)?)?;

    let mut definitions = Map::new();
    for (name, node) in registry.schemas() {
        definitions.insert(name.to_string(), node.to_value()?);
    }
    Ok(definitions)
}

/// Apply reference rewriting and nullable folding to a whole fragment
pub fn post_process(value: &mut Value) {
    rewrite_refs(value);
    fold_nullable(value);
}

/// Keywords whose values are instance data, not schemas
const DATA_KEYWORDS: [&str; 4] = ["example", "default", "enum", "const"];
/// Keywords whose values map names to schemas
const SCHEMA_MAPS: [&str; 3] = ["properties", "definitions", "patternProperties"];

/// Call `visit` on every schema object of a rendered schema, skipping
/// instance data
fn visit_schemas(value: &mut Value, visit: &mut dyn FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Object(map) => {
            visit(map);
            for (key, child) in map.iter_mut() {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                if SCHEMA_MAPS.contains(&key.as_str()) {
                    if let Value::Object(named) = child {
                        for schema in named.values_mut() {
                            visit_schemas(schema, visit);
                        }
                        continue;
                    }
                }
                visit_schemas(child, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_schemas(item, visit);
            }
        }
        _ => {}
    }
}

/// Point component schema references at local definitions
pub fn rewrite_refs(value: &mut Value) {
    visit_schemas(value, &mut |schema: &mut Map<String, Value>| {
        if let Some(Value::String(pointer)) = schema.get_mut("$ref") {
            if let Some(name) = pointer.strip_prefix(COMPONENT_SCHEMAS) {
                *pointer = format!("{}{}", LOCAL_DEFINITIONS, name);
            }
        }
    });
}

/// Replace `nullable: true` with a type union including `"null"`
pub fn fold_nullable(value: &mut Value) {
    visit_schemas(value, &mut |schema: &mut Map<String, Value>| {
        if schema.get("nullable") != Some(&Value::Bool(true)) {
            return;
        }
        schema.remove("nullable");
        let union = match schema.remove("type") {
            Some(Value::String(single)) if single == "null" => vec![Value::from("null")],
            Some(Value::String(single)) => vec![Value::String(single), Value::from("null")],
            Some(Value::Array(mut types)) => {
                if !types.iter().any(|t| t == "null") {
                    types.push(Value::from("null"));
                }
                types
            }
            _ => vec![Value::from("null")],
        };
        schema.insert("type".to_string(), Value::Array(union));
    });
}
