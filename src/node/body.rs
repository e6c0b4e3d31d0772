//! Request bodies, responses and their media content

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collector::{Traverse, Walker};
use crate::error::Result;
use crate::holder::HolderRef;
use crate::node::{impl_component, Header, NodeToken, Schema};
use crate::reference::Slot;

/// Content of one media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Slot<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Slot<Example>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, Encoding>,
}

impl MediaType {
    pub fn with_schema(schema: Slot<Schema>) -> Self {
        Self {
            schema: Some(schema),
            ..Default::default()
        }
    }
}

impl Traverse for MediaType {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.schema.traverse(holder, walker)?;
        self.examples.traverse(holder, walker)?;
        self.encoding.traverse(holder, walker)
    }
}

/// Encoding of a single property in a multipart or form body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Slot<Header>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
}

impl Traverse for Encoding {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.headers.traverse(holder, walker)
    }
}

/// Request body object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "refName", default, skip_serializing)]
    pub ref_name: Option<String>,
    #[serde(skip)]
    token: NodeToken,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl_component!(RequestBody, RequestBody);

impl RequestBody {
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }

    /// Declared media types, in declaration order
    pub fn media_types(&self) -> Vec<String> {
        self.content.keys().cloned().collect()
    }
}

impl Traverse for RequestBody {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.content.traverse(holder, walker)
    }
}

/// Response object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "refName", default, skip_serializing)]
    pub ref_name: Option<String>,
    #[serde(skip)]
    token: NodeToken,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Slot<Header>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, Slot<Link>>,
}

impl_component!(Response, Response);

impl Response {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }
}

impl Traverse for Response {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.headers.traverse(holder, walker)?;
        self.content.traverse(holder, walker)?;
        self.links.traverse(holder, walker)
    }
}

/// Example object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(rename = "refName", default, skip_serializing)]
    pub ref_name: Option<String>,
    #[serde(skip)]
    token: NodeToken,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
}

impl_component!(Example, Example);

impl Traverse for Example {
    fn traverse(&self, _holder: Option<&HolderRef>, _walker: &mut Walker<'_>) -> Result<()> {
        Ok(())
    }
}

/// Link object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(rename = "refName", default, skip_serializing)]
    pub ref_name: Option<String>,
    #[serde(skip)]
    token: NodeToken,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl_component!(Link, Link);

impl Traverse for Link {
    fn traverse(&self, _holder: Option<&HolderRef>, _walker: &mut Walker<'_>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_media_types_keep_order() {
        let body: RequestBody = serde_json::from_value(json!({
            "content": {
                "application/json": {"schema": {"type": "object"}},
                "application/xml": {}
            }
        }))
        .unwrap();
        assert_eq!(body.media_types(), vec!["application/json", "application/xml"]);
    }

    #[test]
    fn test_example_renders_value() {
        let example = Example {
            value: Some(json!({"email": "a@b.c"})),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&example).unwrap(),
            json!({"value": {"email": "a@b.c"}})
        );
    }
}
