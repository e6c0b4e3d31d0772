//! Operation and security requirement nodes

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::collector::{Traverse, Walker};
use crate::error::Result;
use crate::holder::HolderRef;
use crate::node::{Parameter, RequestBody, Response};
use crate::objects::ExternalDocumentation;
use crate::reference::Slot;

/// Operation object describing one route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocumentation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Slot<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Slot<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, Slot<Response>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl Operation {
    pub fn with_parameter(mut self, parameter: Slot<Parameter>) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_request_body(mut self, body: Slot<RequestBody>) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_response(mut self, status: impl Into<String>, response: Slot<Response>) -> Self {
        self.responses.insert(status.into(), response);
        self
    }
}

impl From<Operation> for crate::node::MetadataNode {
    fn from(operation: Operation) -> Self {
        crate::node::MetadataNode::Operation(operation)
    }
}

impl Traverse for Operation {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.parameters.traverse(holder, walker)?;
        self.request_body.traverse(holder, walker)?;
        self.responses.traverse(holder, walker)
    }
}

/// Security requirement, rendered as `{ <scheme name>: [scopes] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecurityRequirement {
    pub name: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    pub fn new(name: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            scopes,
        }
    }
}

impl Serialize for SecurityRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.scopes)?;
        map.end()
    }
}
