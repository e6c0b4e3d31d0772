//! Metadata nodes
//!
//! One typed struct per OpenAPI object kind, wrapped in the [`MetadataNode`]
//! union. Rendering goes through serde: unset fields are skipped, field names
//! follow the OpenAPI spelling and internal fields (`refName`, identity
//! tokens) never reach the output.
//!
//! Component kinds (schemas, parameters, responses, request bodies, headers,
//! examples, links, security schemes) implement [`Component`] and can be
//! registered under `#/components/<category>/<name>`.

pub mod body;
pub mod operation;
pub mod parameter;
pub mod schema;
pub mod security;

pub use body::{Encoding, Example, Link, MediaType, RequestBody, Response};
pub use operation::{Operation, SecurityRequirement};
pub use parameter::{Header, Parameter, ParameterLocation};
pub use schema::{AdditionalProperties, Discriminator, Schema, Xml};
pub use security::{SecurityScheme, SecuritySchemeType};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::collector::{Traverse, Walker};
use crate::error::Result;
use crate::holder::HolderRef;

/// Kind of a metadata node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Schema,
    Parameter,
    Response,
    RequestBody,
    Example,
    Header,
    Link,
    MediaType,
    Encoding,
    Discriminator,
    Xml,
    SecurityRequirement,
    SecurityScheme,
    Operation,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Schema => "schema",
            NodeKind::Parameter => "parameter",
            NodeKind::Response => "response",
            NodeKind::RequestBody => "request_body",
            NodeKind::Example => "example",
            NodeKind::Header => "header",
            NodeKind::Link => "link",
            NodeKind::MediaType => "media_type",
            NodeKind::Encoding => "encoding",
            NodeKind::Discriminator => "discriminator",
            NodeKind::Xml => "xml",
            NodeKind::SecurityRequirement => "security_requirement",
            NodeKind::SecurityScheme => "security_scheme",
            NodeKind::Operation => "operation",
        }
    }

    /// Section of `#/components` this kind is registered under, if any
    pub fn component_category(&self) -> Option<&'static str> {
        match self {
            NodeKind::Schema => Some("schemas"),
            NodeKind::Parameter => Some("parameters"),
            NodeKind::Response => Some("responses"),
            NodeKind::RequestBody => Some("requestBodies"),
            NodeKind::Example => Some("examples"),
            NodeKind::Header => Some("headers"),
            NodeKind::Link => Some("links"),
            NodeKind::SecurityScheme => Some("securitySchemes"),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a node instance.
///
/// Used as the reference name of components that were never given one.
/// Every clone draws a new token, so a copied node is a distinct instance.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NodeToken(u64);

impl NodeToken {
    pub fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_reference_name(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl Default for NodeToken {
    fn default() -> Self {
        Self::next()
    }
}

impl Clone for NodeToken {
    fn clone(&self) -> Self {
        Self::next()
    }
}

/// A node that can live under `#/components`
pub trait Component: Sized {
    const KIND: NodeKind;

    fn explicit_reference_name(&self) -> Option<&str>;

    fn set_reference_name(&mut self, name: String);

    fn token(&self) -> &NodeToken;

    fn from_node(node: &MetadataNode) -> Option<&Self>;

    fn into_node(self) -> MetadataNode;

    fn component_category(&self) -> &'static str {
        Self::KIND.component_category().unwrap_or("")
    }

    /// Explicit reference name, or the instance's identity token
    fn reference_name(&self) -> String {
        self.explicit_reference_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.token().as_reference_name())
    }
}

macro_rules! impl_component {
    ($ty:ident, $kind:ident) => {
        impl $crate::node::Component for $ty {
            const KIND: $crate::node::NodeKind = $crate::node::NodeKind::$kind;

            fn explicit_reference_name(&self) -> Option<&str> {
                self.ref_name.as_deref()
            }

            fn set_reference_name(&mut self, name: String) {
                self.ref_name = Some(name);
            }

            fn token(&self) -> &$crate::node::NodeToken {
                &self.token
            }

            fn from_node(node: &$crate::node::MetadataNode) -> Option<&Self> {
                match node {
                    $crate::node::MetadataNode::$kind(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_node(self) -> $crate::node::MetadataNode {
                $crate::node::MetadataNode::$kind(self)
            }
        }

        impl From<$ty> for $crate::node::MetadataNode {
            fn from(inner: $ty) -> Self {
                $crate::node::MetadataNode::$kind(inner)
            }
        }
    };
}

pub(crate) use impl_component;

/// A described entity of any kind.
///
/// Deserializes externally tagged by kind (`{ schema: {...} }`) so metadata
/// can be authored in catalogs; serializes as the bare OpenAPI object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataNode {
    Schema(Schema),
    Parameter(Parameter),
    Response(Response),
    RequestBody(RequestBody),
    Example(Example),
    Header(Header),
    Link(Link),
    MediaType(MediaType),
    Encoding(Encoding),
    Discriminator(Discriminator),
    Xml(Xml),
    SecurityRequirement(SecurityRequirement),
    SecurityScheme(SecurityScheme),
    Operation(Operation),
}

impl MetadataNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            MetadataNode::Schema(_) => NodeKind::Schema,
            MetadataNode::Parameter(_) => NodeKind::Parameter,
            MetadataNode::Response(_) => NodeKind::Response,
            MetadataNode::RequestBody(_) => NodeKind::RequestBody,
            MetadataNode::Example(_) => NodeKind::Example,
            MetadataNode::Header(_) => NodeKind::Header,
            MetadataNode::Link(_) => NodeKind::Link,
            MetadataNode::MediaType(_) => NodeKind::MediaType,
            MetadataNode::Encoding(_) => NodeKind::Encoding,
            MetadataNode::Discriminator(_) => NodeKind::Discriminator,
            MetadataNode::Xml(_) => NodeKind::Xml,
            MetadataNode::SecurityRequirement(_) => NodeKind::SecurityRequirement,
            MetadataNode::SecurityScheme(_) => NodeKind::SecurityScheme,
            MetadataNode::Operation(_) => NodeKind::Operation,
        }
    }

    pub fn component_category(&self) -> Option<&'static str> {
        self.kind().component_category()
    }

    pub fn is_component(&self) -> bool {
        self.component_category().is_some()
    }

    /// Reference name of a component node, `None` for non-component kinds
    pub fn reference_name(&self) -> Option<String> {
        match self {
            MetadataNode::Schema(n) => Some(n.reference_name()),
            MetadataNode::Parameter(n) => Some(n.reference_name()),
            MetadataNode::Response(n) => Some(n.reference_name()),
            MetadataNode::RequestBody(n) => Some(n.reference_name()),
            MetadataNode::Example(n) => Some(n.reference_name()),
            MetadataNode::Header(n) => Some(n.reference_name()),
            MetadataNode::Link(n) => Some(n.reference_name()),
            MetadataNode::SecurityScheme(n) => Some(n.reference_name()),
            _ => None,
        }
    }

    /// Give a component a reference name unless it already has an explicit one
    pub fn set_default_reference_name(&mut self, name: impl Into<String>) {
        fn apply<C: Component>(component: &mut C, name: String) {
            if component.explicit_reference_name().is_none() {
                component.set_reference_name(name);
            }
        }

        let name = name.into();
        match self {
            MetadataNode::Schema(n) => apply(n, name),
            MetadataNode::Parameter(n) => apply(n, name),
            MetadataNode::Response(n) => apply(n, name),
            MetadataNode::RequestBody(n) => apply(n, name),
            MetadataNode::Example(n) => apply(n, name),
            MetadataNode::Header(n) => apply(n, name),
            MetadataNode::Link(n) => apply(n, name),
            MetadataNode::SecurityScheme(n) => apply(n, name),
            _ => {}
        }
    }

    pub fn as_component<C: Component>(&self) -> Option<&C> {
        C::from_node(self)
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            MetadataNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn into_operation(self) -> Option<Operation> {
        match self {
            MetadataNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Render to a JSON value
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for MetadataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetadataNode::Schema(n) => n.serialize(serializer),
            MetadataNode::Parameter(n) => n.serialize(serializer),
            MetadataNode::Response(n) => n.serialize(serializer),
            MetadataNode::RequestBody(n) => n.serialize(serializer),
            MetadataNode::Example(n) => n.serialize(serializer),
            MetadataNode::Header(n) => n.serialize(serializer),
            MetadataNode::Link(n) => n.serialize(serializer),
            MetadataNode::MediaType(n) => n.serialize(serializer),
            MetadataNode::Encoding(n) => n.serialize(serializer),
            MetadataNode::Discriminator(n) => n.serialize(serializer),
            MetadataNode::Xml(n) => n.serialize(serializer),
            MetadataNode::SecurityRequirement(n) => n.serialize(serializer),
            MetadataNode::SecurityScheme(n) => n.serialize(serializer),
            MetadataNode::Operation(n) => n.serialize(serializer),
        }
    }
}

impl Traverse for MetadataNode {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        match self {
            MetadataNode::Schema(n) => n.traverse(holder, walker),
            MetadataNode::Parameter(n) => n.traverse(holder, walker),
            MetadataNode::Response(n) => n.traverse(holder, walker),
            MetadataNode::RequestBody(n) => n.traverse(holder, walker),
            MetadataNode::Header(n) => n.traverse(holder, walker),
            MetadataNode::MediaType(n) => n.traverse(holder, walker),
            MetadataNode::Encoding(n) => n.traverse(holder, walker),
            MetadataNode::Operation(n) => n.traverse(holder, walker),
            MetadataNode::Example(_)
            | MetadataNode::Link(_)
            | MetadataNode::Discriminator(_)
            | MetadataNode::Xml(_)
            | MetadataNode::SecurityRequirement(_)
            | MetadataNode::SecurityScheme(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_categories() {
        assert_eq!(NodeKind::Schema.component_category(), Some("schemas"));
        assert_eq!(NodeKind::RequestBody.component_category(), Some("requestBodies"));
        assert_eq!(NodeKind::SecurityScheme.component_category(), Some("securitySchemes"));
        assert_eq!(NodeKind::Operation.component_category(), None);
        assert_eq!(NodeKind::MediaType.component_category(), None);
    }

    #[test]
    fn test_fallback_reference_names_are_unique() {
        let a = Schema::default();
        let b = a.clone();
        assert_ne!(a.reference_name(), b.reference_name());
    }

    #[test]
    fn test_default_reference_name_keeps_explicit_name() {
        let mut named: MetadataNode = Schema::default().named("Explicit").into();
        named.set_default_reference_name("Fallback");
        assert_eq!(named.reference_name().as_deref(), Some("Explicit"));

        let mut anonymous: MetadataNode = Schema::default().into();
        anonymous.set_default_reference_name("Fallback");
        assert_eq!(anonymous.reference_name().as_deref(), Some("Fallback"));
    }

    #[test]
    fn test_deserialize_tagged_node() {
        let node: MetadataNode =
            serde_json::from_value(serde_json::json!({"schema": {"type": "string"}})).unwrap();
        assert_eq!(node.kind(), NodeKind::Schema);
        assert_eq!(node.to_value().unwrap(), serde_json::json!({"type": "string"}));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let node: MetadataNode = Schema::of_type("integer").nullable().into();
        let first = serde_json::to_string(&node).unwrap();
        let second = serde_json::to_string(&node).unwrap();
        assert_eq!(first, second);
    }
}
