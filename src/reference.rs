//! Reference slots
//!
//! A [`Slot`] is a field of a node that holds either an inline child node or
//! a reference to metadata declared elsewhere. A reference is authored as
//! `{"$ref": "<address>"}` and filled in at most once by the resolver.
//! Once resolved it renders as `{"$ref": "#/components/<category>/<name>"}`.

use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::holder::HolderRef;
use crate::node::{Component, MetadataNode, NodeKind};

/// A resolved reference target together with the holder it was fetched from
#[derive(Debug, Clone)]
pub struct Resolved {
    pub node: Arc<MetadataNode>,
    pub holder: HolderRef,
}

impl Resolved {
    pub fn new(node: Arc<MetadataNode>, holder: HolderRef) -> Self {
        Self { node, holder }
    }

    /// `#/components/<category>/<name>` pointer for the target
    pub fn pointer(&self) -> Option<String> {
        let category = self.node.component_category()?;
        let name = self.node.reference_name()?;
        Some(format!("#/components/{}/{}", category, name))
    }
}

/// Reference to a node of kind `T`
pub struct Reference<T> {
    address: String,
    resolved: OnceLock<Resolved>,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Reference<T> {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            resolved: OnceLock::new(),
            _kind: PhantomData,
        }
    }

    /// Address as authored
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn resolved(&self) -> Option<&Resolved> {
        self.resolved.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Fill the reference. Returns the value now stored, which is the
    /// earlier one if the reference was already resolved.
    pub fn resolve_with(&self, resolved: Resolved) -> &Resolved {
        self.resolved.get_or_init(|| resolved)
    }
}

impl<T: Component> Reference<T> {
    pub fn kind(&self) -> NodeKind {
        T::KIND
    }

    /// Typed view of the resolved target
    pub fn target(&self) -> Option<&T> {
        self.resolved.get().and_then(|r| T::from_node(&r.node))
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            resolved: self.resolved.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("address", &self.address)
            .field("pointer", &self.resolved.get().and_then(Resolved::pointer))
            .finish()
    }
}

impl<T> Serialize for Reference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pointer = self
            .resolved
            .get()
            .and_then(Resolved::pointer)
            .ok_or_else(|| {
                S::Error::custom(format!(
                    "reference `{}` was rendered before it was resolved",
                    self.address
                ))
            })?;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$ref", &pointer)?;
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReference {
    #[serde(rename = "$ref")]
    address: String,
}

impl<'de, T> Deserialize<'de> for Reference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawReference::deserialize(deserializer)?;
        Ok(Self::new(raw.address))
    }
}

/// Either an inline child node or a reference to one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot<T> {
    Reference(Reference<T>),
    Inline(T),
}

impl<T> Slot<T> {
    pub fn inline(node: T) -> Self {
        Slot::Inline(node)
    }

    pub fn reference(address: impl Into<String>) -> Self {
        Slot::Reference(Reference::new(address))
    }

    pub fn as_reference(&self) -> Option<&Reference<T>> {
        match self {
            Slot::Reference(r) => Some(r),
            Slot::Inline(_) => None,
        }
    }
}

impl<T: Component> Slot<T> {
    /// The inline node, or the resolved target of a reference
    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Inline(node) => Some(node),
            Slot::Reference(r) => r.target(),
        }
    }
}

impl<T> From<T> for Slot<T>
where
    T: Component,
{
    fn from(node: T) -> Self {
        Slot::Inline(node)
    }
}
