//! Component Registry
//!
//! Deduplicating map of reusable components, keyed by category and reference
//! name, rendered as the document's `components` section.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::{Result, RoutedocError};
use crate::node::MetadataNode;

/// Registered components in first-registration order
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// (category, name) -> node
    entries: IndexMap<(String, String), Arc<MetadataNode>>,
    /// Raise on name collisions between distinct nodes
    strict: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that rejects two distinct nodes claiming the same name
    pub fn strict() -> Self {
        Self {
            entries: IndexMap::new(),
            strict: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&Arc<MetadataNode>> {
        self.entries.get(&(category.to_string(), name.to_string()))
    }

    /// Register nodes. Non-component kinds are ignored.
    ///
    /// Re-registering the same instance is a no-op. A distinct instance under
    /// an existing name replaces the entry in lenient mode and fails in strict
    /// mode.
    pub fn register<I>(&mut self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<MetadataNode>>,
    {
        for node in nodes {
            let (Some(category), Some(name)) = (node.component_category(), node.reference_name())
            else {
                continue;
            };

            let key = (category.to_string(), name);
            match self.entries.get_mut(&key) {
                Some(existing) if Arc::ptr_eq(existing, &node) => {}
                Some(existing) => {
                    if self.strict {
                        return Err(RoutedocError::DuplicateComponentName {
                            category: key.0,
                            name: key.1,
                        });
                    }
                    warn!(
                        category = %key.0,
                        name = %key.1,
                        "Component name claimed by two distinct nodes, keeping the last one"
                    );
                    *existing = node;
                }
                None => {
                    self.entries.insert(key, node);
                }
            }
        }
        Ok(())
    }

    /// Render every component as `category -> name -> object`
    pub fn render_all(&self) -> Result<IndexMap<String, IndexMap<String, Value>>> {
        let mut rendered: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();
        for ((category, name), node) in &self.entries {
            rendered
                .entry(category.clone())
                .or_default()
                .insert(name.clone(), node.to_value()?);
        }
        Ok(rendered)
    }

    /// Schema-kind components only, keyed by name
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Arc<MetadataNode>)> {
        self.entries
            .iter()
            .filter(|((category, _), _)| category == "schemas")
            .map(|((_, name), node)| (name.as_str(), node))
    }
}
