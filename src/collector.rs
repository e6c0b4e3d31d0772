//! Reference collection
//!
//! Walks a node tree depth-first in field declaration order, resolving every
//! reference it meets and recording the resolved nodes. The holder travels
//! with the owning node: inline children inherit it, resolved targets switch
//! to the holder they were fetched from.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, RoutedocError};
use crate::holder::HolderRef;
use crate::node::{Component, MetadataNode};
use crate::reference::{Reference, Slot};
use crate::resolver::Resolver;

/// A node whose fields may contain references
pub trait Traverse {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()>;
}

/// State of one collection pass
pub struct Walker<'a> {
    resolver: Option<&'a Resolver>,
    collected: Vec<Arc<MetadataNode>>,
    expanded: HashSet<*const MetadataNode>,
}

impl<'a> Walker<'a> {
    fn new(resolver: Option<&'a Resolver>) -> Self {
        Self {
            resolver,
            collected: Vec::new(),
            expanded: HashSet::new(),
        }
    }

    /// Resolve a reference if needed, record its target and expand the
    /// target's own references the first time it is seen in this pass.
    pub fn follow<T: Component>(
        &mut self,
        reference: &Reference<T>,
        holder: Option<&HolderRef>,
    ) -> Result<()> {
        let resolved = match reference.resolved() {
            Some(resolved) => resolved.clone(),
            None => {
                let resolver = self.resolver.ok_or_else(|| RoutedocError::UnresolvedReference {
                    address: reference.address().to_string(),
                })?;
                let resolved = resolver.resolve(reference.address(), T::KIND, holder)?;
                reference.resolve_with(resolved).clone()
            }
        };

        self.collected.push(resolved.node.clone());
        if self.expanded.insert(Arc::as_ptr(&resolved.node)) {
            resolved.node.traverse(Some(&resolved.holder), self)?;
        }
        Ok(())
    }
}

impl<T: Component + Traverse> Traverse for Slot<T> {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        match self {
            Slot::Inline(node) => node.traverse(holder, walker),
            Slot::Reference(reference) => walker.follow(reference, holder),
        }
    }
}

impl<T: Traverse> Traverse for Option<T> {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        match self {
            Some(inner) => inner.traverse(holder, walker),
            None => Ok(()),
        }
    }
}

impl<T: Traverse> Traverse for Box<T> {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        self.as_ref().traverse(holder, walker)
    }
}

impl<T: Traverse> Traverse for Vec<T> {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        for item in self {
            item.traverse(holder, walker)?;
        }
        Ok(())
    }
}

impl<T: Traverse> Traverse for IndexMap<String, T> {
    fn traverse(&self, holder: Option<&HolderRef>, walker: &mut Walker<'_>) -> Result<()> {
        for item in self.values() {
            item.traverse(holder, walker)?;
        }
        Ok(())
    }
}

/// Collects the transitive closure of resolved nodes reachable from a node
pub struct ReferenceCollector<'a> {
    resolver: Option<&'a Resolver>,
}

impl<'a> ReferenceCollector<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Collector for graphs that are already resolved. Meeting an unresolved
    /// reference is an error.
    pub fn resolved_only() -> Self {
        Self { resolver: None }
    }

    /// Every resolved node reachable from `node`, in discovery order.
    ///
    /// Duplicates are kept; a node reached twice is listed twice but its own
    /// references are expanded only once.
    pub fn collect<N: Traverse + ?Sized>(
        &self,
        node: &N,
        holder: Option<&HolderRef>,
    ) -> Result<Vec<Arc<MetadataNode>>> {
        let mut walker = Walker::new(self.resolver);
        node.traverse(holder, &mut walker)?;
        Ok(walker.collected)
    }
}
