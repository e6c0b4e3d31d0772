//! Reference resolution
//!
//! Turns an address like `User.email` into the metadata node attached to that
//! target. Results are cached by a fingerprint of the normalized target and
//! the requested kind, so every reference to the same target yields the same
//! `Arc` and the target is rendered exactly once.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, RoutedocError};
use crate::fingerprint::Fingerprint;
use crate::holder::{short_name, Address, HolderRef, Member};
use crate::node::{MetadataNode, NodeKind};
use crate::reference::Resolved;
use crate::store::MetadataStore;

/// Shared cache of resolved targets.
///
/// Cloning shares the underlying map, so one cache can serve several
/// resolvers (or several document builds) on purpose.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: Arc<Mutex<HashMap<Fingerprint, Resolved>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Default reference name for a target: `User`, `User.email` or `User.fn_key`
pub fn default_reference_name(target: &Address) -> String {
    let short = short_name(&target.type_name);
    match &target.member {
        Member::None => short.to_string(),
        Member::Property(property) => format!("{}.{}", short, property),
        Member::Method(method) => format!("{}.fn_{}", short, method),
    }
}

/// Resolves addresses against a metadata store
pub struct Resolver {
    store: Arc<dyn MetadataStore>,
    cache: ResolutionCache,
}

impl Resolver {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self::with_cache(store, ResolutionCache::new())
    }

    pub fn with_cache(store: Arc<dyn MetadataStore>, cache: ResolutionCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve `address` relative to `holder`, expecting a node of `kind`.
    ///
    /// Lookup, fetch and insert happen under one lock: two callers racing on
    /// the same target always observe the same instance.
    pub fn resolve(
        &self,
        address: &str,
        kind: NodeKind,
        holder: Option<&HolderRef>,
    ) -> Result<Resolved> {
        let target = Address::parse(address).normalize(holder);
        target.validate(address)?;
        let key = Fingerprint::for_target(&target, kind);

        let mut entries = self.cache.entries.lock();
        if let Some(hit) = entries.get(&key) {
            debug!(address, target = %target, %kind, "Resolution cache hit");
            return Ok(hit.clone());
        }

        let mut node = self.fetch(address, &target, kind)?;
        node.set_default_reference_name(default_reference_name(&target));

        let resolved = Resolved::new(Arc::new(node), HolderRef::of_type(target.type_name.clone()));
        entries.insert(key, resolved.clone());
        debug!(address, target = %target, %kind, "Resolved reference");
        Ok(resolved)
    }

    fn fetch(&self, address: &str, target: &Address, kind: NodeKind) -> Result<MetadataNode> {
        let type_name = target.type_name.as_str();
        let unresolved = |what: String| RoutedocError::UnresolvedTarget {
            address: address.to_string(),
            target: what,
        };

        if !self.store.type_exists(type_name) {
            return Err(unresolved(format!("type `{}`", type_name)));
        }

        let (description, node) = match &target.member {
            Member::None => (
                format!("type `{}`", type_name),
                self.store.class_metadata(type_name, kind),
            ),
            Member::Method(method) => {
                if !self.store.method_exists(type_name, method) {
                    return Err(unresolved(format!("method `{}`", target)));
                }
                (
                    format!("method `{}`", target),
                    self.store.method_metadata(type_name, method, kind),
                )
            }
            Member::Property(property) => {
                if !self.store.property_exists(type_name, property) {
                    return Err(unresolved(format!("property `{}`", target)));
                }
                (
                    format!("property `{}`", target),
                    self.store.property_metadata(type_name, property, kind),
                )
            }
        };

        match node {
            Some(node) if node.kind() == kind => Ok(node),
            _ => Err(RoutedocError::MissingAnnotation {
                target: description,
                kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Component, Schema};
    use crate::store::MetadataCatalog;

    fn catalog() -> Arc<dyn MetadataStore> {
        let mut catalog = MetadataCatalog::new();
        catalog
            .add_class_metadata("app::dto::User", Schema::of_type("object"))
            .add_property_metadata("app::dto::User", "email", Schema::of_type("string"))
            .add_method_metadata("app::dto::User", "key", Schema::of_type("string").named("Key"))
            .declare_property("app::dto::User", "password")
            .declare_type("app::dto::Marker");
        Arc::new(catalog)
    }

    #[test]
    fn test_same_target_resolves_to_same_instance() {
        let resolver = Resolver::new(catalog());
        let holder = HolderRef::of_type("app::dto::UserResponse");
        let a = resolver.resolve("User.email", NodeKind::Schema, Some(&holder)).unwrap();
        let b = resolver
            .resolve("app::dto::User.email", NodeKind::Schema, None)
            .unwrap();
        assert!(Arc::ptr_eq(&a.node, &b.node));
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_default_reference_names() {
        let resolver = Resolver::new(catalog());
        let class = resolver.resolve("app::dto::User", NodeKind::Schema, None).unwrap();
        let property = resolver.resolve("app::dto::User.email", NodeKind::Schema, None).unwrap();
        let method = resolver.resolve("app::dto::User@key", NodeKind::Schema, None).unwrap();

        assert_eq!(class.node.reference_name().as_deref(), Some("User"));
        assert_eq!(property.node.reference_name().as_deref(), Some("User.email"));
        assert_eq!(method.node.reference_name().as_deref(), Some("Key"));
    }

    #[test]
    fn test_resolved_holder_is_target_type() {
        let resolver = Resolver::new(catalog());
        let holder = HolderRef::method("app::dto::User", "key");
        let resolved = resolver.resolve(".email", NodeKind::Schema, Some(&holder)).unwrap();
        assert_eq!(resolved.holder, HolderRef::of_type("app::dto::User"));
    }

    #[test]
    fn test_unresolved_targets() {
        let resolver = Resolver::new(catalog());
        for address in ["app::dto::Missing", "app::dto::User.missing", "app::dto::User@missing"] {
            let err = resolver.resolve(address, NodeKind::Schema, None).unwrap_err();
            assert!(
                matches!(err, RoutedocError::UnresolvedTarget { .. }),
                "{}: {:?}",
                address,
                err
            );
        }
    }

    #[test]
    fn test_missing_annotation() {
        let resolver = Resolver::new(catalog());
        let err = resolver
            .resolve("app::dto::User.password", NodeKind::Schema, None)
            .unwrap_err();
        assert!(matches!(err, RoutedocError::MissingAnnotation { kind: NodeKind::Schema, .. }));

        let err = resolver
            .resolve("app::dto::User", NodeKind::Response, None)
            .unwrap_err();
        assert!(matches!(err, RoutedocError::MissingAnnotation { kind: NodeKind::Response, .. }));

        let err = resolver
            .resolve("app::dto::Marker", NodeKind::Schema, None)
            .unwrap_err();
        assert!(matches!(err, RoutedocError::MissingAnnotation { kind: NodeKind::Schema, .. }));
    }

    #[test]
    fn test_shared_cache_across_resolvers() {
        let cache = ResolutionCache::new();
        let store = catalog();
        let first = Resolver::with_cache(store.clone(), cache.clone());
        let second = Resolver::with_cache(store, cache);
        let a = first.resolve("app::dto::User", NodeKind::Schema, None).unwrap();
        let b = second.resolve("app::dto::User", NodeKind::Schema, None).unwrap();
        assert!(Arc::ptr_eq(&a.node, &b.node));
    }

    #[test]
    fn test_concurrent_resolution_yields_one_instance() {
        let cache = ResolutionCache::new();
        let store = catalog();

        let nodes: Vec<Arc<MetadataNode>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let resolver = Resolver::with_cache(store.clone(), cache.clone());
                    scope.spawn(move || {
                        resolver
                            .resolve("app::dto::User.email", NodeKind::Schema, None)
                            .unwrap()
                            .node
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(nodes.len(), 4);
        assert!(nodes.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(cache.len(), 1);

        cache.clear();
        let fresh = Resolver::with_cache(store, cache.clone())
            .resolve("app::dto::User.email", NodeKind::Schema, None)
            .unwrap();
        assert!(!Arc::ptr_eq(&fresh.node, &nodes[0]));
    }

    #[test]
    fn test_explicit_names_survive_resolution() {
        let resolver = Resolver::new(catalog());
        let resolved = resolver.resolve("app::dto::User@key", NodeKind::Schema, None).unwrap();
        let schema = resolved.node.as_component::<Schema>().unwrap();
        assert_eq!(schema.reference_name(), "Key");
    }
}
