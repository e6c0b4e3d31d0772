//! Assembly-level caches
//!
//! The assembler can keep its prepared operations and its rendered document
//! in an external cache under two fixed keys. Keys do not depend on the route
//! set: callers that change routes own invalidation.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::node::Operation;

/// Key of the prepared-operations slot
pub const OPERATIONS_KEY: &str = "routedoc.operations";
/// Key of the rendered-document slot
pub const DOCUMENT_KEY: &str = "routedoc.document";

/// Route name -> prepared operation
pub type OperationTable = IndexMap<String, PreparedOperation>;

/// An operation placed on its route
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    pub path: String,
    pub methods: Vec<String>,
    pub operation: Operation,
}

#[derive(Debug, Clone)]
pub enum CacheEntry {
    Operations(Arc<OperationTable>),
    Document(Arc<Value>),
}

/// Storage for assembly results.
///
/// Errors from a cache backend propagate to the caller unchanged.
pub trait DocumentCache: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    fn store(&self, key: &str, entry: CacheEntry) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl DocumentCache for MemoryCache {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_cache_slots() {
        let cache = MemoryCache::new();
        assert!(cache.load(DOCUMENT_KEY).unwrap().is_none());

        cache
            .store(DOCUMENT_KEY, CacheEntry::Document(Arc::new(json!({"openapi": "3.0.2"}))))
            .unwrap();
        cache
            .store(OPERATIONS_KEY, CacheEntry::Operations(Arc::new(OperationTable::new())))
            .unwrap();
        assert_eq!(cache.len(), 2);

        match cache.load(DOCUMENT_KEY).unwrap() {
            Some(CacheEntry::Document(doc)) => assert_eq!(doc["openapi"], "3.0.2"),
            other => panic!("unexpected entry: {other:?}"),
        }

        cache.remove(DOCUMENT_KEY).unwrap();
        assert!(!cache.contains(DOCUMENT_KEY));
    }
}
