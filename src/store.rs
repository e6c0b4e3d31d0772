//! Metadata store
//!
//! The store answers "which metadata of kind K is attached to this type,
//! method or property". [`MetadataCatalog`] is the in-memory implementation,
//! populated programmatically or from YAML/JSON catalog files:
//!
//! ```yaml
//! routes:
//!   - name: users_list
//!     path: /users
//!     holder: app::controller::Users@list
//! types:
//!   app::dto::User:
//!     metadata:
//!       - schema: { type: object, properties: { email: { $ref: .email } } }
//!     properties:
//!       email:
//!         - schema: { type: string, format: email }
//!     methods: {}
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, RoutedocError};
use crate::node::{MetadataNode, NodeKind};
use crate::route::RouteDefinition;

/// Source of declarative metadata
pub trait MetadataStore: Send + Sync {
    fn type_exists(&self, type_name: &str) -> bool;

    fn method_exists(&self, type_name: &str, method: &str) -> bool;

    fn property_exists(&self, type_name: &str, property: &str) -> bool;

    fn class_metadata(&self, type_name: &str, kind: NodeKind) -> Option<MetadataNode>;

    fn method_metadata(&self, type_name: &str, method: &str, kind: NodeKind) -> Option<MetadataNode>;

    fn property_metadata(
        &self,
        type_name: &str,
        property: &str,
        kind: NodeKind,
    ) -> Option<MetadataNode>;
}

/// Metadata attached to one type and its members
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeMetadata {
    #[serde(default)]
    pub metadata: Vec<MetadataNode>,
    #[serde(default)]
    pub properties: IndexMap<String, Vec<MetadataNode>>,
    #[serde(default)]
    pub methods: IndexMap<String, Vec<MetadataNode>>,
}

impl TypeMetadata {
    fn merge(&mut self, other: TypeMetadata) {
        self.metadata.extend(other.metadata);
        for (name, nodes) in other.properties {
            self.properties.entry(name).or_default().extend(nodes);
        }
        for (name, nodes) in other.methods {
            self.methods.entry(name).or_default().extend(nodes);
        }
    }
}

/// On-disk catalog layout
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
    #[serde(default)]
    pub types: IndexMap<String, TypeMetadata>,
}

fn first_of_kind(nodes: &[MetadataNode], kind: NodeKind) -> Option<MetadataNode> {
    nodes.iter().find(|node| node.kind() == kind).cloned()
}

/// In-memory metadata store and route list
#[derive(Debug, Default)]
pub struct MetadataCatalog {
    types: IndexMap<String, TypeMetadata>,
    routes: Vec<RouteDefinition>,
}

impl MetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type without metadata
    pub fn declare_type(&mut self, type_name: impl Into<String>) -> &mut Self {
        self.types.entry(type_name.into()).or_default();
        self
    }

    /// Declare a method without metadata
    pub fn declare_method(&mut self, type_name: impl Into<String>, method: impl Into<String>) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .methods
            .entry(method.into())
            .or_default();
        self
    }

    /// Declare a property without metadata
    pub fn declare_property(
        &mut self,
        type_name: impl Into<String>,
        property: impl Into<String>,
    ) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .properties
            .entry(property.into())
            .or_default();
        self
    }

    pub fn add_class_metadata(
        &mut self,
        type_name: impl Into<String>,
        node: impl Into<MetadataNode>,
    ) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .metadata
            .push(node.into());
        self
    }

    pub fn add_method_metadata(
        &mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        node: impl Into<MetadataNode>,
    ) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .methods
            .entry(method.into())
            .or_default()
            .push(node.into());
        self
    }

    pub fn add_property_metadata(
        &mut self,
        type_name: impl Into<String>,
        property: impl Into<String>,
        node: impl Into<MetadataNode>,
    ) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .properties
            .entry(property.into())
            .or_default()
            .push(node.into());
        self
    }

    pub fn add_route(&mut self, route: RouteDefinition) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// Type names known to the catalog, in declaration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Merge a parsed catalog file. Types declared more than once accumulate
    /// their metadata.
    pub fn merge(&mut self, file: CatalogFile) {
        self.routes.extend(file.routes);
        for (name, metadata) in file.types {
            self.types.entry(name).or_default().merge(metadata);
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge(serde_yaml::from_str(content)?);
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge(serde_json::from_str(content)?);
        Ok(catalog)
    }

    /// Load a single catalog file, picking the parser from its extension
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let file: CatalogFile = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(RoutedocError::InvalidFormat(format!(
                    "{}: expected a .yaml, .yml or .json catalog",
                    path.display()
                )))
            }
        };
        debug!(
            path = %path.display(),
            routes = file.routes.len(),
            types = file.types.len(),
            "Loaded catalog file"
        );
        self.merge(file);
        Ok(())
    }

    /// Load every catalog file under a directory, in path order
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml") | Some("json")
                )
            })
            .collect();
        files.sort();

        for file in files {
            self.load_file(&file)?;
        }
        Ok(())
    }

    /// Load a mix of files and directories
    pub fn load_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<()> {
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                self.load_dir(path)?;
            } else {
                self.load_file(path)?;
            }
        }
        Ok(())
    }
}

impl MetadataStore for MetadataCatalog {
    fn type_exists(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn method_exists(&self, type_name: &str, method: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|t| t.methods.contains_key(method))
    }

    fn property_exists(&self, type_name: &str, property: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|t| t.properties.contains_key(property))
    }

    fn class_metadata(&self, type_name: &str, kind: NodeKind) -> Option<MetadataNode> {
        first_of_kind(&self.types.get(type_name)?.metadata, kind)
    }

    fn method_metadata(&self, type_name: &str, method: &str, kind: NodeKind) -> Option<MetadataNode> {
        first_of_kind(self.types.get(type_name)?.methods.get(method)?, kind)
    }

    fn property_metadata(
        &self,
        type_name: &str,
        property: &str,
        kind: NodeKind,
    ) -> Option<MetadataNode> {
        first_of_kind(self.types.get(type_name)?.properties.get(property)?, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Schema;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
routes:
  - name: users_list
    path: /users
    holder: app::Users@list
types:
  app::User:
    metadata:
      - schema: { type: object }
    properties:
      email:
        - schema: { type: string, format: email }
      nickname: []
"#;

    #[test]
    fn test_catalog_from_yaml() {
        let catalog = MetadataCatalog::from_yaml_str(CATALOG).unwrap();
        assert_eq!(catalog.routes().len(), 1);
        assert!(catalog.type_exists("app::User"));
        assert!(catalog.property_exists("app::User", "nickname"));
        assert!(!catalog.method_exists("app::User", "email"));

        let schema = catalog.property_metadata("app::User", "email", NodeKind::Schema);
        assert_eq!(schema.map(|n| n.kind()), Some(NodeKind::Schema));
        assert!(catalog.property_metadata("app::User", "nickname", NodeKind::Schema).is_none());
        assert!(catalog.class_metadata("app::User", NodeKind::Response).is_none());
    }

    #[test]
    fn test_fetch_returns_fresh_instances() {
        let mut catalog = MetadataCatalog::new();
        catalog.add_class_metadata("app::User", Schema::of_type("object"));
        let a = catalog.class_metadata("app::User", NodeKind::Schema).unwrap();
        let b = catalog.class_metadata("app::User", NodeKind::Schema).unwrap();
        assert_ne!(a.reference_name(), b.reference_name());
    }

    #[test]
    fn test_load_dir_merges_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml"), CATALOG).unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"types": {"app::User": {"methods": {"key": []}}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = MetadataCatalog::new();
        catalog.load_dir(dir.path()).unwrap();
        assert!(catalog.method_exists("app::User", "key"));
        assert!(catalog.property_exists("app::User", "email"));
    }

    #[test]
    fn test_load_file_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.txt");
        fs::write(&path, "types: {}").unwrap();
        let mut catalog = MetadataCatalog::new();
        assert!(matches!(
            catalog.load_file(&path),
            Err(RoutedocError::InvalidFormat(_))
        ));
    }
}
