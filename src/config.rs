//! Configuration management for routedoc
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (routedoc.toml)
//! - Environment variables (ROUTEDOC__*)
//!
//! ## Example config file (routedoc.toml):
//! ```toml
//! [document]
//! title = "User API"
//! version = "1.2.0"
//! servers = ["https://api.example.com"]
//!
//! [assembly]
//! include_undescribed_operations = false
//! strict_component_names = true
//!
//! [fragment]
//! json_schema_dialect = "http://json-schema.org/draft-07/schema#"
//!
//! [export]
//! format = "yaml"
//! style = "pretty"
//!
//! [catalog]
//! paths = ["./metadata"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fragment::DRAFT_07;
use crate::objects::{Info, Server};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutedocConfig {
    /// Document-level fields
    #[serde(default)]
    pub document: DocumentConfig,

    /// Assembly behaviour
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Schema fragment settings
    #[serde(default)]
    pub fragment: FragmentConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Metadata catalog locations
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Server URLs
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Assembly configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Emit an empty operation for routes without operation metadata
    #[serde(default)]
    pub include_undescribed_operations: bool,

    /// Fail when two distinct components share a name
    #[serde(default)]
    pub strict_component_names: bool,
}

/// Fragment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentConfig {
    /// Value of `$schema` in generated fragments
    #[serde(default = "default_dialect")]
    pub json_schema_dialect: String,
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,

    /// JSON layout (ignored for YAML)
    #[serde(default)]
    pub style: OutputStyle,
}

/// Serialization format of exported documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

/// Output style for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Pretty,
    Compact,
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog files or directories
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

// Default value functions
fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_dialect() -> String {
    DRAFT_07.to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            servers: Vec::new(),
        }
    }
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            json_schema_dialect: default_dialect(),
        }
    }
}

impl DocumentConfig {
    /// Info object built from the configured title, version and description
    pub fn info(&self) -> Info {
        let mut info = Info::new(&self.title, &self.version);
        info.description = self.description.clone();
        info
    }

    pub fn servers(&self) -> Vec<Server> {
        self.servers.iter().map(Server::new).collect()
    }
}

impl RoutedocConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["routedoc.toml", ".routedoc.toml", "config/routedoc.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "routedoc") {
            let xdg_config = config_dir.config_dir().join("routedoc.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (ROUTEDOC__SECTION__KEY)
        builder = builder.add_source(
            Environment::with_prefix("ROUTEDOC")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("document.servers")
                .with_list_parse_key("catalog.paths")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Catalog paths with relative entries resolved against the working directory
    pub fn catalog_paths(&self) -> Vec<PathBuf> {
        self.catalog
            .paths
            .iter()
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    std::env::current_dir().unwrap_or_default().join(p)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RoutedocConfig::default();
        assert!(!config.assembly.include_undescribed_operations);
        assert!(!config.assembly.strict_component_names);
        assert_eq!(config.fragment.json_schema_dialect, DRAFT_07);
        assert_eq!(config.export.format, ExportFormat::Json);
    }

    #[test]
    fn test_serialize_config() {
        let config = RoutedocConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[document]"));
        assert!(toml_str.contains("[assembly]"));
        assert!(toml_str.contains("[export]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[document]\ntitle = \"Users\"\nservers = [\"https://api.example.com\"]\n\n[export]\nformat = \"yaml\"\n",
        )
        .unwrap();

        let config = RoutedocConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.document.title, "Users");
        assert_eq!(config.document.version, "1.0.0");
        assert_eq!(config.document.servers()[0].url, "https://api.example.com");
        assert_eq!(config.export.format, ExportFormat::Yaml);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routedoc.toml");
        let mut config = RoutedocConfig::default();
        config.assembly.strict_component_names = true;
        config.save(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: RoutedocConfig = toml::from_str(&content).unwrap();
        assert!(loaded.assembly.strict_component_names);
    }
}
