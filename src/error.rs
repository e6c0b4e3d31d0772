//! Error types for reference resolution and document assembly

use thiserror::Error;

use crate::node::NodeKind;

/// Result type for routedoc operations
pub type Result<T> = std::result::Result<T, RoutedocError>;

/// Errors raised while resolving, collecting and rendering metadata
#[derive(Error, Debug)]
pub enum RoutedocError {
    #[error("Reference `{address}` points at a non-existent {target}")]
    UnresolvedTarget { address: String, target: String },

    #[error("{target} does not carry {kind} metadata")]
    MissingAnnotation { target: String, kind: NodeKind },

    #[error("Media type \"{requested}\" is not supported for this operation")]
    UnsupportedMediaType {
        requested: String,
        supported: Vec<String>,
    },

    #[error("Component name collision: {category}/{name} is claimed by two distinct nodes")]
    DuplicateComponentName { category: String, name: String },

    #[error("Reference `{address}` was rendered before it was resolved")]
    UnresolvedReference { address: String },

    #[error("Invalid reference address: {0}")]
    InvalidAddress(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid schema fragment: {0}")]
    InvalidSchema(String),

    #[error("Invalid catalog format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RoutedocError {
    /// Supported media types carried by an `UnsupportedMediaType` error
    pub fn supported_media_types(&self) -> Option<&[String]> {
        match self {
            RoutedocError::UnsupportedMediaType { supported, .. } => Some(supported),
            _ => None,
        }
    }
}
