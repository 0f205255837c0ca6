//! Error types for the catalog module.

use std::path::PathBuf;

use shapekit_schema::ShapeError;
use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while registering, loading or reading schemas and documents.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Invalid schema definition in {path:?}: {message}")]
    InvalidDefinition { path: PathBuf, message: String },

    #[error("Unresolved type '{type_name}' in schema {schema}")]
    UnresolvedType { schema: String, type_name: String },

    #[error("Cyclic schema definition: {0}")]
    CyclicDefinition(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Unsupported file format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("Resource '{id}': {source}")]
    Resource {
        id: String,
        #[source]
        source: ShapeError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CatalogError {
    /// True when the error comes from a schema table rather than user input.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidDefinition { .. }
                | CatalogError::UnresolvedType { .. }
                | CatalogError::CyclicDefinition(_)
                | CatalogError::Shape(ShapeError::InvalidSchema { .. })
        )
    }
}
