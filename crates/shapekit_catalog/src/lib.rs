//! # shapekit_catalog
//!
//! Schema catalog for shapekit.
//!
//! This crate holds the built-in resource schema tables, a registry to look
//! them up by name or resource type, a loader for user-supplied schema
//! definitions, and a reader that turns resource documents into descriptors.
//!
//! ## Features
//!
//! - Built-in tables for Amazon MSK and Google Cloud resources
//! - Schema definitions in YAML, JSON or TOML
//! - Document validation reports and template assembly
//!
//! ## Example
//!
//! ```rust,no_run
//! use shapekit_catalog::{DocumentReader, ResourceDocument, SchemaRegistry};
//!
//! let registry = SchemaRegistry::builtin()?;
//! let document = ResourceDocument::read_file("stack.yaml")?;
//!
//! let report = DocumentReader::new(&registry).validate(&document);
//! for check in &report.checks {
//!     println!("{}: {}", check.name, check.message);
//! }
//! # Ok::<(), shapekit_catalog::CatalogError>(())
//! ```

pub mod aws_msk;
pub mod document;
pub mod error;
pub mod google;
pub mod loader;
pub mod provider;
pub mod registry;
pub mod report;

pub use document::{DocumentReader, ResourceDocument, ResourceEntry};
pub use error::{CatalogError, CatalogResult};
pub use loader::{parse_type, FieldDefinition, FileFormat, SchemaDefinition, SchemaFile, SchemaLoader, TypeExpr};
pub use provider::CloudProvider;
pub use registry::SchemaRegistry;
pub use report::{ValidationCheck, ValidationReport};
