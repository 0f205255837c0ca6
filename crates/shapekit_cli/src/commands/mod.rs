//! CLI command definitions.
//!
//! Each subcommand works on the schema registry built from the built-in
//! tables plus any configured schema definition directories.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use shapekit_catalog::{SchemaLoader, SchemaRegistry};
use shapekit_schema::Dialect;
use thiserror::Error;
use tracing::info;

use crate::config::CliConfig;

pub mod render;
pub mod schemas;
pub mod validate;

/// shapekit - schema-driven resource property descriptors
#[derive(Parser)]
#[command(name = "shapekit")]
#[command(version, about = "shapekit - schema-driven resource property descriptors")]
#[command(long_about = r#"
shapekit checks infrastructure resource documents against published resource
schemas and renders them as CloudFormation or Terraform JSON.

COMMANDS:
  validate   → Validate resource documents
  render     → Render a document as a CloudFormation or Terraform template
  schemas    → List known resource schemas
  describe   → Show the fields of one schema

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or unknown schema
  3 - Validation failure
  4 - Schema definition error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./shapekit.toml when present)
    #[arg(long, global = true, env = "SHAPEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional schema definition directory (repeatable)
    #[arg(long = "schema-dir", global = true, env = "SHAPEKIT_SCHEMA_DIR")]
    pub schema_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate resource documents
    Validate(validate::ValidateArgs),

    /// Render a resource document as a template
    Render(render::RenderArgs),

    /// List known resource schemas
    Schemas(schemas::SchemasArgs),

    /// Show the fields of a schema
    Describe(schemas::DescribeArgs),
}

/// Failures that map to dedicated exit codes.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Validation failed: {0} invalid resource(s)")]
    ValidationFailed(usize),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// State shared by all commands.
pub struct Context {
    pub registry: SchemaRegistry,
    pub config: CliConfig,
    pub quiet: bool,
}

impl Context {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = CliConfig::load(cli.config.as_deref())?;

        let mut registry = SchemaRegistry::builtin()?;
        for dir in config.schema_dirs.iter().chain(&cli.schema_dirs) {
            let loaded = SchemaLoader::load_path(dir, &mut registry)
                .with_context(|| format!("Failed to load schemas from {}", dir.display()))?;
            info!("Loaded {} schema(s) from {}", loaded.len(), dir.display());
        }

        Ok(Self {
            registry,
            config,
            quiet: cli.quiet,
        })
    }
}

/// Parse a `--dialect` value.
pub fn parse_dialect(s: &str) -> Result<Dialect, String> {
    Dialect::from_str(s).ok_or_else(|| {
        format!("unknown dialect '{}' (expected cloudformation or terraform)", s)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "shapekit",
            "--schema-dir",
            "a",
            "--schema-dir",
            "b",
            "render",
            "stack.yaml",
            "--dialect",
            "tf",
        ])
        .unwrap();

        assert_eq!(cli.schema_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        match cli.command {
            Commands::Render(args) => assert_eq!(args.dialect, Some(Dialect::Terraform)),
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!(parse_dialect("cfn"), Ok(Dialect::CloudFormation));
        assert!(parse_dialect("arm").is_err());
    }
}
