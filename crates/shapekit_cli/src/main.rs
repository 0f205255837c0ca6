//! shapekit CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or unknown schema
//! - 3: Validation failure
//! - 4: Schema definition error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{Cli, CliError, Commands, Context};
use shapekit_catalog::CatalogError;
use shapekit_schema::ShapeError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const SCHEMA_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "shapekit=debug"
    } else if cli.quiet {
        "shapekit=warn"
    } else {
        "shapekit=info"
    };
    let mut filter = EnvFilter::from_default_env();
    for directive in [level, "warn"] {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    // Logging may already be initialized; keep going either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = Context::new(&cli).and_then(|ctx| match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &ctx),
        Commands::Render(args) => commands::render::execute(args, &ctx),
        Commands::Schemas(args) => commands::schemas::execute(args, &ctx),
        Commands::Describe(args) => commands::schemas::describe(args, &ctx),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::ValidationFailed(_) => ExitCodes::VALIDATION_FAILURE,
                CliError::InvalidArgument(_) => ExitCodes::INVALID_ARGS,
            };
        }
        if let Some(err) = cause.downcast_ref::<CatalogError>() {
            return match err {
                err if err.is_schema_error() => ExitCodes::SCHEMA_ERROR,
                CatalogError::SchemaNotFound(_) | CatalogError::UnsupportedFormat(_) => {
                    ExitCodes::INVALID_ARGS
                }
                CatalogError::Resource { .. } | CatalogError::InvalidDocument(_) => {
                    ExitCodes::VALIDATION_FAILURE
                }
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<ShapeError>() {
            return match err {
                ShapeError::InvalidSchema { .. } => ExitCodes::SCHEMA_ERROR,
                _ => ExitCodes::VALIDATION_FAILURE,
            };
        }
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("not found") || msg.contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn test_categorize_cli_errors() {
        let err = anyhow::Error::from(CliError::ValidationFailed(2));
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);

        let err = anyhow::Error::from(CliError::InvalidArgument("x".to_string()));
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_through_context() {
        let result: Result<(), CatalogError> =
            Err(CatalogError::CyclicDefinition("A -> B -> A".to_string()));
        let err = result.context("Failed to load schemas").unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::SCHEMA_ERROR);

        let err = anyhow::Error::from(CatalogError::SchemaNotFound("AWS::SQS::Queue".to_string()));
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_shape_errors() {
        let err = anyhow::Error::from(ShapeError::DuplicateResource("Cluster".to_string()));
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_categorize_fallback() {
        let err = anyhow::anyhow!("Config file not found: shapekit.toml");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
        assert_eq!(categorize_error(&anyhow::anyhow!("boom")), ExitCodes::GENERAL_ERROR);
    }
}
