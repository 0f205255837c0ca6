//! Validate command - Validate resource documents.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use shapekit_catalog::{DocumentReader, ResourceDocument};

use super::{CliError, Context};

#[derive(Args)]
pub struct ValidateArgs {
    /// Documents or glob patterns (e.g. "stacks/**/*.yaml")
    #[arg(required = true)]
    pub documents: Vec<String>,
}

/// Expand glob patterns; plain paths are kept as given.
pub fn expand_documents(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| CliError::InvalidArgument(format!("{}: {}", pattern, e)))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        debug!("Pattern {} matched {} file(s)", pattern, matches.len());

        if matches.is_empty() {
            return Err(CliError::InvalidArgument(format!("no documents match '{}'", pattern)).into());
        }
        paths.extend(matches);
    }

    Ok(paths)
}

pub fn execute(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let paths = expand_documents(&args.documents)?;
    info!("Validating {} document(s)", paths.len());

    let reader = DocumentReader::new(&ctx.registry);
    let mut invalid = 0;
    let mut valid = 0;

    for path in &paths {
        if !ctx.quiet {
            println!("📋 {}", path.display());
        }

        let document = match ResourceDocument::read_file(path) {
            Ok(document) => document,
            Err(e) => {
                invalid += 1;
                println!("   ❌ {}", e);
                continue;
            }
        };

        if document.resources.is_empty() {
            println!("   ⚠️  No resources defined");
            continue;
        }

        let report = reader.validate(&document);
        for check in &report.checks {
            if check.passed {
                valid += 1;
                if !ctx.quiet {
                    println!("   ✅ {}: {}", check.name, check.message);
                }
            } else {
                invalid += 1;
                println!("   ❌ {}: {}", check.name, check.message);
            }
        }
    }

    println!();
    if invalid == 0 {
        println!("✅ All {} resource(s) valid", valid);
        Ok(())
    } else {
        println!("❌ {} invalid, {} valid. Please fix the issues above.", invalid, valid);
        Err(CliError::ValidationFailed(invalid).into())
    }
}
