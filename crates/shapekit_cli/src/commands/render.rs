//! Render command - Render a resource document as a template.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use shapekit_catalog::{DocumentReader, ResourceDocument};
use shapekit_schema::Dialect;

use super::{parse_dialect, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Resource document (YAML, JSON or TOML)
    pub document: PathBuf,

    /// Output dialect: cloudformation (cfn) or terraform (tf)
    #[arg(short, long, value_parser = parse_dialect)]
    pub dialect: Option<Dialect>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, ctx: &Context) -> Result<()> {
    info!("Rendering {}", args.document.display());

    let document = ResourceDocument::read_file(&args.document)
        .with_context(|| format!("Failed to read document {}", args.document.display()))?;

    let explicit = args
        .dialect
        .or(document.dialect)
        .or(ctx.config.default_dialect);
    let (template, dialect) = DocumentReader::new(&ctx.registry).to_template(&document, explicit)?;
    let rendered = template.render(dialect)?;

    let text = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&rendered)?,
        OutputFormat::Yaml => serde_yaml::to_string(&rendered)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !ctx.quiet {
                println!(
                    "✅ Rendered {} resource(s) as {} to {}",
                    template.len(),
                    dialect,
                    path.display()
                );
            }
        }
        None => println!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapekit_catalog::SchemaRegistry;
    use tempfile::tempdir;

    #[test]
    fn test_render_to_file() {
        let dir = tempdir().unwrap();
        let document = dir.path().join("stack.yaml");
        fs::write(
            &document,
            r#"
resources:
  Config:
    type: AWS::MSK::Configuration
    properties:
      name: defaults
      server_properties: "auto.create.topics.enable=true"
"#,
        )
        .unwrap();

        let ctx = Context {
            registry: SchemaRegistry::builtin().unwrap(),
            config: Default::default(),
            quiet: true,
        };
        let output = dir.path().join("template.json");
        let args = RenderArgs {
            document,
            dialect: None,
            format: OutputFormat::Json,
            output: Some(output.clone()),
        };
        execute(args, &ctx).unwrap();

        let rendered: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(rendered["AWSTemplateFormatVersion"], "2010-09-09");
        let config = &rendered["Resources"]["Config"];
        assert_eq!(config["Type"], "AWS::MSK::Configuration");
        assert_eq!(config["Properties"]["Name"], "defaults");
    }
}
