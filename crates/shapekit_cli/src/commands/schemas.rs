//! Schemas and describe commands - Inspect the schema registry.

use anyhow::Result;
use clap::Args;

use shapekit_catalog::CloudProvider;
use shapekit_schema::{Dialect, Schema};

use super::{CliError, Context};

#[derive(Args)]
pub struct SchemasArgs {
    /// Only list resources of this provider (aws, gcp)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Include nested property schemas
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Schema name or resource type (e.g. CfnCluster or AWS::MSK::Cluster)
    pub name: String,
}

pub fn execute(args: SchemasArgs, ctx: &Context) -> Result<()> {
    if args.all {
        let names = ctx.registry.names();
        if !ctx.quiet {
            println!("📚 {} schema(s):\n", names.len());
        }
        for name in names {
            println!("  {}", name);
        }
        return Ok(());
    }

    let resources = match &args.provider {
        Some(provider) => {
            let provider = CloudProvider::from_str(provider).ok_or_else(|| {
                CliError::InvalidArgument(format!("unknown provider '{}' (expected aws or gcp)", provider))
            })?;
            ctx.registry.for_provider(provider)
        }
        None => ctx.registry.resources(),
    };

    if resources.is_empty() {
        println!("⚠️  No resource schemas found");
        return Ok(());
    }

    if !ctx.quiet {
        println!("📚 {} resource schema(s):\n", resources.len());
    }
    for schema in &resources {
        println!(
            "  {:<40} {:<40} {} required",
            schema.name(),
            schema.resource_type().unwrap_or("-"),
            schema.required_fields().count()
        );
    }

    Ok(())
}

pub fn describe(args: DescribeArgs, ctx: &Context) -> Result<()> {
    let schema = ctx.registry.resolve(&args.name)?;
    print!("{}", describe_schema(&schema));
    Ok(())
}

/// Human-readable field listing for one schema.
pub fn describe_schema(schema: &Schema) -> String {
    let mut out = format!("📦 {}\n", schema.name());
    if let Some(resource_type) = schema.resource_type() {
        out.push_str(&format!("   Resource type: {}\n", resource_type));
    }
    if let Some(description) = schema.description() {
        out.push_str(&format!("   {}\n", description));
    }
    out.push('\n');

    for field in schema.fields() {
        let marker = if field.required { "*" } else { " " };
        out.push_str(&format!(
            "  {} {:<36} {:<28} {}\n",
            marker,
            field.name,
            Dialect::CloudFormation.property_name(field),
            field.field_type
        ));
        if let Some(description) = &field.description {
            out.push_str(&format!("      {}\n", description));
        }
    }

    if schema.required_fields().next().is_some() {
        out.push_str("\n  * required\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapekit_catalog::aws_msk;

    #[test]
    fn test_describe_schema() {
        let text = describe_schema(&aws_msk::cfn_configuration());

        assert!(text.starts_with("📦 CfnConfiguration\n"));
        assert!(text.contains("Resource type: AWS::MSK::Configuration"));
        assert!(text.contains("* name"));
        assert!(text.contains("ServerProperties"));
        assert!(text.contains("list of string"));
        assert!(text.contains("* required"));
    }
}
