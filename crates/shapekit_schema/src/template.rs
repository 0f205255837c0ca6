//! Templates: resource descriptors collected under logical ids.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map};
use tracing::debug;

use crate::descriptor::Descriptor;
use crate::error::{ShapeError, ShapeResult};
use crate::render::{render_properties, Dialect};

pub const CFN_TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

fn cfn_logical_id() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("logical id pattern is valid"))
}

fn tf_logical_id() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("logical id pattern is valid")
    })
}

/// An ordered set of resources ready to be rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    description: Option<String>,
    resources: Vec<(String, Descriptor)>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a resource under `logical_id`.
    ///
    /// The descriptor must belong to a resource schema. The id must be unused
    /// among resources of the same type; CloudFormation additionally requires
    /// ids to be unique across types, which [`Template::render`] checks.
    pub fn add_resource(&mut self, logical_id: impl Into<String>, descriptor: Descriptor) -> ShapeResult<()> {
        let logical_id = logical_id.into();
        let resource_type = descriptor
            .schema()
            .resource_type()
            .ok_or_else(|| ShapeError::NotAResource(descriptor.type_name().to_string()))?;
        let taken = self
            .resources
            .iter()
            .any(|(id, d)| *id == logical_id && d.schema().resource_type() == Some(resource_type));
        if taken {
            return Err(ShapeError::DuplicateResource(logical_id));
        }
        debug!(id = %logical_id, resource = descriptor.type_name(), "Added resource to template");
        self.resources.push((logical_id, descriptor));
        Ok(())
    }

    pub fn with_resource(mut self, logical_id: impl Into<String>, descriptor: Descriptor) -> ShapeResult<Self> {
        self.add_resource(logical_id, descriptor)?;
        Ok(self)
    }

    /// First resource registered under `logical_id`, whatever its type.
    pub fn get(&self, logical_id: &str) -> Option<&Descriptor> {
        self.resources
            .iter()
            .find(|(id, _)| id == logical_id)
            .map(|(_, d)| d)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.resources.iter().map(|(id, d)| (id.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Render the whole template in `dialect`.
    pub fn render(&self, dialect: Dialect) -> ShapeResult<serde_json::Value> {
        for (id, _) in &self.resources {
            let valid = match dialect {
                Dialect::CloudFormation => cfn_logical_id().is_match(id),
                Dialect::Terraform => tf_logical_id().is_match(id),
            };
            if !valid {
                return Err(ShapeError::InvalidLogicalId {
                    id: id.clone(),
                    dialect: dialect.to_string(),
                });
            }
        }

        if dialect == Dialect::CloudFormation {
            let mut seen = HashSet::new();
            for (id, _) in &self.resources {
                if !seen.insert(id.as_str()) {
                    return Err(ShapeError::DuplicateResource(id.clone()));
                }
            }
        }

        let rendered = match dialect {
            Dialect::CloudFormation => self.render_cloudformation(),
            Dialect::Terraform => self.render_terraform(),
        };
        Ok(rendered)
    }

    fn render_cloudformation(&self) -> serde_json::Value {
        let mut resources = Map::new();
        for (id, descriptor) in &self.resources {
            resources.insert(
                id.clone(),
                json!({
                    "Type": descriptor.schema().resource_type(),
                    "Properties": render_properties(descriptor, Dialect::CloudFormation),
                }),
            );
        }

        let mut template = Map::new();
        template.insert("AWSTemplateFormatVersion".to_string(), json!(CFN_TEMPLATE_FORMAT_VERSION));
        if let Some(description) = &self.description {
            template.insert("Description".to_string(), json!(description));
        }
        template.insert("Resources".to_string(), serde_json::Value::Object(resources));
        serde_json::Value::Object(template)
    }

    fn render_terraform(&self) -> serde_json::Value {
        let mut by_type: Map<String, serde_json::Value> = Map::new();
        for (id, descriptor) in &self.resources {
            let resource_type = descriptor.schema().resource_type().unwrap_or_default();
            let entry = by_type
                .entry(resource_type.to_string())
                .or_insert_with(|| serde_json::Value::Object(Map::new()));
            if let serde_json::Value::Object(blocks) = entry {
                blocks.insert(id.clone(), render_properties(descriptor, Dialect::Terraform));
            }
        }
        json!({ "resource": by_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, FieldType, Schema};
    use crate::value::Token;
    use std::sync::Arc;

    fn configuration() -> Arc<Schema> {
        Schema::resource("CfnConfiguration", "AWS::MSK::Configuration")
            .field(FieldSchema::new("name", FieldType::String).required())
            .field(FieldSchema::new("server_properties", FieldType::String).required())
            .into_shared()
    }

    fn disk() -> Arc<Schema> {
        Schema::resource("GoogleComputeDisk", "google_compute_disk")
            .field(FieldSchema::new("name", FieldType::String).required())
            .field(FieldSchema::new("zone", FieldType::String))
            .into_shared()
    }

    #[test]
    fn test_render_cloudformation_template() {
        let config = configuration()
            .construct([("name", "kafka-defaults"), ("server_properties", "auto.create.topics.enable=true")])
            .unwrap();
        let template = Template::new()
            .with_description("MSK configuration")
            .with_resource("KafkaConfig", config)
            .unwrap();

        let rendered = template.render(Dialect::CloudFormation).unwrap();
        assert_eq!(rendered["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(rendered["Description"], "MSK configuration");
        assert_eq!(rendered["Resources"]["KafkaConfig"]["Type"], "AWS::MSK::Configuration");
        assert_eq!(
            rendered["Resources"]["KafkaConfig"]["Properties"]["ServerProperties"],
            "auto.create.topics.enable=true"
        );
    }

    #[test]
    fn test_render_terraform_template() {
        let boot = disk().builder().arg("name", "boot").arg("zone", "us-central1-a").build().unwrap();
        let data = disk()
            .builder()
            .arg("name", "data")
            .arg("zone", Token::get_att("google_compute_disk.boot", "zone"))
            .build()
            .unwrap();
        let template = Template::new()
            .with_resource("boot", boot)
            .unwrap()
            .with_resource("data", data)
            .unwrap();

        let rendered = template.render(Dialect::Terraform).unwrap();
        assert_eq!(rendered["resource"]["google_compute_disk"]["boot"]["name"], "boot");
        assert_eq!(
            rendered["resource"]["google_compute_disk"]["data"]["zone"],
            "${google_compute_disk.boot.zone}"
        );
    }

    #[test]
    fn test_rejects_non_resource() {
        let props = Schema::new("ClusterConfigurationInfo")
            .field(FieldSchema::new("arn", FieldType::String))
            .into_shared();
        let d = props.construct([("arn", "arn:aws:kafka:config")]).unwrap();

        let err = Template::new().add_resource("Config", d).unwrap_err();
        assert_eq!(err, ShapeError::NotAResource("ClusterConfigurationInfo".to_string()));
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let d = disk().construct([("name", "boot")]).unwrap();
        let mut template = Template::new();
        template.add_resource("boot", d.clone()).unwrap();
        assert!(matches!(
            template.add_resource("boot", d),
            Err(ShapeError::DuplicateResource(_))
        ));
        assert_eq!(template.len(), 1);
    }

    #[test]
    fn test_same_id_across_types() {
        let boot = disk().construct([("name", "main")]).unwrap();
        let config = configuration()
            .construct([("name", "main"), ("server_properties", "x=1")])
            .unwrap();
        let template = Template::new()
            .with_resource("main", boot)
            .unwrap()
            .with_resource("main", config)
            .unwrap();
        assert_eq!(template.len(), 2);

        let rendered = template.render(Dialect::Terraform).unwrap();
        assert_eq!(rendered["resource"]["google_compute_disk"]["main"]["name"], "main");
        assert_eq!(rendered["resource"]["AWS::MSK::Configuration"]["main"]["name"], "main");

        assert_eq!(
            template.render(Dialect::CloudFormation),
            Err(ShapeError::DuplicateResource("main".to_string()))
        );
    }

    #[test]
    fn test_logical_id_rules_depend_on_dialect() {
        let d = disk().construct([("name", "boot")]).unwrap();
        let template = Template::new().with_resource("boot_disk", d).unwrap();

        assert!(template.render(Dialect::Terraform).is_ok());
        assert!(matches!(
            template.render(Dialect::CloudFormation),
            Err(ShapeError::InvalidLogicalId { .. })
        ));
    }
}
