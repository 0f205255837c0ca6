//! Resource documents: named resources with raw properties.
//!
//! ```yaml
//! dialect: cloudformation
//! resources:
//!   Cluster:
//!     type: AWS::MSK::Cluster
//!     properties:
//!       cluster_name: events
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shapekit_schema::{Descriptor, Dialect, RawFieldMap, Template, Value};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::loader::FileFormat;
use crate::provider::CloudProvider;
use crate::registry::SchemaRegistry;
use crate::report::ValidationReport;

/// A parsed resource document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resources in the order they were written.
    #[serde(default)]
    pub resources: IndexMap<String, ResourceEntry>,
}

/// One resource: a schema name or resource type plus its properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default = "empty_properties")]
    pub properties: serde_json::Value,
}

fn empty_properties() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ResourceDocument {
    /// Read a document, picking the format from the file extension.
    pub fn read_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)
            .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
        debug!("Reading resource document from {:?}", path);

        let content = fs::read_to_string(path)?;
        format.parse(&content)
    }

    pub fn from_yaml(content: &str) -> CatalogResult<Self> {
        FileFormat::Yaml.parse(content)
    }

    pub fn from_json(content: &str) -> CatalogResult<Self> {
        FileFormat::Json.parse(content)
    }

    /// Providers of the document's resources that can be detected from their types.
    pub fn providers(&self, registry: &SchemaRegistry) -> BTreeSet<&'static str> {
        self.resources
            .values()
            .filter_map(|entry| {
                let resource_type = registry
                    .resolve(&entry.resource_type)
                    .ok()
                    .and_then(|s| s.resource_type().map(str::to_string))
                    .unwrap_or_else(|| entry.resource_type.clone());
                CloudProvider::detect(&resource_type)
            })
            .map(|p| p.as_str())
            .collect()
    }
}

/// Builds descriptors from resource documents through a schema registry.
pub struct DocumentReader<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> DocumentReader<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Build one resource's descriptor.
    pub fn build_resource(&self, id: &str, entry: &ResourceEntry) -> CatalogResult<Descriptor> {
        let schema = self.registry.resolve(&entry.resource_type)?;

        let args = match Value::from_json(entry.properties.clone()) {
            Value::Map(map) => map,
            Value::Null => RawFieldMap::new(),
            other => {
                return Err(CatalogError::InvalidDocument(format!(
                    "properties of '{}' must be a mapping, got {}",
                    id,
                    other.describe()
                )))
            }
        };

        schema.construct(args).map_err(|source| CatalogError::Resource {
            id: id.to_string(),
            source,
        })
    }

    /// Build every resource, stopping at the first failure.
    pub fn build(&self, document: &ResourceDocument) -> CatalogResult<Vec<(String, Descriptor)>> {
        document
            .resources
            .iter()
            .map(|(id, entry)| Ok((id.clone(), self.build_resource(id, entry)?)))
            .collect()
    }

    /// Try every resource and record each outcome.
    pub fn validate(&self, document: &ResourceDocument) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (id, entry) in &document.resources {
            match self.build_resource(id, entry) {
                Ok(descriptor) => {
                    let message = match descriptor.schema().resource_type() {
                        Some(resource_type) => format!("{} ({})", descriptor.type_name(), resource_type),
                        None => descriptor.type_name().to_string(),
                    };
                    report.add_check(id, true, &message);
                }
                Err(e) => {
                    warn!("Resource {} is invalid: {}", id, e);
                    let message = match e {
                        CatalogError::Resource { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    report.add_check(id, false, &message);
                }
            }
        }
        report
    }

    /// Pick the output dialect.
    ///
    /// An explicit dialect wins, then the document's own. Otherwise the
    /// resources' provider decides; mixing providers needs an explicit dialect.
    pub fn dialect_for(&self, document: &ResourceDocument, explicit: Option<Dialect>) -> CatalogResult<Dialect> {
        if let Some(dialect) = explicit.or(document.dialect) {
            return Ok(dialect);
        }

        let providers = document.providers(self.registry);
        match providers.len() {
            0 => Ok(Dialect::CloudFormation),
            1 => Ok(providers
                .iter()
                .next()
                .and_then(|p| CloudProvider::from_str(p))
                .map(|p| p.default_dialect())
                .unwrap_or(Dialect::CloudFormation)),
            _ => Err(CatalogError::InvalidDocument(format!(
                "resources span several providers ({}); choose a dialect",
                providers.into_iter().collect::<Vec<_>>().join(", ")
            ))),
        }
    }

    /// Build a template and decide its dialect.
    pub fn to_template(
        &self,
        document: &ResourceDocument,
        explicit: Option<Dialect>,
    ) -> CatalogResult<(Template, Dialect)> {
        let dialect = self.dialect_for(document, explicit)?;

        let mut template = Template::new();
        if let Some(description) = &document.description {
            template = template.with_description(description);
        }
        for (id, descriptor) in self.build(document)? {
            template.add_resource(id, descriptor)?;
        }

        Ok((template, dialect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapekit_schema::ShapeError;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    #[test]
    fn test_build_resource() {
        let registry = registry();
        let document = ResourceDocument::from_yaml(
            r#"
resources:
  Config:
    type: AWS::MSK::Configuration
    properties:
      name: defaults
      server_properties: "auto.create.topics.enable=false"
"#,
        )
        .unwrap();

        let built = DocumentReader::new(&registry).build(&document).unwrap();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].0, "Config");
        assert_eq!(built[0].1.get_str("name"), Some("defaults"));
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let registry = registry();
        let document = ResourceDocument::from_yaml(
            r#"
resources:
  Config:
    type: CfnConfiguration
    properties:
      name: defaults
  Secret:
    type: AWS::MSK::BatchScramSecret
    properties:
      cluster_arn: 12
  Disk:
    type: google_compute_disk
    properties:
      name: boot
"#,
        )
        .unwrap();

        let report = DocumentReader::new(&registry).validate(&document);
        assert!(!report.passed);
        assert_eq!(report.passed_count(), 1);

        let failed: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["Config", "Secret"]);
        assert!(report.checks[0].message.contains("Missing required property 'server_properties'"));
    }

    #[test]
    fn test_resource_error_keeps_source() {
        let registry = registry();
        let entry = ResourceEntry {
            resource_type: "AWS::MSK::BatchScramSecret".to_string(),
            properties: serde_json::json!({}),
        };
        let err = DocumentReader::new(&registry)
            .build_resource("Secret", &entry)
            .unwrap_err();

        match err {
            CatalogError::Resource { id, source } => {
                assert_eq!(id, "Secret");
                assert!(matches!(source, ShapeError::MissingRequired { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_dialect_inference() {
        let registry = registry();
        let reader = DocumentReader::new(&registry);

        let gcp = ResourceDocument::from_yaml(
            "resources:\n  boot:\n    type: GoogleComputeDisk\n    properties: {name: boot}\n",
        )
        .unwrap();
        assert_eq!(reader.dialect_for(&gcp, None).unwrap(), Dialect::Terraform);
        assert_eq!(
            reader.dialect_for(&gcp, Some(Dialect::CloudFormation)).unwrap(),
            Dialect::CloudFormation
        );

        let mixed = ResourceDocument::from_yaml(
            r#"
resources:
  boot:
    type: google_compute_disk
  Config:
    type: AWS::MSK::Configuration
"#,
        )
        .unwrap();
        assert!(matches!(
            reader.dialect_for(&mixed, None),
            Err(CatalogError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_resources_keep_document_order() {
        let registry = registry();
        let document = ResourceDocument::from_yaml(
            r#"
resources:
  Zeta:
    type: CfnConfiguration
    properties: {name: zeta, server_properties: "a=1"}
  Alpha:
    type: CfnConfiguration
    properties: {name: alpha, server_properties: "a=2"}
"#,
        )
        .unwrap();
        let reader = DocumentReader::new(&registry);

        let report = reader.validate(&document);
        let ids: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ids, vec!["Zeta", "Alpha"]);

        let (template, dialect) = reader.to_template(&document, None).unwrap();
        let rendered = template.render(dialect).unwrap();
        let rendered_ids: Vec<&str> = rendered["Resources"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(rendered_ids, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_properties_must_be_mapping() {
        let registry = registry();
        let entry = ResourceEntry {
            resource_type: "CfnConfiguration".to_string(),
            properties: serde_json::json!(["name"]),
        };
        assert!(matches!(
            DocumentReader::new(&registry).build_resource("Config", &entry),
            Err(CatalogError::InvalidDocument(_))
        ));
    }
}
