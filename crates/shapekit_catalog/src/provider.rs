//! Cloud provider definitions.

use serde::{Deserialize, Serialize};
use shapekit_schema::Dialect;

/// Cloud providers with built-in schema tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Gcp,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(CloudProvider::Aws),
            "gcp" | "google" => Some(CloudProvider::Gcp),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![CloudProvider::Aws, CloudProvider::Gcp]
    }

    /// Dialect resources of this provider render to by default.
    pub fn default_dialect(&self) -> Dialect {
        match self {
            CloudProvider::Aws => Dialect::CloudFormation,
            CloudProvider::Gcp => Dialect::Terraform,
        }
    }

    /// Provider owning a resource type such as `AWS::MSK::Cluster` or `google_compute_disk`.
    pub fn detect(resource_type: &str) -> Option<Self> {
        if resource_type.starts_with("AWS::") {
            Some(CloudProvider::Aws)
        } else if resource_type.starts_with("google_") {
            Some(CloudProvider::Gcp)
        } else {
            None
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
