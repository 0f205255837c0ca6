//! Built-in schema tables for Google Cloud (Terraform `google-beta` provider).
//!
//! Nested blocks are plain nested schemas; boolean arguments also accept
//! interpolation tokens.

use std::sync::Arc;

use shapekit_schema::{FieldSchema, FieldType, Schema};

fn string(name: &str) -> FieldSchema {
    FieldSchema::new(name, FieldType::String)
}

fn number(name: &str) -> FieldSchema {
    FieldSchema::new(name, FieldType::Number)
}

fn flag(name: &str) -> FieldSchema {
    FieldSchema::new(name, FieldType::resolvable(FieldType::Boolean))
}

fn strings(name: &str) -> FieldSchema {
    FieldSchema::new(name, FieldType::list(FieldType::String))
}

fn block(name: &str, schema: Arc<Schema>) -> FieldSchema {
    FieldSchema::new(name, FieldType::nested(schema))
}

fn labels() -> FieldSchema {
    FieldSchema::new("labels", FieldType::map(FieldType::String))
}

fn timeouts(name: &str, operations: &[&str]) -> Arc<Schema> {
    operations
        .iter()
        .fold(Schema::new(name), |schema, op| schema.field(string(op)))
        .into_shared()
}

/// Every top-level Google table.
pub fn schemas() -> Vec<Arc<Schema>> {
    vec![
        google_compute_disk(),
        google_datastream_private_connection(),
        google_gke_hub_feature_membership(),
    ]
}

fn encryption_key(name: &str) -> Arc<Schema> {
    Schema::new(name)
        .field(string("kms_key_self_link"))
        .field(string("kms_key_service_account"))
        .field(string("raw_key"))
        .into_shared()
}

pub fn google_compute_disk() -> Arc<Schema> {
    Schema::resource("GoogleComputeDisk", "google_compute_disk")
        .with_description("A persistent disk")
        .field(string("name").required())
        .field(string("description"))
        .field(block(
            "disk_encryption_key",
            encryption_key("GoogleComputeDiskDiskEncryptionKey"),
        ))
        .field(string("id"))
        .field(string("image"))
        .field(string("interface"))
        .field(labels())
        .field(flag("multi_writer"))
        .field(number("physical_block_size_bytes"))
        .field(string("project"))
        .field(number("provisioned_iops"))
        .field(strings("resource_policies"))
        .field(number("size"))
        .field(string("snapshot"))
        .field(string("source_disk"))
        .field(block(
            "source_image_encryption_key",
            encryption_key("GoogleComputeDiskSourceImageEncryptionKey"),
        ))
        .field(block(
            "source_snapshot_encryption_key",
            encryption_key("GoogleComputeDiskSourceSnapshotEncryptionKey"),
        ))
        .field(block(
            "timeouts",
            timeouts("GoogleComputeDiskTimeouts", &["create", "delete", "update"]),
        ))
        .field(string("type"))
        .field(string("zone"))
        .into_shared()
}

pub fn google_datastream_private_connection() -> Arc<Schema> {
    let vpc_peering = Schema::new("GoogleDatastreamPrivateConnectionVpcPeeringConfig")
        .field(string("subnet").required())
        .field(string("vpc").required())
        .into_shared();

    Schema::resource(
        "GoogleDatastreamPrivateConnection",
        "google_datastream_private_connection",
    )
    .with_description("A Datastream private connectivity configuration")
    .field(string("display_name").required())
    .field(string("location").required())
    .field(string("private_connection_id").required())
    .field(block("vpc_peering_config", vpc_peering).required())
    .field(string("id"))
    .field(labels())
    .field(string("project"))
    .field(block(
        "timeouts",
        timeouts("GoogleDatastreamPrivateConnectionTimeouts", &["create", "delete"]),
    ))
    .into_shared()
}

fn config_sync() -> Arc<Schema> {
    let git = Schema::new("GoogleGkeHubFeatureMembershipConfigmanagementConfigSyncGit")
        .field(string("gcp_service_account_email"))
        .field(string("https_proxy"))
        .field(string("policy_dir"))
        .field(string("secret_type"))
        .field(string("sync_branch"))
        .field(string("sync_repo"))
        .field(string("sync_rev"))
        .field(string("sync_wait_secs"))
        .into_shared();

    Schema::new("GoogleGkeHubFeatureMembershipConfigmanagementConfigSync")
        .field(block("git", git))
        .field(flag("prevent_drift"))
        .field(string("source_format"))
        .into_shared()
}

fn policy_controller() -> Arc<Schema> {
    let monitoring = Schema::new(
        "GoogleGkeHubFeatureMembershipConfigmanagementPolicyControllerMonitoring",
    )
    .field(strings("backends"))
    .into_shared();

    Schema::new("GoogleGkeHubFeatureMembershipConfigmanagementPolicyController")
        .field(string("audit_interval_seconds"))
        .field(flag("enabled"))
        .field(strings("exemptable_namespaces"))
        .field(flag("log_denies_enabled"))
        .field(block("monitoring", monitoring))
        .field(flag("mutation_enabled"))
        .field(flag("referential_rules_enabled"))
        .field(flag("template_library_installed"))
        .into_shared()
}

fn configmanagement() -> Arc<Schema> {
    let binauthz = Schema::new("GoogleGkeHubFeatureMembershipConfigmanagementBinauthz")
        .field(flag("enabled"))
        .into_shared();
    let hierarchy_controller =
        Schema::new("GoogleGkeHubFeatureMembershipConfigmanagementHierarchyController")
            .field(flag("enabled"))
            .field(flag("enable_hierarchical_resource_quota"))
            .field(flag("enable_pod_tree_labels"))
            .into_shared();

    Schema::new("GoogleGkeHubFeatureMembershipConfigmanagement")
        .field(block("binauthz", binauthz))
        .field(block("config_sync", config_sync()))
        .field(block("hierarchy_controller", hierarchy_controller))
        .field(block("policy_controller", policy_controller()))
        .field(string("version"))
        .into_shared()
}

pub fn google_gke_hub_feature_membership() -> Arc<Schema> {
    let mesh = Schema::new("GoogleGkeHubFeatureMembershipMesh")
        .field(string("control_plane"))
        .field(string("management"))
        .into_shared();

    Schema::resource(
        "GoogleGkeHubFeatureMembership",
        "google_gke_hub_feature_membership",
    )
    .with_description("Per-membership configuration of a GKE Hub feature")
    .field(string("feature").required())
    .field(string("location").required())
    .field(string("membership").required())
    .field(block("configmanagement", configmanagement()))
    .field(string("id"))
    .field(block("mesh", mesh))
    .field(string("project"))
    .field(block(
        "timeouts",
        timeouts("GoogleGkeHubFeatureMembershipTimeouts", &["create", "delete", "update"]),
    ))
    .into_shared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapekit_schema::{render_properties, Dialect, RawFieldMap, ShapeError, Token};

    #[test]
    fn test_tables_are_valid() {
        for schema in schemas() {
            schema.validate().unwrap();
        }
    }

    #[test]
    fn test_disk_with_encryption_key() {
        let disk = google_compute_disk()
            .builder()
            .arg("name", "data-disk")
            .arg("zone", "europe-west1-b")
            .arg("size", 200)
            .arg(
                "disk_encryption_key",
                RawFieldMap::new().with("kms_key_self_link", Token::get_att("google_kms_crypto_key.disk", "id")),
            )
            .arg("labels", RawFieldMap::new().with("Team", "storage"))
            .build()
            .unwrap();

        let rendered = render_properties(&disk, Dialect::Terraform);
        assert_eq!(
            rendered["disk_encryption_key"]["kms_key_self_link"],
            "${google_kms_crypto_key.disk.id}"
        );
        assert_eq!(rendered["labels"]["Team"], "storage");
        assert!(rendered.get("timeouts").is_none());
    }

    #[test]
    fn test_private_connection_requires_peering() {
        let err = google_datastream_private_connection()
            .builder()
            .arg("display_name", "conn")
            .arg("location", "us-central1")
            .arg("private_connection_id", "conn-1")
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            ShapeError::MissingRequired {
                descriptor: "GoogleDatastreamPrivateConnection".to_string(),
                property: "vpc_peering_config".to_string(),
            }
        );
    }

    #[test]
    fn test_feature_membership_deep_shorthand() {
        let membership = google_gke_hub_feature_membership()
            .builder()
            .arg("feature", "configmanagement")
            .arg("location", "global")
            .arg("membership", "cluster-1")
            .arg(
                "configmanagement",
                RawFieldMap::new().with("version", "1.12.0").with(
                    "config_sync",
                    RawFieldMap::new().with(
                        "git",
                        RawFieldMap::new()
                            .with("sync_repo", "https://github.com/org/config")
                            .with("policy_dir", "clusters"),
                    ),
                ),
            )
            .build()
            .unwrap();

        let git = membership
            .get_descriptor("configmanagement")
            .and_then(|c| c.get_descriptor("config_sync"))
            .and_then(|s| s.get_descriptor("git"))
            .unwrap();
        assert_eq!(git.get_str("policy_dir"), Some("clusters"));
        assert_eq!(
            git.type_name(),
            "GoogleGkeHubFeatureMembershipConfigmanagementConfigSyncGit"
        );
    }
}
