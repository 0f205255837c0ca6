//! Built-in schema tables for Amazon MSK.
//!
//! `Cfn*` tables mirror the `AWS::MSK::*` CloudFormation resources property
//! for property. `ClusterProps` and its companions describe the higher-level
//! cluster construct, which has no resource type of its own.

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

fn property(name: &str, schema: Arc<Schema>) -> FieldSchema {
    FieldSchema::new(name, FieldType::resolvable(FieldType::nested(schema)))
}

fn tags() -> FieldSchema {
    FieldSchema::new("tags", FieldType::map(FieldType::String))
}

/// Every top-level MSK table. Nested property types are reachable from these.
pub fn schemas() -> Vec<Arc<Schema>> {
    vec![
        cfn_cluster(),
        cfn_configuration(),
        cfn_batch_scram_secret(),
        cfn_serverless_cluster(),
        cluster_props(),
    ]
}

// AWS::MSK::Cluster

fn enabled_only(name: &str) -> Arc<Schema> {
    Schema::new(name)
        .field(flag("enabled").required())
        .into_shared()
}

fn cloud_watch_logs() -> Arc<Schema> {
    Schema::new("CfnCluster.CloudWatchLogsProperty")
        .field(flag("enabled").required())
        .field(string("log_group"))
        .into_shared()
}

fn firehose() -> Arc<Schema> {
    Schema::new("CfnCluster.FirehoseProperty")
        .field(flag("enabled").required())
        .field(string("delivery_stream"))
        .into_shared()
}

fn s3() -> Arc<Schema> {
    Schema::new("CfnCluster.S3Property")
        .field(flag("enabled").required())
        .field(string("bucket"))
        .field(string("prefix"))
        .into_shared()
}

fn broker_logs() -> Arc<Schema> {
    Schema::new("CfnCluster.BrokerLogsProperty")
        .field(property("cloud_watch_logs", cloud_watch_logs()))
        .field(property("firehose", firehose()))
        .field(property("s3", s3()))
        .into_shared()
}

fn logging_info() -> Arc<Schema> {
    Schema::new("CfnCluster.LoggingInfoProperty")
        .field(property("broker_logs", broker_logs()).required())
        .into_shared()
}

fn public_access() -> Arc<Schema> {
    Schema::new("CfnCluster.PublicAccessProperty")
        .field(string("type").with_description("DISABLED or SERVICE_PROVIDED_EIPS"))
        .into_shared()
}

fn connectivity_info() -> Arc<Schema> {
    Schema::new("CfnCluster.ConnectivityInfoProperty")
        .field(property("public_access", public_access()))
        .into_shared()
}

fn provisioned_throughput() -> Arc<Schema> {
    Schema::new("CfnCluster.ProvisionedThroughputProperty")
        .field(flag("enabled"))
        .field(number("volume_throughput"))
        .into_shared()
}

fn ebs_storage_info_property() -> Arc<Schema> {
    Schema::new("CfnCluster.EBSStorageInfoProperty")
        .field(property("provisioned_throughput", provisioned_throughput()))
        .field(number("volume_size"))
        .into_shared()
}

fn storage_info() -> Arc<Schema> {
    Schema::new("CfnCluster.StorageInfoProperty")
        .field(property("ebs_storage_info", ebs_storage_info_property()).with_wire_name("EBSStorageInfo"))
        .into_shared()
}

fn broker_node_group_info() -> Arc<Schema> {
    Schema::new("CfnCluster.BrokerNodeGroupInfoProperty")
        .field(strings("client_subnets").required())
        .field(string("instance_type").required())
        .field(string("broker_az_distribution").with_wire_name("BrokerAZDistribution"))
        .field(property("connectivity_info", connectivity_info()))
        .field(strings("security_groups"))
        .field(property("storage_info", storage_info()))
        .into_shared()
}

fn cluster_sasl() -> Arc<Schema> {
    Schema::new("CfnCluster.SaslProperty")
        .field(property("iam", enabled_only("CfnCluster.IamProperty")))
        .field(property("scram", enabled_only("CfnCluster.ScramProperty")))
        .into_shared()
}

fn cluster_tls() -> Arc<Schema> {
    Schema::new("CfnCluster.TlsProperty")
        .field(strings("certificate_authority_arn_list"))
        .field(flag("enabled"))
        .into_shared()
}

fn cluster_client_authentication() -> Arc<Schema> {
    Schema::new("CfnCluster.ClientAuthenticationProperty")
        .field(property("sasl", cluster_sasl()))
        .field(property("tls", cluster_tls()))
        .field(property(
            "unauthenticated",
            enabled_only("CfnCluster.UnauthenticatedProperty"),
        ))
        .into_shared()
}

fn configuration_info() -> Arc<Schema> {
    Schema::new("CfnCluster.ConfigurationInfoProperty")
        .field(string("arn").required())
        .field(number("revision").required())
        .into_shared()
}

fn encryption_at_rest() -> Arc<Schema> {
    Schema::new("CfnCluster.EncryptionAtRestProperty")
        .field(
            string("data_volume_kms_key_id")
                .required()
                .with_wire_name("DataVolumeKMSKeyId"),
        )
        .into_shared()
}

fn encryption_in_transit() -> Arc<Schema> {
    Schema::new("CfnCluster.EncryptionInTransitProperty")
        .field(string("client_broker"))
        .field(flag("in_cluster"))
        .into_shared()
}

fn encryption_info() -> Arc<Schema> {
    Schema::new("CfnCluster.EncryptionInfoProperty")
        .field(property("encryption_at_rest", encryption_at_rest()))
        .field(property("encryption_in_transit", encryption_in_transit()))
        .into_shared()
}

fn exporter(name: &str) -> Arc<Schema> {
    Schema::new(name)
        .field(flag("enabled_in_broker").required())
        .into_shared()
}

fn prometheus() -> Arc<Schema> {
    Schema::new("CfnCluster.PrometheusProperty")
        .field(property("jmx_exporter", exporter("CfnCluster.JmxExporterProperty")))
        .field(property("node_exporter", exporter("CfnCluster.NodeExporterProperty")))
        .into_shared()
}

fn open_monitoring() -> Arc<Schema> {
    Schema::new("CfnCluster.OpenMonitoringProperty")
        .field(property("prometheus", prometheus()).required())
        .into_shared()
}

pub fn cfn_cluster() -> Arc<Schema> {
    Schema::resource("CfnCluster", "AWS::MSK::Cluster")
        .with_description("A provisioned MSK cluster")
        .field(property("broker_node_group_info", broker_node_group_info()).required())
        .field(string("cluster_name").required())
        .field(string("kafka_version").required())
        .field(number("number_of_broker_nodes").required())
        .field(property("client_authentication", cluster_client_authentication()))
        .field(property("configuration_info", configuration_info()))
        .field(string("current_version"))
        .field(property("encryption_info", encryption_info()))
        .field(string("enhanced_monitoring"))
        .field(property("logging_info", logging_info()))
        .field(property("open_monitoring", open_monitoring()))
        .field(string("storage_mode"))
        .field(tags())
        .into_shared()
}

// AWS::MSK::Configuration, AWS::MSK::BatchScramSecret

pub fn cfn_configuration() -> Arc<Schema> {
    Schema::resource("CfnConfiguration", "AWS::MSK::Configuration")
        .with_description("A reusable Kafka broker configuration")
        .field(string("name").required())
        .field(string("server_properties").required())
        .field(string("description"))
        .field(strings("kafka_versions_list"))
        .into_shared()
}

pub fn cfn_batch_scram_secret() -> Arc<Schema> {
    Schema::resource("CfnBatchScramSecret", "AWS::MSK::BatchScramSecret")
        .with_description("SCRAM secrets associated with a cluster")
        .field(string("cluster_arn").required())
        .field(strings("secret_arn_list"))
        .into_shared()
}

// AWS::MSK::ServerlessCluster

fn vpc_config() -> Arc<Schema> {
    Schema::new("CfnServerlessCluster.VpcConfigProperty")
        .field(strings("subnet_ids").required())
        .field(strings("security_groups"))
        .into_shared()
}

fn serverless_client_authentication() -> Arc<Schema> {
    let sasl = Schema::new("CfnServerlessCluster.SaslProperty")
        .field(property("iam", enabled_only("CfnServerlessCluster.IamProperty")).required())
        .into_shared();
    Schema::new("CfnServerlessCluster.ClientAuthenticationProperty")
        .field(property("sasl", sasl).required())
        .into_shared()
}

pub fn cfn_serverless_cluster() -> Arc<Schema> {
    Schema::resource("CfnServerlessCluster", "AWS::MSK::ServerlessCluster")
        .with_description("A serverless MSK cluster")
        .field(property("client_authentication", serverless_client_authentication()).required())
        .field(string("cluster_name").required())
        .field(
            FieldSchema::new(
                "vpc_configs",
                FieldType::resolvable(FieldType::list(FieldType::resolvable(
                    FieldType::nested(vpc_config()),
                ))),
            )
            .required(),
        )
        .field(tags())
        .into_shared()
}

// Higher-level cluster construct

pub fn encryption_in_transit_config() -> Arc<Schema> {
    Schema::new("EncryptionInTransitConfig")
        .field(FieldSchema::new(
            "client_broker",
            FieldType::one_of(["TLS", "TLS_PLAINTEXT", "PLAINTEXT"]),
        ))
        .field(FieldSchema::new("enable_in_cluster", FieldType::Boolean))
        .into_shared()
}

fn s3_logging_configuration() -> Arc<Schema> {
    Schema::new("S3LoggingConfiguration")
        .field(string("bucket").required())
        .field(string("prefix"))
        .into_shared()
}

fn broker_logging() -> Arc<Schema> {
    Schema::new("BrokerLogging")
        .field(string("cloudwatch_log_group"))
        .field(string("firehose_delivery_stream_name"))
        .field(FieldSchema::new("s3", FieldType::nested(s3_logging_configuration())))
        .into_shared()
}

fn ebs_storage_info() -> Arc<Schema> {
    Schema::new("EbsStorageInfo")
        .field(string("encryption_key").with_description("KMS key ARN or id"))
        .field(number("volume_size"))
        .into_shared()
}

fn cluster_configuration_info() -> Arc<Schema> {
    Schema::new("ClusterConfigurationInfo")
        .field(string("arn").required())
        .field(number("revision").required())
        .into_shared()
}

fn monitoring_configuration() -> Arc<Schema> {
    Schema::new("MonitoringConfiguration")
        .field(FieldSchema::new(
            "cluster_monitoring_level",
            FieldType::one_of([
                "DEFAULT",
                "PER_BROKER",
                "PER_TOPIC_PER_BROKER",
                "PER_TOPIC_PER_PARTITION",
            ]),
        ))
        .field(FieldSchema::new("enable_prometheus_jmx_exporter", FieldType::Boolean))
        .field(FieldSchema::new("enable_prometheus_node_exporter", FieldType::Boolean))
        .into_shared()
}

fn client_authentication() -> Arc<Schema> {
    let sasl = Schema::new("SaslAuthProps")
        .field(FieldSchema::new("iam", FieldType::Boolean))
        .field(string("key"))
        .field(FieldSchema::new("scram", FieldType::Boolean))
        .into_shared();
    let tls = Schema::new("TlsAuthProps")
        .field(strings("certificate_authorities"))
        .into_shared();
    Schema::new("ClientAuthentication")
        .field(FieldSchema::new("sasl", FieldType::nested(sasl)))
        .field(FieldSchema::new("tls", FieldType::nested(tls)))
        .into_shared()
}

pub fn cluster_props() -> Arc<Schema> {
    Schema::new("ClusterProps")
        .with_description("Properties of the higher-level MSK cluster construct")
        .field(string("cluster_name").required())
        .field(string("kafka_version").required())
        .field(string("vpc").required().with_description("VPC id"))
        .field(FieldSchema::new("client_authentication", FieldType::nested(client_authentication())))
        .field(FieldSchema::new(
            "configuration_info",
            FieldType::nested(cluster_configuration_info()),
        ))
        .field(FieldSchema::new("ebs_storage_info", FieldType::nested(ebs_storage_info())))
        .field(FieldSchema::new(
            "encryption_in_transit",
            FieldType::nested(encryption_in_transit_config()),
        ))
        .field(string("instance_type"))
        .field(FieldSchema::new("logging", FieldType::nested(broker_logging())))
        .field(FieldSchema::new("monitoring", FieldType::nested(monitoring_configuration())))
        .field(number("number_of_broker_nodes"))
        .field(FieldSchema::new(
            "removal_policy",
            FieldType::one_of(["DESTROY", "RETAIN", "SNAPSHOT"]),
        ))
        .field(strings("security_groups"))
        .field(strings("vpc_subnets"))
        .into_shared()
}
