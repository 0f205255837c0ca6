//! # shapekit_schema
//!
//! Schema-driven resource property descriptors.
//!
//! A [`Descriptor`] is one generic record type parameterized by a static
//! [`Schema`] table. Construction enforces required fields, checks every
//! supplied value against its field type, and coerces raw mappings given for
//! nested fields into nested descriptors.
//!
//! ## Features
//!
//! - Required-field enforcement with a two-kind error taxonomy
//! - Optional fields stored only when supplied
//! - Shorthand mappings for nested property types
//! - Structural equality and readable `Display`
//! - Rendering to CloudFormation or Terraform JSON
//!
//! ## Example
//!
//! ```rust
//! use shapekit_schema::{FieldSchema, FieldType, RawFieldMap, Schema};
//!
//! let in_transit = Schema::new("EncryptionInTransitConfig")
//!     .field(FieldSchema::new("client_broker", FieldType::one_of(["TLS", "TLS_PLAINTEXT", "PLAINTEXT"])))
//!     .into_shared();
//! let props = Schema::new("ClusterProps")
//!     .field(FieldSchema::new("cluster_name", FieldType::String).required())
//!     .field(FieldSchema::new("encryption_in_transit", FieldType::nested(in_transit)))
//!     .into_shared();
//!
//! let cluster = props
//!     .builder()
//!     .arg("cluster_name", "myCluster")
//!     .arg("encryption_in_transit", RawFieldMap::new().with("client_broker", "TLS"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     cluster.to_string(),
//!     "ClusterProps(cluster_name='myCluster', encryption_in_transit=EncryptionInTransitConfig(client_broker='TLS'))"
//! );
//! ```

pub mod descriptor;
pub mod error;
pub mod normalize;
pub mod render;
pub mod schema;
pub mod template;
pub mod value;

pub use descriptor::{Descriptor, DescriptorBuilder};
pub use error::{ShapeError, ShapeResult};
pub use normalize::{check_value, normalize, NestedArg};
pub use render::{pascal_case, render_properties, render_value, Dialect};
pub use schema::{FieldSchema, FieldType, Schema};
pub use template::{Template, CFN_TEMPLATE_FORMAT_VERSION};
pub use value::{RawFieldMap, Token, Value};
