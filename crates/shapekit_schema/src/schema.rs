//! Field-schema tables that parameterize descriptors.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::descriptor::{Descriptor, DescriptorBuilder};
use crate::error::{ShapeError, ShapeResult};
use crate::value::Value;

/// Expected shape of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Any non-null value, stored without conversion.
    Any,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
    List(Box<FieldType>),
    /// String-keyed mapping (tags, labels).
    Map(Box<FieldType>),
    /// A nested descriptor; accepts the descriptor itself or a raw mapping.
    Nested(Arc<Schema>),
    /// The inner type or a resolvable token.
    Resolvable(Box<FieldType>),
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    pub fn map(inner: FieldType) -> Self {
        FieldType::Map(Box::new(inner))
    }

    pub fn nested(schema: Arc<Schema>) -> Self {
        FieldType::Nested(schema)
    }

    pub fn resolvable(inner: FieldType) -> Self {
        FieldType::Resolvable(Box::new(inner))
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum(values.into_iter().map(Into::into).collect())
    }

    /// The nested schema, looking through `Resolvable` wrappers.
    pub fn nested_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            FieldType::Nested(schema) => Some(schema),
            FieldType::Resolvable(inner) => inner.nested_schema(),
            _ => None,
        }
    }

    /// Every schema embedded anywhere in this type.
    pub fn embedded_schemas(&self) -> Vec<&Arc<Schema>> {
        match self {
            FieldType::Nested(schema) => vec![schema],
            FieldType::List(inner) | FieldType::Map(inner) | FieldType::Resolvable(inner) => {
                inner.embedded_schemas()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Any => write!(f, "any value"),
            FieldType::Enum(values) => write!(f, "one of [{}]", values.join(", ")),
            FieldType::List(inner) => write!(f, "list of {}", inner),
            FieldType::Map(inner) => write!(f, "map of {}", inner),
            FieldType::Nested(schema) => write!(f, "{} or mapping", schema.name()),
            FieldType::Resolvable(inner) => write!(f, "{} or resolvable token", inner),
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    /// CloudFormation property name when it is not the PascalCase of `name`.
    pub wire_name: Option<String>,
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            wire_name: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A static field table describing one resource or nested property type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    resource_type: Option<String>,
    description: Option<String>,
    fields: Vec<FieldSchema>,
}

fn field_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("field name pattern is valid"))
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: None,
            description: None,
            fields: Vec::new(),
        }
    }

    /// A top-level resource schema, e.g. `AWS::MSK::Cluster` or `google_compute_disk`.
    pub fn resource(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let mut schema = Self::new(name);
        schema.resource_type = Some(resource_type.into());
        schema
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn is_resource(&self) -> bool {
        self.resource_type.is_some()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Schemas of directly nested fields, in field order.
    pub fn nested_schemas(&self) -> Vec<&Arc<Schema>> {
        self.fields
            .iter()
            .flat_map(|f| f.field_type.embedded_schemas())
            .collect()
    }

    /// Check the table itself: names, duplicates, enum values, nested tables.
    pub fn validate(&self) -> ShapeResult<()> {
        let invalid = |message: String| ShapeError::InvalidSchema {
            schema: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("schema name cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !field_name_pattern().is_match(&field.name) {
                return Err(invalid(format!(
                    "field name '{}' is not snake_case",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
            check_field_type(&field.field_type).map_err(|message| {
                invalid(format!("field '{}': {}", field.name, message))
            })?;
        }

        for nested in self.nested_schemas() {
            nested.validate()?;
        }

        Ok(())
    }

    /// Share the schema so descriptors and parent schemas can hold it.
    pub fn into_shared(self) -> Arc<Schema> {
        Arc::new(self)
    }

    /// Construct a descriptor of this schema.
    pub fn construct<I, K, V>(self: &Arc<Self>, args: I) -> ShapeResult<Descriptor>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Descriptor::new(self, args)
    }

    pub fn builder(self: &Arc<Self>) -> DescriptorBuilder {
        Descriptor::builder(self)
    }
}

fn check_field_type(field_type: &FieldType) -> Result<(), String> {
    match field_type {
        FieldType::Enum(values) if values.is_empty() => Err("enum has no values".to_string()),
        FieldType::List(inner) | FieldType::Map(inner) => check_field_type(inner),
        FieldType::Resolvable(inner) => match inner.as_ref() {
            FieldType::Resolvable(_) => Err("nested resolvable wrapper".to_string()),
            other => check_field_type(other),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryption_in_transit() -> Schema {
        Schema::new("EncryptionInTransitProperty")
            .field(FieldSchema::new("client_broker", FieldType::String))
            .field(FieldSchema::new(
                "in_cluster",
                FieldType::resolvable(FieldType::Boolean),
            ))
    }

    #[test]
    fn test_schema_builder() {
        let schema = Schema::resource("CfnConfiguration", "AWS::MSK::Configuration")
            .field(FieldSchema::new("name", FieldType::String).required())
            .field(FieldSchema::new("server_properties", FieldType::String).required())
            .field(FieldSchema::new("description", FieldType::String));

        assert!(schema.is_resource());
        assert_eq!(schema.resource_type(), Some("AWS::MSK::Configuration"));
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.required_fields().count(), 2);
        assert!(schema.get_field("description").is_some());
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let schema = encryption_in_transit().field(FieldSchema::new("client_broker", FieldType::String));
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate field 'client_broker'"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let schema = Schema::new("Bad").field(FieldSchema::new("ClientBroker", FieldType::String));
        assert!(schema.validate().is_err());

        let schema = Schema::new("Bad").field(FieldSchema::new("level", FieldType::Enum(vec![])));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_checks_nested() {
        let broken = Schema::new("Inner")
            .field(FieldSchema::new("a", FieldType::String))
            .field(FieldSchema::new("a", FieldType::String))
            .into_shared();
        let outer = Schema::new("Outer").field(FieldSchema::new("inner", FieldType::nested(broken)));

        match outer.validate() {
            Err(ShapeError::InvalidSchema { schema, .. }) => assert_eq!(schema, "Inner"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_field_type_display() {
        let nested = encryption_in_transit().into_shared();
        assert_eq!(
            FieldType::resolvable(FieldType::Boolean).to_string(),
            "boolean or resolvable token"
        );
        assert_eq!(
            FieldType::list(FieldType::String).to_string(),
            "list of string"
        );
        assert_eq!(
            FieldType::nested(nested).to_string(),
            "EncryptionInTransitProperty or mapping"
        );
        assert_eq!(
            FieldType::one_of(["TLS", "PLAINTEXT"]).to_string(),
            "one of [TLS, PLAINTEXT]"
        );
    }

    #[test]
    fn test_nested_schema_lookup() {
        let nested = encryption_in_transit().into_shared();
        let field_type = FieldType::resolvable(FieldType::nested(nested));
        assert_eq!(
            field_type.nested_schema().map(|s| s.name()),
            Some("EncryptionInTransitProperty")
        );
        assert!(FieldType::String.nested_schema().is_none());
    }
}
