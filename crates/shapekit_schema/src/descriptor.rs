//! Immutable resource property descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ShapeError, ShapeResult};
use crate::normalize;
use crate::schema::{FieldSchema, Schema};
use crate::value::{RawFieldMap, Token, Value};

/// A validated, immutable bag of field values for one schema.
///
/// Only explicitly supplied fields are stored, so "not set" stays
/// distinguishable from any default. Two descriptors are equal when they
/// share a schema name and hold equal field maps.
#[derive(Clone)]
pub struct Descriptor {
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl Descriptor {
    /// Construct from named arguments.
    ///
    /// Null arguments count as omitted. When a name is given twice the
    /// later value wins.
    pub fn new<I, K, V>(schema: &Arc<Schema>, args: I) -> ShapeResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        normalize::construct(
            schema,
            args.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        )
    }

    pub fn builder(schema: &Arc<Schema>) -> DescriptorBuilder {
        DescriptorBuilder {
            schema: Arc::clone(schema),
            args: Vec::new(),
        }
    }

    pub(crate) fn from_parts(schema: Arc<Schema>, values: BTreeMap<String, Value>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// The stored value, or `None` when the field was not supplied.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Like [`Descriptor::get`], but rejects names the schema does not define.
    pub fn try_get(&self, name: &str) -> ShapeResult<Option<&Value>> {
        if self.schema.get_field(name).is_none() {
            return Err(ShapeError::UnknownField {
                descriptor: self.type_name().to_string(),
                field: name.to_string(),
            });
        }
        Ok(self.values.get(name))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn get_descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.get(name).and_then(Value::as_descriptor)
    }

    pub fn get_token(&self, name: &str) -> Option<&Token> {
        self.get(name).and_then(Value::as_token)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of fields that were supplied.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Supplied fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldSchema, &Value)> {
        self.schema
            .fields()
            .iter()
            .filter_map(move |field| self.values.get(&field.name).map(|v| (field, v)))
    }

    /// A copy with one field replaced, validated like a fresh construction.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> ShapeResult<Self> {
        let mut args: Vec<(String, Value)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        args.push((name.into(), value.into()));
        normalize::construct(&self.schema, args)
    }

    /// A copy with one field cleared. Clearing a required field fails.
    pub fn without(&self, name: &str) -> ShapeResult<Self> {
        self.with(name, Value::Null)
    }

    /// The shorthand form: nested descriptors turned back into raw mappings.
    pub fn to_field_map(&self) -> RawFieldMap {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), raw_value(v)))
            .collect()
    }
}

fn raw_value(value: &Value) -> Value {
    match value {
        Value::Descriptor(d) => Value::Map(d.to_field_map()),
        Value::List(items) => Value::List(items.iter().map(raw_value).collect()),
        Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), raw_value(v))).collect()),
        other => other.clone(),
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.values == other.values
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .type_name()
            .rsplit('.')
            .next()
            .unwrap_or(self.type_name());
        write!(f, "{}(", name)?;
        for (i, (field, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", field.name, value)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("schema", &self.type_name())
            .field("values", &self.values)
            .finish()
    }
}

/// Accumulates named arguments for a descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    schema: Arc<Schema>,
    args: Vec<(String, Value)>,
}

impl DescriptorBuilder {
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// Add an argument only when a value is present.
    pub fn arg_opt<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.arg(name, value),
            None => self,
        }
    }

    pub fn build(self) -> ShapeResult<Descriptor> {
        normalize::construct(&self.schema, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn scram_secret() -> Arc<Schema> {
        Schema::resource("CfnBatchScramSecret", "AWS::MSK::BatchScramSecret")
            .field(FieldSchema::new("cluster_arn", FieldType::String).required())
            .field(FieldSchema::new(
                "secret_arn_list",
                FieldType::list(FieldType::String),
            ))
            .into_shared()
    }

    #[test]
    fn test_accessors() {
        let secret = Descriptor::builder(&scram_secret())
            .arg("cluster_arn", "arn:aws:kafka:us-east-1:123:cluster/c")
            .build()
            .unwrap();

        assert_eq!(secret.get_str("cluster_arn"), Some("arn:aws:kafka:us-east-1:123:cluster/c"));
        assert!(secret.get("secret_arn_list").is_none());
        assert!(secret.try_get("secret_arn_list").unwrap().is_none());
        assert!(matches!(
            secret.try_get("bogus"),
            Err(ShapeError::UnknownField { .. })
        ));
        assert_eq!(secret.len(), 1);
    }

    #[test]
    fn test_display_in_schema_order() {
        let secret = Descriptor::new(
            &scram_secret(),
            [
                ("secret_arn_list", Value::from(vec!["s1"])),
                ("cluster_arn", Value::from("c")),
            ],
        )
        .unwrap();

        assert_eq!(
            secret.to_string(),
            "CfnBatchScramSecret(cluster_arn='c', secret_arn_list=['s1'])"
        );
    }

    #[test]
    fn test_with_and_without() {
        let schema = scram_secret();
        let secret = Descriptor::builder(&schema).arg("cluster_arn", "c").build().unwrap();

        let updated = secret.with("secret_arn_list", vec!["s1", "s2"]).unwrap();
        assert_ne!(secret, updated);
        assert_eq!(updated.get_list("secret_arn_list").unwrap().len(), 2);

        let cleared = updated.without("secret_arn_list").unwrap();
        assert_eq!(cleared, secret);

        assert!(matches!(
            secret.without("cluster_arn"),
            Err(ShapeError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_arg_opt_skips_absent() {
        let secret = Descriptor::builder(&scram_secret())
            .arg("cluster_arn", "c")
            .arg_opt("secret_arn_list", None::<Vec<String>>)
            .build()
            .unwrap();
        assert!(!secret.is_set("secret_arn_list"));
    }
}
