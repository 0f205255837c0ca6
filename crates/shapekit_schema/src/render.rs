//! Rendering descriptors into CloudFormation or Terraform JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::descriptor::Descriptor;
use crate::schema::FieldSchema;
use crate::value::{Token, Value};

/// Target wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    CloudFormation,
    Terraform,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::CloudFormation => "cloudformation",
            Dialect::Terraform => "terraform",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cloudformation" | "cfn" => Some(Dialect::CloudFormation),
            "terraform" | "tf" => Some(Dialect::Terraform),
            _ => None,
        }
    }

    /// Property name of `field` in this dialect.
    pub fn property_name(&self, field: &FieldSchema) -> String {
        match self {
            Dialect::CloudFormation => field
                .wire_name
                .clone()
                .unwrap_or_else(|| pascal_case(&field.name)),
            Dialect::Terraform => field.name.clone(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `broker_node_group_info` -> `BrokerNodeGroupInfo`.
pub fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Render the supplied properties of a descriptor as a JSON object.
///
/// Fields that were never set are left out entirely.
pub fn render_properties(descriptor: &Descriptor, dialect: Dialect) -> serde_json::Value {
    let mut object = Map::new();
    for (field, value) in descriptor.iter() {
        object.insert(dialect.property_name(field), render_value(value, dialect));
    }
    serde_json::Value::Object(object)
}

/// Render one value. Map keys are user data and keep their spelling.
pub fn render_value(value: &Value, dialect: Dialect) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(|v| render_value(v, dialect)).collect())
        }
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, dialect)))
                .collect(),
        ),
        Value::Token(token) => render_token(token, dialect),
        Value::Descriptor(d) => render_properties(d, dialect),
    }
}

fn render_token(token: &Token, dialect: Dialect) -> serde_json::Value {
    match (dialect, token) {
        (Dialect::CloudFormation, Token::Ref(id)) => json!({ "Ref": id }),
        (Dialect::CloudFormation, Token::GetAtt { resource, attribute }) => {
            json!({ "Fn::GetAtt": [resource, attribute] })
        }
        (Dialect::CloudFormation, Token::Expression(text)) => json!({ "Fn::Sub": text }),
        (Dialect::Terraform, token) => serde_json::Value::String(token.to_string()),
    }
}
