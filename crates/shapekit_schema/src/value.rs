//! Field values held by descriptors.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Number;

use crate::descriptor::Descriptor;
use crate::error::{ShapeError, ShapeResult};

/// A single field value.
///
/// `Null` stands for "not supplied" and is never stored in a descriptor.
/// After construction, every nested-descriptor position holds
/// [`Value::Descriptor`]; raw maps only survive in `Map`/`Any` fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(RawFieldMap),
    Token(Token),
    Descriptor(Descriptor),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawFieldMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&Descriptor> {
        match self {
            Value::Descriptor(d) => Some(d),
            _ => None,
        }
    }

    /// Short description used in mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => format!("boolean {}", b),
            Value::Number(n) => format!("number {}", n),
            Value::String(s) => format!("string {:?}", s),
            Value::List(items) => format!("list of {} item(s)", items.len()),
            Value::Map(map) => format!("mapping with {} key(s)", map.len()),
            Value::Token(token) => format!("token {}", token),
            Value::Descriptor(d) => d.type_name().to_string(),
        }
    }

    /// Convert a JSON document value.
    ///
    /// Interpolation strings and `Ref` / `Fn::GetAtt` objects become tokens.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => match Token::parse(&s) {
                Some(token) => Value::Token(token),
                None => Value::String(s),
            },
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(object) => {
                if let Some(token) = Token::from_intrinsic(&object) {
                    return Value::Token(token);
                }
                Value::Map(
                    object
                        .into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect(),
                )
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => write!(f, "{}", map),
            Value::Token(token) => write!(f, "{}", token),
            Value::Descriptor(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// Floats convert fallibly: NaN and infinities have no number representation.
impl TryFrom<f64> for Value {
    type Error = ShapeError;

    fn try_from(n: f64) -> ShapeResult<Self> {
        Number::from_f64(n)
            .map(Value::Number)
            .ok_or_else(|| ShapeError::InvalidNumber(n.to_string()))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<RawFieldMap> for Value {
    fn from(map: RawFieldMap) -> Self {
        Value::Map(map)
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        Value::Token(token)
    }
}

impl From<Descriptor> for Value {
    fn from(d: Descriptor) -> Self {
        Value::Descriptor(d)
    }
}

/// A plain key-value mapping, usable in place of a nested descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFieldMap(BTreeMap<String, Value>);

impl RawFieldMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawFieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for RawFieldMap {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RawFieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RawFieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// A resolvable-expression placeholder, resolved by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Reference to another resource or parameter.
    Ref(String),
    /// Attribute of another resource.
    GetAtt { resource: String, attribute: String },
    /// Free-form interpolation text such as `${var.prefix}-disk`.
    Expression(String),
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$\{([A-Za-z_][A-Za-z0-9_\-]*)(?:\.([A-Za-z0-9_.\-]+))?\}$")
            .expect("reference pattern is valid")
    })
}

impl Token {
    pub fn reference(id: impl Into<String>) -> Self {
        Token::Ref(id.into())
    }

    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Token::GetAtt {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn expression(text: impl Into<String>) -> Self {
        Token::Expression(text.into())
    }

    /// Recognize interpolation syntax in a string.
    ///
    /// Returns `None` for plain strings.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(caps) = reference_pattern().captures(s) {
            let id = caps[1].to_string();
            return Some(match caps.get(2) {
                Some(attribute) => Token::get_att(id, attribute.as_str()),
                None => Token::Ref(id),
            });
        }

        match s.find("${") {
            Some(start) if s[start..].contains('}') => Some(Token::Expression(s.to_string())),
            _ => None,
        }
    }

    fn from_intrinsic(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        if object.len() != 1 {
            return None;
        }

        if let Some(serde_json::Value::String(id)) = object.get("Ref") {
            return Some(Token::Ref(id.clone()));
        }

        match object.get("Fn::GetAtt")? {
            serde_json::Value::Array(parts) if parts.len() == 2 => {
                let resource = parts[0].as_str()?;
                let attribute = parts[1].as_str()?;
                Some(Token::get_att(resource, attribute))
            }
            serde_json::Value::String(path) => {
                let (resource, attribute) = path.split_once('.')?;
                Some(Token::get_att(resource, attribute))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ref(id) => write!(f, "${{{}}}", id),
            Token::GetAtt {
                resource,
                attribute,
            } => write!(f, "${{{}.{}}}", resource, attribute),
            Token::Expression(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_finite_floats_are_rejected() {
        assert_eq!(Value::try_from(2.5).unwrap().as_f64(), Some(2.5));
        assert_eq!(
            Value::try_from(f64::NAN),
            Err(ShapeError::InvalidNumber("NaN".to_string()))
        );
        assert_eq!(
            Value::try_from(f64::INFINITY),
            Err(ShapeError::InvalidNumber("inf".to_string()))
        );
    }

    #[test]
    fn test_token_parse() {
        assert_eq!(Token::parse("${MyKey}"), Some(Token::reference("MyKey")));
        assert_eq!(
            Token::parse("${aws_kms_key.main.arn}"),
            Some(Token::get_att("aws_kms_key", "main.arn"))
        );
        assert_eq!(
            Token::parse("${var.prefix}-disk"),
            Some(Token::expression("${var.prefix}-disk"))
        );
        assert_eq!(Token::parse("plain"), None);
        assert_eq!(Token::parse("cost is $5"), None);
    }

    #[test]
    fn test_token_display_round_trips() {
        for text in ["${MyKey}", "${Cluster.Arn}", "prefix-${var.env}"] {
            let token = Token::parse(text).unwrap();
            assert_eq!(token.to_string(), text);
        }
    }

    #[test]
    fn test_from_json_intrinsics() {
        assert_eq!(
            Value::from_json(json!({"Ref": "MyVpc"})),
            Value::Token(Token::reference("MyVpc"))
        );
        assert_eq!(
            Value::from_json(json!({"Fn::GetAtt": ["MyKey", "Arn"]})),
            Value::Token(Token::get_att("MyKey", "Arn"))
        );
        assert_eq!(
            Value::from_json(json!({"Fn::GetAtt": "MyKey.Arn"})),
            Value::Token(Token::get_att("MyKey", "Arn"))
        );

        // Two keys is an ordinary mapping.
        let value = Value::from_json(json!({"Ref": "a", "other": 1}));
        assert!(value.as_map().is_some());
    }

    #[test]
    fn test_from_json_nested() {
        let value = Value::from_json(json!({
            "client_subnets": ["subnet-1", "subnet-2"],
            "storage_info": {"ebs_storage_info": {"volume_size": 100}},
        }));

        let map = value.as_map().unwrap();
        assert_eq!(map.get("client_subnets").unwrap().as_list().unwrap().len(), 2);
        let storage = map.get("storage_info").unwrap().as_map().unwrap();
        let ebs = storage.get("ebs_storage_info").unwrap().as_map().unwrap();
        assert_eq!(ebs.get("volume_size").unwrap().as_i64(), Some(100));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_raw_map_display() {
        let map = RawFieldMap::new().with("in_cluster", true).with("client_broker", "TLS");
        assert_eq!(map.to_string(), "{'client_broker': 'TLS', 'in_cluster': true}");
    }
}
