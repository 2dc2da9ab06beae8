use crate::utils::error::{RdpError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Leaf value of a metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Nested metadata content: scalars, string-keyed mappings and sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Mapping(BTreeMap<String, Value>),
    Sequence(Vec<Value>),
}

pub type Content = BTreeMap<String, Value>;

/// Follows a dotted path into `content`, e.g. `"creator.name"`.
pub fn lookup<'a>(content: &'a Content, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        Some((head, rest)) => content.get(head)?.lookup(rest),
        None => content.get(path),
    }
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(s.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(Scalar::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Follows a dotted path through nested mappings, e.g. `"creator.name"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |current, segment| current.as_mapping()?.get(segment))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(Scalar::Null) => "null",
            Value::Scalar(Scalar::Bool(_)) => "boolean",
            Value::Scalar(Scalar::Integer(_)) => "integer",
            Value::Scalar(Scalar::Float(_)) => "float",
            Value::Scalar(Scalar::Text(_)) => "text",
            Value::Mapping(_) => "mapping",
            Value::Sequence(_) => "sequence",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Integer(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Content> for Value {
    fn from(map: Content) -> Self {
        Value::Mapping(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Value::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Scalar(Scalar::Integer(i)),
                None => Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            serde_json::Value::String(s) => Value::text(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Mapping(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::text(s),
            toml::Value::Integer(i) => Value::Scalar(Scalar::Integer(i)),
            toml::Value::Float(f) => Value::Scalar(Scalar::Float(f)),
            toml::Value::Boolean(b) => Value::Scalar(Scalar::Bool(b)),
            toml::Value::Datetime(dt) => Value::text(dt.to_string()),
            toml::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => {
                Value::Mapping(table.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Task a service can perform for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    MetadataAccess,
    DataAccess,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::MetadataAccess, Capability::DataAccess];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::MetadataAccess => "metadata-access",
            Capability::DataAccess => "data-access",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Capability::MetadataAccess => {
                "Capacity to download metadata given an identifier and a metadata scheme"
            }
            Capability::DataAccess => "Capacity to download data given an identifier",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = RdpError;

    /// Case-insensitive; `_` and `-` are interchangeable.
    fn from_str(tag: &str) -> Result<Self> {
        let normalized = tag.to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "metadata-access" | "retrieve-metadata" => Ok(Capability::MetadataAccess),
            "data-access" | "retrieve-data" => Ok(Capability::DataAccess),
            _ => Err(RdpError::UnknownCapability {
                tag: tag.to_string(),
            }),
        }
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
