//! Cache Value Module
//!
//! Closed set of value types the cache can hold. The enum tag is what lets
//! heterogeneous values share one table and still come back with their type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Cache Value ==
/// A value stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<CacheValue>),
    Map(BTreeMap<String, CacheValue>),
}

impl CacheValue {
    /// Returns the string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CacheValue::Null => "null",
            CacheValue::Bool(_) => "bool",
            CacheValue::Int(_) => "int",
            CacheValue::UInt(_) => "uint",
            CacheValue::Float(_) => "float",
            CacheValue::Str(_) => "string",
            CacheValue::Bytes(_) => "bytes",
            CacheValue::List(_) => "list",
            CacheValue::Map(_) => "map",
        }
    }
}

// == Conversions ==
impl From<bool> for CacheValue {
    fn from(v: bool) -> Self {
        CacheValue::Bool(v)
    }
}

impl From<i32> for CacheValue {
    fn from(v: i32) -> Self {
        CacheValue::Int(i64::from(v))
    }
}

impl From<i64> for CacheValue {
    fn from(v: i64) -> Self {
        CacheValue::Int(v)
    }
}

impl From<u64> for CacheValue {
    fn from(v: u64) -> Self {
        CacheValue::UInt(v)
    }
}

impl From<f64> for CacheValue {
    fn from(v: f64) -> Self {
        CacheValue::Float(v)
    }
}

impl From<&str> for CacheValue {
    fn from(v: &str) -> Self {
        CacheValue::Str(v.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(v: String) -> Self {
        CacheValue::Str(v)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(v: Vec<u8>) -> Self {
        CacheValue::Bytes(v)
    }
}

impl TryFrom<CacheValue> for String {
    type Error = CacheError;

    fn try_from(value: CacheValue) -> Result<Self, Self::Error> {
        match value {
            CacheValue::Str(s) => Ok(s),
            other => Err(CacheError::Decode(format!(
                "expected string, found {}",
                other.type_name()
            ))),
        }
    }
}

impl From<serde_json::Value> for CacheValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;

        match v {
            Value::Null => CacheValue::Null,
            Value::Bool(b) => CacheValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CacheValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    CacheValue::UInt(u)
                } else {
                    CacheValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => CacheValue::Str(s),
            Value::Array(items) => CacheValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                CacheValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<CacheValue> for serde_json::Value {
    fn from(v: CacheValue) -> Self {
        use serde_json::Value;

        match v {
            CacheValue::Null => Value::Null,
            CacheValue::Bool(b) => Value::Bool(b),
            CacheValue::Int(i) => Value::from(i),
            CacheValue::UInt(u) => Value::from(u),
            // Non-finite floats have no JSON form
            CacheValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CacheValue::Str(s) => Value::String(s),
            CacheValue::Bytes(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
            CacheValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            CacheValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
