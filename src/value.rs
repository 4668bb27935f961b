//! The typed result of normalization.
//!
//! [`Value`] is what every pipeline stage produces and what
//! [`normalize_config`](crate::normalize_config) walks. It converts losslessly
//! from `serde_json::Value` (and `toml::Value` with the `toml` feature) so
//! deserialized config trees can be fed straight in.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// A normalized configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

/// Missing keys and non-map values index to `Null`, like `serde_json::Value`.
impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        self.as_list().and_then(|l| l.get(idx)).unwrap_or(&NULL)
    }
}

/// The string form of a value: strings verbatim, scalars in their literal
/// spelling, containers as compact JSON. Enum checks and `env_str` use this.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0` on whole floats.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Map(_) => {
                let json = serde_json::Value::from(self.clone());
                write!(f, "{json}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and all non-integers land here.
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            // Non-finite floats have no JSON spelling.
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => {
                serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(feature = "toml")]
impl From<toml::Value> for Value {
    fn from(t: toml::Value) -> Self {
        match t {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => Value::from(table),
        }
    }
}

#[cfg(feature = "toml")]
impl From<toml::Table> for Value {
    fn from(table: toml::Table) -> Self {
        Value::Map(table.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Float(50.0).to_string(), "50.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::from("plain").to_string(), "plain");
    }

    #[test]
    fn display_containers_as_json() {
        let list = Value::List(vec![Value::from("a"), Value::Int(3)]);
        assert_eq!(list.to_string(), r#"["a",3]"#);
    }

    #[test]
    fn from_json_keeps_integer_and_float_apart() {
        let v = Value::from(json!({"a": 1, "b": 1.5, "c": [true, null]}));
        assert_eq!(v["a"], Value::Int(1));
        assert_eq!(v["b"], Value::Float(1.5));
        assert_eq!(v["c"][0], Value::Bool(true));
        assert!(v["c"][1].is_null());
    }

    #[test]
    fn from_json_huge_unsigned_becomes_float() {
        let v = Value::from(json!(u64::MAX));
        assert!(matches!(v, Value::Float(_)));
    }

    #[test]
    fn into_json_drops_non_finite_floats() {
        let j = serde_json::Value::from(Value::Float(f64::NAN));
        assert!(j.is_null());
    }

    #[test]
    fn accessors_match_only_their_variant() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_i64(), Some(7));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Int(7).as_bool(), None);
        assert_eq!(Value::Float(7.0).as_i64(), None);
        assert_eq!(Value::Int(7).as_f64(), None);
        assert_eq!(Value::Null.as_str(), None);
        let list = Value::List(vec![Value::Int(1)]);
        assert_eq!(list.as_list(), Some(&[Value::Int(1)][..]));
        assert!(list.as_map().is_none());
    }

    #[test]
    fn index_missing_is_null() {
        let v = Value::from(json!({"a": 1}));
        assert!(v["missing"].is_null());
        assert!(Value::Int(1)["a"].is_null());
        assert!(Value::List(vec![])[3].is_null());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn deserializes_untagged() {
        let v: Value = serde_json::from_str(r#"{"n": 3, "f": 0.25, "s": "x"}"#).unwrap();
        assert_eq!(v["n"], Value::Int(3));
        assert_eq!(v["f"], Value::Float(0.25));
        assert_eq!(v["s"], Value::from("x"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn from_toml_table() {
        let table: toml::Table = "port = 8080\n[db]\nurl = \"pg://\"\n".parse().unwrap();
        let v = Value::from(table);
        assert_eq!(v["port"], Value::Int(8080));
        assert_eq!(v["db"]["url"], Value::from("pg://"));
    }
}
