//! Option bag handed to the external obfuscator

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// A single option value. Serializes to the plain JSON shape the obfuscator
/// library expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Integer(value) => Some(*value as f64),
            OptionValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{}", value),
            OptionValue::Integer(value) => write!(f, "{}", value),
            OptionValue::Number(value) => write!(f, "{}", value),
            OptionValue::Text(value) => write!(f, "{:?}", value),
            OptionValue::List(values) => write!(f, "{:?}", values),
        }
    }
}

/// Flat mapping from obfuscator option name to value. Keys are kept sorted so
/// two configs built from the same inputs serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObfuscationConfig {
    options: BTreeMap<String, OptionValue>,
}

impl ObfuscationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        self.options.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.options.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_f64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(OptionValue::as_list)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OptionValue> {
        self.options.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl<'a> IntoIterator for &'a ObfuscationConfig {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = btree_map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_flat_object() {
        let mut config = ObfuscationConfig::new();
        config.insert("compact", OptionValue::Bool(true));
        config.insert("debugProtectionInterval", OptionValue::Integer(500));
        config.insert("stringArrayThreshold", OptionValue::Number(0.3));
        config.insert("target", OptionValue::Text("browser".to_string()));
        config.insert(
            "stringArrayEncoding",
            OptionValue::List(vec!["rc4".to_string(), "base64".to_string()]),
        );

        let json = config.to_json();
        assert_eq!(
            json,
            serde_json::json!({
                "compact": true,
                "debugProtectionInterval": 500,
                "stringArrayEncoding": ["rc4", "base64"],
                "stringArrayThreshold": 0.3,
                "target": "browser"
            })
        );
    }

    #[test]
    fn test_typed_accessors() {
        let mut config = ObfuscationConfig::new();
        config.insert("debugProtectionInterval", OptionValue::Integer(200));
        config.insert("stringArrayThreshold", OptionValue::Number(0.1));

        assert_eq!(config.get_f64("debugProtectionInterval"), Some(200.0));
        assert_eq!(config.get_f64("stringArrayThreshold"), Some(0.1));
        assert_eq!(config.get_bool("stringArrayThreshold"), None);
        assert_eq!(config.get_str("missing"), None);
    }
}
