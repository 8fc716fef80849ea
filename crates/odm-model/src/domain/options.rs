use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ModelError, ModelResult};

/// Scalar value of a single processing option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Coerce a raw command-line value.
    ///
    /// `true`/`false` (any case) become booleans, then integers and floats are tried,
    /// anything else is kept verbatim as text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return OptionValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return OptionValue::Float(f);
        }
        OptionValue::Text(raw.to_string())
    }

    fn to_json(&self) -> Value {
        match self {
            OptionValue::Bool(b) => json!(b),
            OptionValue::Int(i) => json!(i),
            OptionValue::Float(f) => json!(f),
            OptionValue::Text(s) => json!(s),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Processing options passed to the remote node with a task.
///
/// Key order carries no meaning; a `BTreeMap` keeps serialization stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingOptions(BTreeMap<String, OptionValue>);

impl ProcessingOptions {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    /// New mapping with every entry of `self`, overridden by every entry of `other`.
    pub fn merged(&self, other: &ProcessingOptions) -> ProcessingOptions {
        let mut out = self.0.clone();
        out.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        ProcessingOptions(out)
    }

    /// Parse repeated `key=value` items, later items winning on duplicate keys.
    pub fn parse_overrides<I, S>(items: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = ProcessingOptions::new();
        for item in items {
            let item = item.as_ref();
            let (key, value) = item
                .split_once('=')
                .ok_or_else(|| ModelError::InvalidOption(item.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ModelError::InvalidOption(item.to_string()));
            }
            out.insert(key, OptionValue::infer(value));
        }
        Ok(out)
    }

    /// NodeODM wire form: `[{"name": "dsm", "value": true}, ...]`.
    pub fn to_node_json(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|(name, value)| json!({ "name": name, "value": value.to_json() }))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for ProcessingOptions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        ProcessingOptions(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
