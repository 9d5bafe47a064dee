//! Semicolon-delimited cell style strings.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// A single style value. Numbers print without a trailing `.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Int(i64),
    Num(f64),
    Text(String),
}

impl StyleValue {
    fn is_truthy(&self) -> bool {
        match self {
            StyleValue::Int(n) => *n != 0,
            StyleValue::Num(n) => *n != 0.0,
            StyleValue::Text(s) => !s.is_empty() && s != "0",
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Int(n) => write!(f, "{}", n),
            StyleValue::Num(n) => write!(f, "{}", n),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for StyleValue {
    fn from(v: i64) -> Self {
        StyleValue::Int(v)
    }
}

impl From<i32> for StyleValue {
    fn from(v: i32) -> Self {
        StyleValue::Int(i64::from(v))
    }
}

impl From<u32> for StyleValue {
    fn from(v: u32) -> Self {
        StyleValue::Int(i64::from(v))
    }
}

impl From<f64> for StyleValue {
    fn from(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < 1e15 {
            StyleValue::Int(v as i64)
        } else {
            StyleValue::Num(v)
        }
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        StyleValue::Int(i64::from(v))
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        StyleValue::Text(v.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        StyleValue::Text(v)
    }
}

/// Insertion-ordered style map.
///
/// Re-setting a key replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    entries: IndexMap<String, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<StyleValue>) -> &mut Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.get(key)
    }

    /// Merge `other` over `self`; keys from `other` win.
    pub fn merge(&mut self, other: &Style) -> &mut Self {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
        self
    }

    /// Render as `key=value;key=value;`. A truthy `swimlane` key is written as
    /// the bare keyword.
    pub fn compose(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            if key == "swimlane" && value.is_truthy() {
                f.write_str("swimlane;")?;
            } else {
                write!(f, "{}={};", key, value)?;
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for Style {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map: IndexMap<String, Value> = IndexMap::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .filter_map(|(k, v)| {
                let value: StyleValue = match v {
                    Value::String(s) => s.into(),
                    Value::Bool(b) => b.into(),
                    Value::Number(n) => n.as_f64()?.into(),
                    _ => return None,
                };
                Some((k, value))
            })
            .collect())
    }
}
