//! Core value type produced by evaluation

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

use super::coercion;

/// Ordered key/value mapping; keys are unique and keep insertion order
pub type Mapping = IndexMap<String, ConfValue>;

/// Result of folding an expression.
///
/// `Null` is an explicit `null`, `Absent` is `undefined` (never assigned).
/// They are distinct values but both are falsy and both trigger `??`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfValue {
    /// Explicit null
    Null,
    /// Undefined / never assigned
    #[default]
    Absent,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double, as in the source language)
    Number(f64),
    /// String value
    String(String),
    /// Ordered mapping (object literal)
    Mapping(Mapping),
    /// Sequence (array literal)
    Sequence(Vec<ConfValue>),
}

impl ConfValue {
    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        ConfValue::String(value.into())
    }

    /// Create a number value
    pub fn number(value: impl Into<f64>) -> Self {
        ConfValue::Number(value.into())
    }

    /// Truthiness: `false`, `0`, `-0`, `NaN`, `''`, `null` and `undefined` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfValue::Null | ConfValue::Absent => false,
            ConfValue::Boolean(b) => *b,
            ConfValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ConfValue::String(s) => !s.is_empty(),
            ConfValue::Mapping(_) | ConfValue::Sequence(_) => true,
        }
    }

    /// Whether the value is `null` or `undefined`
    pub fn is_nullish(&self) -> bool {
        matches!(self, ConfValue::Null | ConfValue::Absent)
    }

    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfValue::Null => "null",
            ConfValue::Absent => "undefined",
            ConfValue::Boolean(_) => "boolean",
            ConfValue::Number(_) => "number",
            ConfValue::String(_) => "string",
            ConfValue::Mapping(_) => "object",
            ConfValue::Sequence(_) => "array",
        }
    }

    /// Result of the `typeof` operator
    pub fn type_tag(&self) -> &'static str {
        match self {
            ConfValue::Null | ConfValue::Mapping(_) | ConfValue::Sequence(_) => "object",
            other => other.type_name(),
        }
    }

    /// Number payload, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Mapping payload, if any
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Sequence payload, if any
    pub fn as_sequence(&self) -> Option<&[ConfValue]> {
        match self {
            ConfValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of a mapping
    pub fn get(&self, key: &str) -> Option<&ConfValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Property read with the source language's semantics.
    ///
    /// Missing properties read as `Absent`; `length` is defined for strings
    /// and sequences; sequences accept index keys. Returns `None` when the
    /// receiver is `null`/`undefined`, which is an error for plain access.
    pub fn property(&self, key: &str) -> Option<ConfValue> {
        match self {
            ConfValue::Null | ConfValue::Absent => None,
            ConfValue::Mapping(m) => Some(m.get(key).cloned().unwrap_or(ConfValue::Absent)),
            ConfValue::Sequence(items) => Some(if key == "length" {
                ConfValue::Number(items.len() as f64)
            } else {
                coercion::array_index(key)
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or(ConfValue::Absent)
            }),
            ConfValue::String(s) => Some(if key == "length" {
                ConfValue::Number(s.encode_utf16().count() as f64)
            } else {
                coercion::array_index(key)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| ConfValue::String(c.to_string()))
                    .unwrap_or(ConfValue::Absent)
            }),
            ConfValue::Boolean(_) | ConfValue::Number(_) => Some(ConfValue::Absent),
        }
    }

    /// Copy of the value with every mapping reordered by the property-order
    /// rule of the source language: array-index keys ascending, then the
    /// remaining keys in insertion order.
    pub fn with_normalized_key_order(&self) -> ConfValue {
        match self {
            ConfValue::Mapping(m) => {
                let mut index_keys: Vec<(u32, &String)> = m
                    .keys()
                    .filter_map(|k| coercion::array_index(k).map(|i| (i as u32, k)))
                    .collect();
                index_keys.sort_by_key(|(i, _)| *i);

                let mut out = Mapping::with_capacity(m.len());
                for (_, key) in &index_keys {
                    out.insert((*key).clone(), m[*key].with_normalized_key_order());
                }
                for (key, value) in m {
                    if !out.contains_key(key) {
                        out.insert(key.clone(), value.with_normalized_key_order());
                    }
                }
                ConfValue::Mapping(out)
            }
            ConfValue::Sequence(items) => ConfValue::Sequence(
                items.iter().map(ConfValue::with_normalized_key_order).collect(),
            ),
            other => other.clone(),
        }
    }
}

impl From<bool> for ConfValue {
    fn from(value: bool) -> Self {
        ConfValue::Boolean(value)
    }
}

impl From<f64> for ConfValue {
    fn from(value: f64) -> Self {
        ConfValue::Number(value)
    }
}

impl From<i32> for ConfValue {
    fn from(value: i32) -> Self {
        ConfValue::Number(value as f64)
    }
}

impl From<&str> for ConfValue {
    fn from(value: &str) -> Self {
        ConfValue::String(value.to_string())
    }
}

impl From<String> for ConfValue {
    fn from(value: String) -> Self {
        ConfValue::String(value)
    }
}

impl From<Vec<ConfValue>> for ConfValue {
    fn from(values: Vec<ConfValue>) -> Self {
        ConfValue::Sequence(values)
    }
}

impl From<Mapping> for ConfValue {
    fn from(values: Mapping) -> Self {
        ConfValue::Mapping(values)
    }
}

impl From<serde_json::Value> for ConfValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfValue::Null,
            serde_json::Value::Bool(b) => ConfValue::Boolean(b),
            serde_json::Value::Number(n) => ConfValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => ConfValue::String(s),
            serde_json::Value::Array(items) => {
                ConfValue::Sequence(items.into_iter().map(ConfValue::from).collect())
            }
            serde_json::Value::Object(map) => ConfValue::Mapping(
                map.into_iter().map(|(k, v)| (k, ConfValue::from(v))).collect(),
            ),
        }
    }
}

impl fmt::Display for ConfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coercion::to_display_string(self))
    }
}

/// Integral doubles serialize as integers so `1` never renders as `1.0`
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for ConfValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfValue::Null | ConfValue::Absent => serializer.serialize_unit(),
            ConfValue::Boolean(b) => serializer.serialize_bool(*b),
            ConfValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            ConfValue::String(s) => serializer.serialize_str(s),
            ConfValue::Mapping(m) => {
                let present = m.values().filter(|v| !matches!(v, ConfValue::Absent)).count();
                let mut map = serializer.serialize_map(Some(present))?;
                for (key, value) in m {
                    if !matches!(value, ConfValue::Absent) {
                        map.serialize_entry(key, value)?;
                    }
                }
                map.end()
            }
            ConfValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!ConfValue::Null.is_truthy());
        assert!(!ConfValue::Absent.is_truthy());
        assert!(!ConfValue::Boolean(false).is_truthy());
        assert!(!ConfValue::Number(0.0).is_truthy());
        assert!(!ConfValue::Number(-0.0).is_truthy());
        assert!(!ConfValue::Number(f64::NAN).is_truthy());
        assert!(!ConfValue::string("").is_truthy());
        assert!(ConfValue::string("0").is_truthy());
        assert!(ConfValue::Mapping(Mapping::new()).is_truthy());
        assert!(ConfValue::Sequence(vec![]).is_truthy());
    }

    #[test]
    fn test_serialize_integral_numbers_and_absent() {
        let mut m = Mapping::new();
        m.insert("int".into(), ConfValue::Number(3.0));
        m.insert("float".into(), ConfValue::Number(1.5));
        m.insert("missing".into(), ConfValue::Absent);
        m.insert(
            "list".into(),
            ConfValue::Sequence(vec![ConfValue::Absent, ConfValue::Null]),
        );
        let json = serde_json::to_value(ConfValue::Mapping(m)).unwrap();
        assert_eq!(json, json!({"int": 3, "float": 1.5, "list": [null, null]}));
    }

    #[test]
    fn test_normalized_key_order_puts_index_keys_first() {
        let value: ConfValue = [("b", 1), ("10", 2), ("a", 3), ("2", 4)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), ConfValue::from(v)))
            .collect::<Mapping>()
            .into();
        let normalized = value.with_normalized_key_order();
        let keys: Vec<_> = normalized.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["2", "10", "b", "a"]);
    }

    #[test]
    fn test_property_access() {
        let seq = ConfValue::Sequence(vec![ConfValue::from(1), ConfValue::from(2)]);
        assert_eq!(seq.property("length"), Some(ConfValue::Number(2.0)));
        assert_eq!(seq.property("1"), Some(ConfValue::Number(2.0)));
        assert_eq!(seq.property("5"), Some(ConfValue::Absent));
        assert_eq!(ConfValue::from("abc").property("length"), Some(ConfValue::Number(3.0)));
        assert_eq!(ConfValue::Null.property("x"), None);
    }
}
