//! Property values and value types.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Numeric vector storage. Most vectors are 2 to 4 elements long.
pub type Vector = SmallVec<[f64; 4]>;

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Vector(Vector),
    Object(serde_json::Value),
}

impl Value {
    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Vector(_) => "vector",
            Value::Object(_) => "object",
        }
    }

    /// Numeric view of scalar values. Booleans map to 0 and 1.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Boolean view of scalar values. Numbers are true when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Text rendering of scalar values, used when a scalar feeds a string.
    fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Vector(Vector::from_vec(value))
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(value: [f64; N]) -> Self {
        Value::Vector(value.iter().copied().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Object(value)
    }
}

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Boolean,
    Number,
    /// Index into the schema's option list, stored as a number.
    Enum,
    String,
    /// Fixed-length numeric vector. A length of zero accepts any length.
    Vector(usize),
    Object,
    /// Trigger carried as a counter; only the change matters.
    Event,
}

impl ValueType {
    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::Enum => "enum",
            ValueType::String => "string",
            ValueType::Vector(_) => "vector",
            ValueType::Object => "object",
            ValueType::Event => "event",
        }
    }

    /// Types whose values are plain numbers or booleans.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Boolean | ValueType::Number | ValueType::Enum | ValueType::Event
        )
    }

    /// Whether a link may carry values of this type into `target`.
    pub fn can_feed(&self, target: &ValueType) -> bool {
        match (self, target) {
            (ValueType::Vector(a), ValueType::Vector(b)) => *a == 0 || *b == 0 || a == b,
            (a, b) if a == b => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (a, ValueType::String) => a.is_numeric() || *a == ValueType::String,
            _ => false,
        }
    }

    /// Convert a value to this type, if the shapes are compatible.
    pub fn convert(&self, value: &Value) -> Option<Value> {
        match self {
            ValueType::Boolean => value.as_bool().map(Value::Bool),
            ValueType::Number | ValueType::Enum | ValueType::Event => {
                value.as_number().map(Value::Number)
            }
            ValueType::String => value.to_text().map(Value::String),
            ValueType::Vector(len) => match value {
                Value::Vector(v) if *len == 0 || v.len() == *len => Some(value.clone()),
                _ => None,
            },
            ValueType::Object => match value {
                Value::Object(_) => Some(value.clone()),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_shapes() {
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v, Value::Bool(true));

        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Number(3.0));

        let v: Value = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(v, Value::from([1.0, 2.0, 3.0]));

        let v: Value = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        assert_eq!(v.kind(), "object");
    }

    #[test]
    fn numeric_family_converts() {
        assert_eq!(ValueType::Boolean.convert(&Value::Number(2.0)), Some(Value::Bool(true)));
        assert_eq!(ValueType::Number.convert(&Value::Bool(true)), Some(Value::Number(1.0)));
        assert_eq!(
            ValueType::String.convert(&Value::Number(1.5)),
            Some(Value::String("1.5".into()))
        );
        assert_eq!(ValueType::Number.convert(&Value::String("1".into())), None);
    }

    #[test]
    fn vector_lengths_must_agree() {
        let v3 = Value::from([0.0, 1.0, 2.0]);
        assert!(ValueType::Vector(3).convert(&v3).is_some());
        assert!(ValueType::Vector(2).convert(&v3).is_none());
        assert!(ValueType::Vector(0).convert(&v3).is_some());

        assert!(ValueType::Vector(3).can_feed(&ValueType::Vector(3)));
        assert!(!ValueType::Vector(3).can_feed(&ValueType::Vector(4)));
    }

    #[test]
    fn link_compatibility() {
        assert!(ValueType::Number.can_feed(&ValueType::Boolean));
        assert!(ValueType::Event.can_feed(&ValueType::Number));
        assert!(ValueType::Number.can_feed(&ValueType::String));
        assert!(!ValueType::String.can_feed(&ValueType::Number));
        assert!(!ValueType::Object.can_feed(&ValueType::String));
        assert!(ValueType::Object.can_feed(&ValueType::Object));
    }
}
