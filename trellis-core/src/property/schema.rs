//! Property schemas: type, default and metadata.

use serde::Deserialize;

use super::value::{Value, ValueType, Vector};
use crate::error::GraphResult;

/// Static description of a property.
///
/// Schemas are built with one constructor per value type and refined with
/// the `with_*` builders:
///
/// ```
/// use trellis_core::PropertySchema;
///
/// let opacity = PropertySchema::number(1.0).with_range(0.0, 1.0).with_label("Opacity");
/// assert_eq!(opacity.max, Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    pub value_type: ValueType,
    pub default: Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Option labels of an enum property.
    pub options: Vec<String>,
    pub label: Option<String>,
}

impl PropertySchema {
    fn new(value_type: ValueType, default: Value) -> Self {
        Self {
            value_type,
            default,
            min: None,
            max: None,
            options: Vec::new(),
            label: None,
        }
    }

    pub fn boolean(default: bool) -> Self {
        Self::new(ValueType::Boolean, Value::Bool(default))
    }

    pub fn number(default: f64) -> Self {
        Self::new(ValueType::Number, Value::Number(default))
    }

    /// Enumeration over `options`; the value is the selected index.
    pub fn enumeration<S: AsRef<str>>(options: &[S], default: usize) -> Self {
        let mut schema = Self::new(ValueType::Enum, Value::Number(default as f64));
        schema.options = options.iter().map(|o| o.as_ref().to_string()).collect();
        schema
    }

    pub fn string(default: impl Into<String>) -> Self {
        Self::new(ValueType::String, Value::String(default.into()))
    }

    /// Fixed-length vector; the length is taken from the default.
    pub fn vector(default: &[f64]) -> Self {
        Self::new(
            ValueType::Vector(default.len()),
            Value::Vector(Vector::from_slice(default)),
        )
    }

    pub fn object(default: serde_json::Value) -> Self {
        Self::new(ValueType::Object, Value::Object(default))
    }

    pub fn event() -> Self {
        Self::new(ValueType::Event, Value::Number(0.0))
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_event(&self) -> bool {
        self.value_type == ValueType::Event
    }

    /// Convert `value` to this schema's type and clamp it to the declared
    /// bounds. Enum indices are rounded and clamped to the option list.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        let converted = self.value_type.convert(value)?;
        Some(match (self.value_type, converted) {
            (ValueType::Enum, Value::Number(n)) => {
                let last = self.options.len().saturating_sub(1) as f64;
                Value::Number(n.round().clamp(0.0, last))
            }
            (ValueType::Number, Value::Number(n)) => Value::Number(self.clamp(n)),
            (_, converted) => converted,
        })
    }

    /// Read a value stored in a document. Object properties take the JSON
    /// as is; other types go through the untagged [`Value`] form.
    pub fn value_from_json(&self, json: &serde_json::Value) -> GraphResult<Value> {
        if self.value_type == ValueType::Object {
            return Ok(Value::Object(json.clone()));
        }
        Ok(Value::deserialize(json)?)
    }

    fn clamp(&self, n: f64) -> f64 {
        let n = self.min.map_or(n, |min| n.max(min));
        self.max.map_or(n, |max| n.min(max))
    }

    /// Option label for an enum value.
    pub fn option_label(&self, value: &Value) -> Option<&str> {
        let index = value.as_number()? as usize;
        self.options.get(index).map(String::as_str)
    }
}
