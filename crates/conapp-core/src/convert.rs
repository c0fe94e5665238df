//! String to value conversion, keyed by declared value type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::ValueType;

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Produced by a custom converter.
    Custom {
        type_name: String,
        value: serde_json::Value,
    },
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Custom { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Custom { value, .. } => write!(f, "{value}"),
        }
    }
}

/// Converts a raw input string to a [`Value`]. The error is a short reason
/// used in diagnostics.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value, String>;
}

impl<F> ValueConverter for F
where
    F: Fn(&str) -> Result<Value, String> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value, String> {
        self(raw)
    }
}

/// Registry of converters by value type.
///
/// Starts with converters for the primitive types. Custom types are added
/// with [`register_custom`](Self::register_custom); converting to a custom
/// type nobody registered fails like any other invalid value.
#[derive(Clone)]
pub struct Converters {
    converters: HashMap<ValueType, Arc<dyn ValueConverter>>,
}

impl Converters {
    pub fn new() -> Self {
        let mut converters = Self {
            converters: HashMap::new(),
        };
        converters.register(ValueType::String, convert_string);
        converters.register(ValueType::Integer, convert_integer);
        converters.register(ValueType::Float, convert_float);
        converters.register(ValueType::Boolean, convert_boolean);
        converters
    }

    /// Register a converter. Replaces any existing converter for the type.
    pub fn register(&mut self, value_type: ValueType, converter: impl ValueConverter + 'static) {
        self.converters.insert(value_type, Arc::new(converter));
    }

    /// Register a converter for `ValueType::Custom(name)`. The closure
    /// produces the JSON payload; it is wrapped in [`Value::Custom`].
    pub fn register_custom<F>(&mut self, name: &str, convert: F)
    where
        F: Fn(&str) -> Result<serde_json::Value, String> + Send + Sync + 'static,
    {
        let type_name = name.to_string();
        self.register(ValueType::custom(name), move |raw: &str| {
            convert(raw).map(|value| Value::Custom {
                type_name: type_name.clone(),
                value,
            })
        });
    }

    pub fn supports(&self, value_type: &ValueType) -> bool {
        self.converters.contains_key(value_type)
    }

    pub fn convert(&self, value_type: &ValueType, raw: &str) -> Result<Value, String> {
        match self.converters.get(value_type) {
            Some(converter) => converter.convert(raw),
            None => Err(format!("no converter registered for type `{value_type}`")),
        }
    }
}

impl Default for Converters {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.converters.keys().map(ToString::to_string).collect();
        types.sort();
        f.debug_struct("Converters").field("types", &types).finish()
    }
}

fn convert_string(raw: &str) -> Result<Value, String> {
    Ok(Value::String(raw.to_string()))
}

fn convert_integer(raw: &str) -> Result<Value, String> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| format!("`{raw}` is not an integer: {e}"))
}

fn convert_float(raw: &str) -> Result<Value, String> {
    match raw.trim().parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Value::Float(x)),
        Ok(_) => Err(format!("`{raw}` is not a finite number")),
        Err(e) => Err(format!("`{raw}` is not a number: {e}")),
    }
}

fn convert_boolean(raw: &str) -> Result<Value, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Boolean(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Boolean(false)),
        _ => Err(format!("`{raw}` is not a boolean")),
    }
}
