use serde::Serialize;

use crate::pattern::{SlotInfo, ValueType};

/// Converted argument text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Everything bound by a repeated slot, in argument order.
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value '{text}': expected {expected}")]
pub struct ConversionError {
    pub text: String,
    pub expected: String,
}

/// Convert one argument's text according to `ty`.
pub fn convert(text: &str, ty: &ValueType) -> Result<Value, ConversionError> {
    let fail = || ConversionError {
        text: text.to_string(),
        expected: ty.describe(),
    };
    match ty {
        ValueType::Str => Ok(Value::Str(text.to_string())),
        ValueType::Int => text.parse().map(Value::Int).map_err(|_| fail()),
        ValueType::Float => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(fail),
        ValueType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
        ValueType::Choice(choices) => {
            if choices.iter().any(|c| c == text) {
                Ok(Value::Str(text.to_string()))
            } else {
                Err(fail())
            }
        }
    }
}

/// Values bound to a pattern's slots, in slot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    names: Vec<String>,
    values: Vec<Option<Value>>,
}

impl Bindings {
    /// Empty bindings for `slots`: repeated slots start as empty lists,
    /// the rest as unbound.
    pub(crate) fn for_slots(slots: &[SlotInfo]) -> Self {
        Self {
            names: slots.iter().map(|s| s.name.clone()).collect(),
            values: slots
                .iter()
                .map(|s| s.repeated.then(|| Value::List(Vec::new())))
                .collect(),
        }
    }

    pub(crate) fn bind(&mut self, slot: usize, value: Value) {
        match &mut self.values[slot] {
            Some(Value::List(items)) => items.push(value),
            other => *other = Some(value),
        }
    }

    /// Value of the slot at `index`; `None` when out of range or unbound.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Value of the first slot called `name`.
    pub fn by_name(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_ref))
    }
}

impl Serialize for Bindings {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
