//! Performance oriented JSON helpers: response paths and conversions between
//! [`serde_json_bytes::Value`] and the engine's own value model.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value as JsonValue;

use crate::value::InputValue;
use crate::value::Object;
use crate::value::Value;

/// A JSON object, as found in error extensions.
pub type JsonObject = serde_json_bytes::Map<serde_json_bytes::ByteString, JsonValue>;

/// A GraphQL path element that is composes of strings or numbers.
/// e.g `/book/3/name`
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index path element.
    Index(usize),

    /// A key path element.
    Key(String),
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::Key(key.to_string())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        PathElement::Key(key)
    }
}

/// A path into the result document.
///
/// This can be composed of strings and numbers. Every field error carries the
/// path of the field that failed.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Path {
        Path(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    /// Returns a new path with `element` appended.
    pub fn join(&self, element: impl Into<PathElement>) -> Path {
        let mut elements = Vec::with_capacity(self.0.len() + 1);
        elements.extend(self.0.iter().cloned());
        elements.push(element.into());
        Path(elements)
    }

}

impl<T> From<T> for Path
where
    T: AsRef<str>,
{
    fn from(s: T) -> Self {
        Self(
            s.as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<usize>() {
                    Ok(index) => PathElement::Index(index),
                    Err(_) => PathElement::Key(s.to_string()),
                })
                .collect(),
        )
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.iter() {
            write!(f, "/")?;
            match element {
                PathElement::Index(index) => write!(f, "{index}")?,
                PathElement::Key(key) => write!(f, "{key}")?,
            }
        }
        Ok(())
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(b),
            Value::Int(i) => JsonValue::from(i),
            Value::Float(f) => JsonValue::from(f),
            Value::String(s) | Value::Enum(s) => JsonValue::String(s.into()),
            Value::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Value::Object(object) => JsonValue::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key.into(), JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::String(s.as_str().to_string()),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key.as_str().to_string(), Value::from(value)))
                    .collect::<Object>(),
            ),
        }
    }
}

/// Variables arrive as plain JSON: strings stay strings, and enum-typed
/// targets accept them as enum names during coercion.
impl From<JsonValue> for InputValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => InputValue::Null,
            JsonValue::Bool(b) => InputValue::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => InputValue::Int(i),
                None => n
                    .as_f64()
                    .map(InputValue::Float)
                    .unwrap_or(InputValue::Null),
            },
            JsonValue::String(s) => InputValue::String(s.as_str().to_string()),
            JsonValue::Array(items) => {
                InputValue::List(items.into_iter().map(InputValue::from).collect())
            }
            JsonValue::Object(map) => InputValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key.as_str().to_string(), InputValue::from(value)))
                    .collect(),
            ),
        }
    }
}
