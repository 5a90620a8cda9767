//! The value model shared by inputs and outputs.
//!
//! [`InputValue`] is what a query document or a variable map carries before
//! coercion: it may still contain variable references. [`Value`] is what
//! coercion and resolvers produce, and what ends up in a response.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// An ordered map of response keys to values.
pub type Object = IndexMap<String, Value>;

/// The raw variables of a request, keyed by variable name without the `$`.
pub type Variables = HashMap<String, InputValue>;

/// A resolved GraphQL value.
///
/// Enum values are kept apart from strings so that they print as names in
/// error messages, but both serialize as JSON strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Encodes one case of a sum type.
    ///
    /// The result is an object holding one key per case name: the active case
    /// maps to `value` and every other case maps to null.
    pub fn variant<'a>(
        cases: impl IntoIterator<Item = &'a str>,
        active: &str,
        value: impl Into<Value>,
    ) -> Value {
        let mut value = Some(value.into());
        Value::Object(
            cases
                .into_iter()
                .map(|case| {
                    let encoded = if case == active {
                        value.take().unwrap_or_default()
                    } else {
                        Value::Null
                    };
                    (case.to_string(), encoded)
                })
                .collect(),
        )
    }

    /// Encodes a map as a list of `{key, value}` entry objects.
    pub fn entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::List(
            entries
                .into_iter()
                .map(|(key, value)| {
                    let mut entry = Object::with_capacity(2);
                    entry.insert("key".to_string(), key.into());
                    entry.insert("value".to_string(), value.into());
                    Value::Object(entry)
                })
                .collect(),
        )
    }

    /// A short description of the value, used in error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) | Value::Enum(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Enum(name) => write!(f, "{name}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => {
                write!(f, "{{")?;
                for (index, (key, value)) in object.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<uuid::Uuid> for Value {
    fn from(id: uuid::Uuid) -> Self {
        Value::String(id.hyphenated().to_string())
    }
}

/// A value as written in a query document or a variable map.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InputValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
    Variable(String),
}

impl InputValue {
    /// Replaces variable references with their raw values, without coercing.
    ///
    /// A variable absent from `variables` reads as null.
    pub fn to_value(&self, variables: &Variables) -> Value {
        match self {
            InputValue::Null => Value::Null,
            InputValue::Boolean(b) => Value::Boolean(*b),
            InputValue::Int(i) => Value::Int(*i),
            InputValue::Float(f) => Value::Float(*f),
            InputValue::String(s) => Value::String(s.clone()),
            InputValue::Enum(name) => Value::Enum(name.clone()),
            InputValue::List(items) => {
                Value::List(items.iter().map(|item| item.to_value(variables)).collect())
            }
            InputValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value(variables)))
                    .collect(),
            ),
            InputValue::Variable(name) => match variables.get(name) {
                // raw variables never reference other variables
                Some(InputValue::Variable(_)) | None => Value::Null,
                Some(value) => value.to_value(variables),
            },
        }
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json_bytes::Value::deserialize(deserializer).map(InputValue::from)
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Null => write!(f, "null"),
            InputValue::Boolean(b) => write!(f, "{b}"),
            InputValue::Int(i) => write!(f, "{i}"),
            InputValue::Float(v) => write!(f, "{v}"),
            InputValue::String(s) => write!(f, "{s:?}"),
            InputValue::Enum(name) => write!(f, "{name}"),
            InputValue::Variable(name) => write!(f, "${name}"),
            InputValue::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            InputValue::Object(fields) => {
                write!(f, "{{")?;
                for (index, (key, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        InputValue::Boolean(b)
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        InputValue::Int(i64::from(i))
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        InputValue::Float(f)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::String(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::String(s)
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(items: Vec<T>) -> Self {
        InputValue::List(items.into_iter().map(Into::into).collect())
    }
}
