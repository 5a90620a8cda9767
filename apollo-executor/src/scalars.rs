//! Custom scalar codecs.
//!
//! A schema registers a [`ScalarCodec`] per custom scalar name. Input
//! coercion runs [`ScalarCodec::decode`] on the raw literal and result
//! completion runs [`ScalarCodec::encode`] on whatever the resolver produced.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Converts a custom scalar between its wire form and its resolved form.
pub trait ScalarCodec: Send + Sync + 'static {
    /// Turns a raw input (variables already substituted) into the scalar's
    /// value, or explains why it is not acceptable.
    fn decode(&self, raw: Value) -> Result<Value, String>;

    /// Turns a resolved value into its wire form.
    fn encode(&self, value: Value) -> Value {
        value
    }
}

impl<F> ScalarCodec for F
where
    F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
{
    fn decode(&self, raw: Value) -> Result<Value, String> {
        self(raw)
    }
}

/// Custom scalars by name.
#[derive(Clone, Default)]
pub struct ScalarRegistry {
    codecs: HashMap<String, Arc<dyn ScalarCodec>>,
}

impl ScalarRegistry {
    pub fn register(&mut self, name: impl Into<String>, codec: impl ScalarCodec) {
        self.codecs
            .entry(name.into())
            .or_insert_with(|| Arc::new(codec));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScalarCodec>> {
        self.codecs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Adds the codecs of `other` whose name is not registered yet.
    pub(crate) fn merge(&mut self, other: ScalarRegistry) {
        for (name, codec) in other.codecs {
            if self.codecs.contains_key(&name) {
                tracing::warn!(scalar = %name, "scalar registered twice, keeping the first codec");
                continue;
            }
            self.codecs.insert(name, codec);
        }
    }
}

impl fmt::Debug for ScalarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.codecs.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

/// The `UUID` scalar: accepts any textual UUID and always emits the
/// lowercase hyphenated form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidScalar;

impl ScalarCodec for UuidScalar {
    fn decode(&self, raw: Value) -> Result<Value, String> {
        match raw {
            Value::String(s) => uuid::Uuid::parse_str(&s)
                .map(Value::from)
                .map_err(|error| format!("'{s}' is not a valid UUID: {error}")),
            other => Err(format!("expected a UUID string, found {}", other.kind())),
        }
    }

    fn encode(&self, value: Value) -> Value {
        match value {
            Value::String(s) => match uuid::Uuid::parse_str(&s) {
                Ok(id) => Value::from(id),
                Err(_) => Value::String(s),
            },
            other => other,
        }
    }
}

/// The `Json` scalar: any value goes through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonScalar;

impl ScalarCodec for JsonScalar {
    fn decode(&self, raw: Value) -> Result<Value, String> {
        Ok(raw)
    }
}
