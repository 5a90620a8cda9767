use std::fmt;
use std::future::Future;
use std::sync::Arc;

use derivative::Derivative;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;
use futures::Stream;
use futures::StreamExt;
use futures::TryFutureExt;
use indexmap::IndexMap;

use crate::spec::FieldType;
use crate::value::Object;
use crate::value::Value;

/// Error type reported by effects and streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coerced field arguments, keyed by argument name in declaration order.
pub type Arguments = Object;

/// How a field produces its value.
pub enum ResolverNode {
    /// An already available value.
    Pure(ResolvedValue),

    /// A computation that may suspend and may fail.
    Effect(BoxFuture<'static, Result<ResolvedValue, BoxError>>),

    /// A lazy sequence of values. Only allowed on subscription root fields.
    Stream(BoxStream<'static, Result<ResolvedValue, BoxError>>),
}

impl ResolverNode {
    pub fn pure(value: impl Into<Value>) -> Self {
        Self::Pure(ResolvedValue::Leaf(value.into()))
    }

    pub fn null() -> Self {
        Self::Pure(ResolvedValue::Leaf(Value::Null))
    }

    pub fn object(object: SchemaObject) -> Self {
        Self::Pure(ResolvedValue::Object(object))
    }

    pub fn list(items: impl IntoIterator<Item = ResolverNode>) -> Self {
        Self::Pure(ResolvedValue::List(items.into_iter().collect()))
    }

    pub fn effect<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Into<ResolvedValue> + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::Effect(
            future
                .map_ok(|value| -> ResolvedValue { value.into() })
                .map_err(|error| -> BoxError { error.into() })
                .boxed(),
        )
    }

    pub fn stream<S, T>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
        T: Into<ResolvedValue> + 'static,
    {
        Self::Stream(
            stream
                .map(|item| -> Result<ResolvedValue, BoxError> { Ok(item.into()) })
                .boxed(),
        )
    }

    /// A stream whose items may fail. An `Err` item ends the subscription.
    pub fn try_stream<S, T, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Into<ResolvedValue> + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::Stream(
            stream
                .map(|item| -> Result<ResolvedValue, BoxError> {
                    item.map(Into::into).map_err(Into::into)
                })
                .boxed(),
        )
    }
}

impl fmt::Debug for ResolverNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverNode::Pure(value) => f.debug_tuple("Pure").field(value).finish(),
            ResolverNode::Effect(_) => f.write_str("Effect"),
            ResolverNode::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// The value of a resolved field
#[derive(Debug)]
pub enum ResolvedValue {
    /// A scalar, an enum, a list of those, or a record: an object value
    /// projected by the sub-selection, typed by its `__typename` key.
    Leaf(Value),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(SchemaObject),

    /// Expected for GraphQL list types
    List(Vec<ResolverNode>),
}

impl From<Value> for ResolvedValue {
    fn from(value: Value) -> Self {
        Self::Leaf(value)
    }
}

impl From<SchemaObject> for ResolvedValue {
    fn from(object: SchemaObject) -> Self {
        Self::Object(object)
    }
}

impl From<Vec<ResolverNode>> for ResolvedValue {
    fn from(items: Vec<ResolverNode>) -> Self {
        Self::List(items)
    }
}

impl From<i32> for ResolvedValue {
    fn from(i: i32) -> Self {
        Self::Leaf(i.into())
    }
}

impl From<&str> for ResolvedValue {
    fn from(s: &str) -> Self {
        Self::Leaf(s.into())
    }
}

impl From<String> for ResolvedValue {
    fn from(s: String) -> Self {
        Self::Leaf(s.into())
    }
}

/// An object type and the resolvers of its fields.
///
/// Field names are unique: declaring a field twice keeps the first
/// declaration.
#[derive(Clone, Debug)]
pub struct SchemaObject {
    type_name: String,
    fields: IndexMap<String, FieldResolver>,
}

impl SchemaObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, resolver: FieldResolver) -> Self {
        let name = name.into();
        if self.fields.contains_key(&name) {
            tracing::warn!(
                type_name = %self.type_name,
                field = %name,
                "field declared twice, keeping the first declaration"
            );
        } else {
            self.fields.insert(name, resolver);
        }
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&FieldResolver> {
        self.fields.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Appends the fields of `other` that `self` does not declare.
    pub(crate) fn merge(self, other: SchemaObject) -> SchemaObject {
        other
            .fields
            .into_iter()
            .fold(self, |merged, (name, resolver)| merged.field(name, resolver))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArgumentDefinition {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) default_value: Option<Value>,
}

#[derive(Clone)]
enum Binding {
    Arguments(Arc<dyn Fn(&Arguments) -> ResolverNode + Send + Sync>),
    Single(Arc<dyn Fn(Value) -> ResolverNode + Send + Sync>),
}

/// A field of a [`SchemaObject`]: its declared type and arguments, and the
/// function producing its [`ResolverNode`] from the coerced arguments.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct FieldResolver {
    ty: FieldType,
    arguments: Vec<ArgumentDefinition>,
    #[derivative(Debug = "ignore")]
    binding: Binding,
}

impl FieldResolver {
    pub fn new<F>(ty: FieldType, resolve: F) -> Self
    where
        F: Fn(&Arguments) -> ResolverNode + Send + Sync + 'static,
    {
        Self {
            ty,
            arguments: Vec::new(),
            binding: Binding::Arguments(Arc::new(resolve)),
        }
    }

    /// A field taking one argument, handed to `resolve` as its coerced value
    /// rather than wrapped in [`Arguments`].
    pub fn with_single_argument<F>(
        ty: FieldType,
        argument: impl Into<String>,
        argument_type: FieldType,
        resolve: F,
    ) -> Self
    where
        F: Fn(Value) -> ResolverNode + Send + Sync + 'static,
    {
        Self {
            ty,
            arguments: vec![ArgumentDefinition {
                name: argument.into(),
                ty: argument_type,
                default_value: None,
            }],
            binding: Binding::Single(Arc::new(resolve)),
        }
    }

    pub fn argument(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.declare(name.into(), ty, None)
    }

    pub fn argument_with_default(
        self,
        name: impl Into<String>,
        ty: FieldType,
        default_value: impl Into<Value>,
    ) -> Self {
        self.declare(name.into(), ty, Some(default_value.into()))
    }

    fn declare(mut self, name: String, ty: FieldType, default_value: Option<Value>) -> Self {
        match self.arguments.iter_mut().find(|argument| argument.name == name) {
            // `with_single_argument` fields may only refine their argument
            Some(existing) => {
                existing.ty = ty;
                existing.default_value = default_value;
            }
            None if matches!(self.binding, Binding::Single(_)) => {
                failfast_debug!(
                    "ignoring argument {} on a field bound to a single argument",
                    name
                );
            }
            None => self.arguments.push(ArgumentDefinition {
                name,
                ty,
                default_value,
            }),
        }
        self
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub(crate) fn argument_definitions(&self) -> &[ArgumentDefinition] {
        &self.arguments
    }

    pub(crate) fn resolve(&self, mut arguments: Arguments) -> ResolverNode {
        match &self.binding {
            Binding::Arguments(resolve) => resolve(&arguments),
            Binding::Single(resolve) => {
                let value = self
                    .arguments
                    .first()
                    .and_then(|argument| arguments.shift_remove(&argument.name))
                    .unwrap_or_default();
                resolve(value)
            }
        }
    }
}
