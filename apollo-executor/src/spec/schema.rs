//! The schema an [`Executor`](crate::Executor) runs against.

use std::collections::HashMap;
use std::ops::Add;

use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::execution::resolver::SchemaObject;
use crate::scalars::ScalarCodec;
use crate::scalars::ScalarRegistry;
use crate::spec::query::OperationKind;
use crate::spec::FieldType;
use crate::value::Value;

/// An enum type and its allowed values, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub values: IndexSet<String>,
}

/// A field of an input object type.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub ty: FieldType,
    pub default_value: Option<Value>,
}

/// An input object type and its fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, InputField>,
}

#[buildstructor::buildstructor]
impl InputObjectType {
    /// Builder methods: `.name(..)`, `.field(InputField)` (or `.fields(..)`),
    /// then `.build()`. A field name given twice keeps its first declaration.
    #[builder(visibility = "pub")]
    fn new(name: String, fields: Vec<InputField>) -> Self {
        let mut by_name = IndexMap::with_capacity(fields.len());
        for field in fields {
            by_name.entry(field.name.clone()).or_insert(field);
        }
        Self {
            name,
            fields: by_name,
        }
    }
}

impl InputField {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<Value>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// The root resolvers of each operation type plus the type registries that
/// coercion and fragment matching consult.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) query: SchemaObject,
    pub(crate) mutation: Option<SchemaObject>,
    pub(crate) subscription: Option<SchemaObject>,
    pub(crate) enums: HashMap<String, EnumType>,
    pub(crate) input_types: HashMap<String, InputObjectType>,
    /// Abstract type name to the object types that implement it.
    pub(crate) implementers: HashMap<String, IndexSet<String>>,
    pub(crate) scalars: ScalarRegistry,
}

impl Default for Schema {
    fn default() -> Self {
        Schema::builder().build()
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn query(&self) -> &SchemaObject {
        &self.query
    }

    pub fn mutation(&self) -> Option<&SchemaObject> {
        self.mutation.as_ref()
    }

    pub fn subscription(&self) -> Option<&SchemaObject> {
        self.subscription.as_ref()
    }

    pub(crate) fn root(&self, kind: OperationKind) -> Option<&SchemaObject> {
        match kind {
            OperationKind::Query => Some(&self.query),
            OperationKind::Mutation => self.mutation.as_ref(),
            OperationKind::Subscription => self.subscription.as_ref(),
        }
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    pub fn input_object(&self, name: &str) -> Option<&InputObjectType> {
        self.input_types.get(name)
    }

    pub fn scalars(&self) -> &ScalarRegistry {
        &self.scalars
    }

    /// Whether `maybe_subtype` is an object type implementing the interface
    /// or member of the union `abstract_type`.
    pub(crate) fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.implementers
            .get(abstract_type)
            .map(|implementers| implementers.contains(maybe_subtype))
            .unwrap_or(false)
    }

    /// Combines two schemas.
    ///
    /// Root objects are merged field by field and the type registries are
    /// unioned. Whenever both sides define the same field or type, `self` wins.
    pub fn merge(self, other: Schema) -> Schema {
        let Schema {
            query,
            mutation,
            subscription,
            mut enums,
            mut input_types,
            mut implementers,
            mut scalars,
        } = self;

        for (name, enum_type) in other.enums {
            if enums.contains_key(&name) {
                tracing::warn!(enum_type = %name, "enum defined twice, keeping the first definition");
                continue;
            }
            enums.insert(name, enum_type);
        }
        for (name, input_type) in other.input_types {
            if input_types.contains_key(&name) {
                tracing::warn!(
                    input_type = %name,
                    "input type defined twice, keeping the first definition"
                );
                continue;
            }
            input_types.insert(name, input_type);
        }
        for (name, members) in other.implementers {
            implementers.entry(name).or_default().extend(members);
        }
        scalars.merge(other.scalars);

        Schema {
            query: query.merge(other.query),
            mutation: merge_roots(mutation, other.mutation),
            subscription: merge_roots(subscription, other.subscription),
            enums,
            input_types,
            implementers,
            scalars,
        }
    }
}

fn merge_roots(left: Option<SchemaObject>, right: Option<SchemaObject>) -> Option<SchemaObject> {
    match (left, right) {
        (Some(left), Some(right)) => Some(left.merge(right)),
        (left, right) => left.or(right),
    }
}

impl Add for Schema {
    type Output = Schema;

    fn add(self, other: Schema) -> Schema {
        self.merge(other)
    }
}

/// Builds a [`Schema`] piece by piece.
#[derive(Default)]
pub struct SchemaBuilder {
    query: Option<SchemaObject>,
    mutation: Option<SchemaObject>,
    subscription: Option<SchemaObject>,
    enums: HashMap<String, EnumType>,
    input_types: HashMap<String, InputObjectType>,
    implementers: HashMap<String, IndexSet<String>>,
    scalars: ScalarRegistry,
}

impl SchemaBuilder {
    pub fn query(mut self, query: SchemaObject) -> Self {
        self.query = Some(query);
        self
    }

    pub fn mutation(mut self, mutation: SchemaObject) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn subscription(mut self, subscription: SchemaObject) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn enum_type<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.enums.entry(name.clone()).or_insert_with(|| EnumType {
            name,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn input_object(mut self, input_type: InputObjectType) -> Self {
        self.input_types
            .entry(input_type.name.clone())
            .or_insert(input_type);
        self
    }

    /// Declares the object types implementing an interface, or the members
    /// of a union.
    pub fn implementers<I, S>(mut self, abstract_type: impl Into<String>, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implementers
            .entry(abstract_type.into())
            .or_default()
            .extend(objects.into_iter().map(Into::into));
        self
    }

    pub fn scalar(mut self, name: impl Into<String>, codec: impl ScalarCodec) -> Self {
        self.scalars.register(name, codec);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            query: self
                .query
                .unwrap_or_else(|| SchemaObject::new(OperationKind::Query.to_string())),
            mutation: self.mutation,
            subscription: self.subscription,
            enums: self.enums,
            input_types: self.input_types,
            implementers: self.implementers,
            scalars: self.scalars,
        }
    }
}
