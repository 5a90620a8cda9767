use crate::spec::FieldType;
use crate::spec::Schema;
use crate::value::Value;

/// <https://spec.graphql.org/October2021/#sec-Scalars.Result-Coercion-and-Serialization>
///
/// Custom scalars go through their codec's `encode`. An `ID` produced as an
/// integer is serialized as a string. Anything else is returned unchanged.
pub(crate) fn complete_leaf(schema: &Schema, ty: &FieldType, value: Value) -> Value {
    match (ty, value) {
        (_, Value::Null) => Value::Null,
        (FieldType::NonNull(inner), value) => complete_leaf(schema, inner, value),
        (FieldType::List(inner), Value::List(items)) => Value::List(
            items
                .into_iter()
                .map(|item| complete_leaf(schema, inner, item))
                .collect(),
        ),
        // https://spec.graphql.org/October2021/#sec-ID.Result-Coercion
        (FieldType::Id, Value::Int(int)) => Value::String(int.to_string()),
        (FieldType::Named(name), value) => match schema.scalars.get(name) {
            Some(codec) => codec.encode(value),
            None => value,
        },
        (_, value) => value,
    }
}
