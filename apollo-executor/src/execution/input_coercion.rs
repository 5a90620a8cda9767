//! Input coercion: turns argument literals and variable values into the
//! [`Value`]s resolvers receive.
//!
//! Variables are substituted where they are used, so a variable of the wrong
//! shape only fails the field that references it.

use indexmap::IndexMap;

use crate::error::CoercionError;
use crate::execution::resolver::ArgumentDefinition;
use crate::execution::resolver::Arguments;
use crate::spec::Field;
use crate::spec::FieldType;
use crate::spec::Schema;
use crate::value::InputValue;
use crate::value::Object;
use crate::value::Value;
use crate::value::Variables;

static NULL: InputValue = InputValue::Null;

/// Coerces the arguments written on `field` against its argument
/// definitions, in definition order.
///
/// Arguments that are not defined are ignored. Omitted arguments take their
/// default value, or null when they have none.
pub(crate) fn coerce_arguments(
    schema: &Schema,
    variables: &Variables,
    definitions: &[ArgumentDefinition],
    field: &Field,
) -> Result<Arguments, (String, CoercionError)> {
    let mut arguments = Arguments::with_capacity(definitions.len());
    for definition in definitions {
        let value = field
            .argument(&definition.name)
            // an unset variable counts as an omitted argument
            .filter(|value| !is_unset_variable(value, variables));
        let coerced = match (value, &definition.default_value) {
            (Some(value), _) => coerce_input_value(schema, variables, &definition.ty, value),
            (None, Some(default_value)) => Ok(default_value.clone()),
            (None, None) => coerce_input_value(schema, variables, &definition.ty, &NULL),
        }
        .map_err(|error| (definition.name.clone(), error))?;
        arguments.insert(definition.name.clone(), coerced);
    }
    Ok(arguments)
}

fn is_unset_variable(value: &InputValue, variables: &Variables) -> bool {
    matches!(value, InputValue::Variable(name) if !variables.contains_key(name))
}

/// <https://spec.graphql.org/October2021/#sec-Input-Values>
pub(crate) fn coerce_input_value(
    schema: &Schema,
    variables: &Variables,
    ty: &FieldType,
    value: &InputValue,
) -> Result<Value, CoercionError> {
    let value = resolve_variable(value, variables)?;

    match (ty, value) {
        (FieldType::NonNull(_), InputValue::Null) => Err(CoercionError::NullValue(ty.to_string())),
        (FieldType::NonNull(inner), value) => coerce_input_value(schema, variables, inner, value),
        // NOTE: graphql's types are all optional by default
        (_, InputValue::Null) => Ok(Value::Null),
        (FieldType::List(inner), InputValue::List(items)) => items
            .iter()
            .map(|item| coerce_input_value(schema, variables, inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        // For coercion from single value to list
        (FieldType::List(inner), value) => {
            coerce_input_value(schema, variables, inner, value).map(|item| Value::List(vec![item]))
        }
        (FieldType::Named(name), value) => coerce_named(schema, variables, name, value),
        (builtin, value) => coerce_builtin_scalar(builtin, value),
    }
}

fn resolve_variable<'a>(
    value: &'a InputValue,
    variables: &'a Variables,
) -> Result<&'a InputValue, CoercionError> {
    match value {
        InputValue::Variable(name) => match variables.get(name) {
            Some(InputValue::Variable(nested)) => Err(CoercionError::NestedVariable(nested.clone())),
            Some(value) => Ok(value),
            None => Ok(&NULL),
        },
        value => Ok(value),
    }
}

/// Coerces a value to one of the built-in scalars.
///
/// `Float` accepts integers, `ID` accepts strings and integers and always
/// produces a string.
pub(crate) fn coerce_builtin_scalar(
    ty: &FieldType,
    value: &InputValue,
) -> Result<Value, CoercionError> {
    let invalid = || CoercionError::InvalidValue {
        expected: ty.to_string(),
        found: value.to_string(),
    };
    match (ty, value) {
        (FieldType::NonNull(inner), value) => coerce_builtin_scalar(inner, value),
        (_, InputValue::Null) => Ok(Value::Null),
        (FieldType::String, InputValue::String(s)) => Ok(Value::String(s.clone())),
        // Spec: https://spec.graphql.org/June2018/#sec-Int
        (FieldType::Int, InputValue::Int(i)) if i32::try_from(*i).is_ok() => Ok(Value::Int(*i)),
        // Spec: https://spec.graphql.org/draft/#sec-Float.Input-Coercion
        (FieldType::Float, InputValue::Float(f)) if f.is_finite() => Ok(Value::Float(*f)),
        (FieldType::Float, InputValue::Int(i)) => Ok(Value::Float(*i as f64)),
        (FieldType::Boolean, InputValue::Boolean(b)) => Ok(Value::Boolean(*b)),
        (FieldType::Id, InputValue::String(s)) => Ok(Value::String(s.clone())),
        (FieldType::Id, InputValue::Int(i)) => Ok(Value::String(i.to_string())),
        _ => Err(invalid()),
    }
}

fn coerce_named(
    schema: &Schema,
    variables: &Variables,
    name: &str,
    value: &InputValue,
) -> Result<Value, CoercionError> {
    if let Some(codec) = schema.scalars.get(name) {
        return codec
            .decode(value.to_value(variables))
            .map_err(|reason| CoercionError::InvalidScalar {
                scalar: name.to_string(),
                reason,
            });
    }

    if let Some(enum_type) = schema.enums.get(name) {
        // Variables carry enum values as strings
        return match value {
            InputValue::Enum(member) | InputValue::String(member)
                if enum_type.values.contains(member) =>
            {
                Ok(Value::Enum(member.clone()))
            }
            value => Err(CoercionError::InvalidEnumValue {
                enum_type: name.to_string(),
                value: value.to_string(),
            }),
        };
    }

    let Some(input_type) = schema.input_types.get(name) else {
        return Err(CoercionError::UnknownType(name.to_string()));
    };
    let InputValue::Object(fields) = value else {
        return Err(CoercionError::InvalidValue {
            expected: name.to_string(),
            found: value.to_string(),
        });
    };

    if let Some(unknown) = fields
        .keys()
        .find(|field_name| !input_type.fields.contains_key(*field_name))
    {
        return Err(CoercionError::UnknownField {
            input_type: name.to_string(),
            field: unknown.clone(),
        });
    }

    let mut object = Object::with_capacity(input_type.fields.len());
    for (field_name, field) in &input_type.fields {
        let supplied = fields
            .get(field_name)
            .filter(|value| !is_unset_variable(value, variables));
        let coerced = match (supplied, &field.default_value) {
            (Some(value), _) => coerce_input_value(schema, variables, &field.ty, value)?,
            (None, Some(default_value)) => default_value.clone(),
            (None, None) if field.ty.is_non_null() => {
                return Err(CoercionError::MissingField {
                    input_type: name.to_string(),
                    field: field_name.clone(),
                })
            }
            (None, None) => Value::Null,
        };
        object.insert(field_name.clone(), coerced);
    }
    Ok(Value::Object(object))
}

/// Turns raw request variables into [`Value`]s of the given types, for hosts
/// that want to check variables up front.
pub fn coerce_variable_values(
    schema: &Schema,
    definitions: &IndexMap<String, FieldType>,
    variables: &Variables,
) -> Result<Object, (String, CoercionError)> {
    definitions
        .iter()
        .map(|(name, ty)| {
            let value = variables.get(name).unwrap_or(&NULL);
            coerce_input_value(schema, variables, ty, value)
                .map(|value| (name.clone(), value))
                .map_err(|error| (name.clone(), error))
        })
        .collect()
}
