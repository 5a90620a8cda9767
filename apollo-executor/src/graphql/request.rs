use std::collections::HashMap;

use serde::Deserialize;

use crate::value::InputValue;
use crate::value::Variables;

/// A GraphQL `Request`, as handed over by the transport.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Request {
    /// The GraphQL operation (e.g., query, mutation) string.
    pub query: String,

    /// The (optional) GraphQL operation name.
    ///
    /// When specified, this name must match the name of an operation in the
    /// GraphQL document.  When excluded, there must exist only a single
    /// operation in the GraphQL document.
    #[serde(default)]
    pub operation_name: Option<String>,

    /// The raw GraphQL variables. They are coerced where the operation uses
    /// them.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub variables: Variables,
}

// NOTE: this deserialize helper is used to transform `null` to Default::default()
fn deserialize_null_default<'de, D, T: Default + Deserialize<'de>>(
    deserializer: D,
) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<T>>::deserialize(deserializer).map(|x| x.unwrap_or_default())
}

#[buildstructor::buildstructor]
impl Request {
    #[builder(visibility = "pub")]
    fn new(
        query: String,
        operation_name: Option<String>,
        // Skip the `Variables` type alias in order to use buildstructor's map special-casing
        variables: HashMap<String, InputValue>,
    ) -> Self {
        Self {
            query,
            operation_name,
            variables,
        }
    }
}
