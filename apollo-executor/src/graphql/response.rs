use serde::Serialize;

use crate::graphql::Error;
use crate::json_ext::JsonObject;
use crate::value::Value;

/// A GraphQL primary response.
///
/// The error type is a parameter so that callers can rewrite errors into
/// their own representation with [`Response::map_error`] before sending.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Response<E = Error> {
    /// The response data. Absent when the request failed before execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<E>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "JsonObject::is_empty")]
    pub extensions: JsonObject,
}

impl<E> Default for Response<E> {
    fn default() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
            extensions: JsonObject::new(),
        }
    }
}

impl<E> Response<E> {
    pub fn new(data: Option<Value>, errors: Vec<E>) -> Self {
        Self {
            data,
            errors,
            extensions: JsonObject::new(),
        }
    }

    /// Rewrites every error, leaving data and extensions untouched.
    pub fn map_error<F, E2>(self, f: F) -> Response<E2>
    where
        F: FnMut(E) -> E2,
    {
        Response {
            data: self.data,
            errors: self.errors.into_iter().map(f).collect(),
            extensions: self.extensions,
        }
    }
}
