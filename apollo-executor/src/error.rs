//! Execution errors.
//!
//! Two families: [`RequestError`]s abort the whole request and produce a
//! response without data, while [`FieldError`]s null out one field and are
//! reported next to the partial data.
use std::sync::Arc;

use displaydoc::Display;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;
pub use crate::graphql::Error;
use crate::graphql::ErrorExtension;
use crate::graphql::Location;
use crate::graphql::Response;
use crate::json_ext::Path;
use crate::spec::query::OperationKind;
pub use crate::spec::SpecError;

/// A value could not be converted to the type expected at its position.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoercionError {
    /// expected a value of type '{expected}', found {found}
    InvalidValue {
        /// The expected type.
        expected: String,
        /// The offending value.
        found: String,
    },

    /// null value found for non-null type '{0}'
    NullValue(String),

    /// '{value}' is not a value of enum '{enum_type}'
    InvalidEnumValue {
        /// The enum type.
        enum_type: String,
        /// The offending value.
        value: String,
    },

    /// missing required field '{field}' in input object '{input_type}'
    MissingField {
        /// The input object type.
        input_type: String,
        /// The missing field.
        field: String,
    },

    /// field '{field}' is not defined by input object '{input_type}'
    UnknownField {
        /// The input object type.
        input_type: String,
        /// The undeclared field.
        field: String,
    },

    /// invalid value for scalar '{scalar}': {reason}
    InvalidScalar {
        /// The custom scalar.
        scalar: String,
        /// Why the codec refused the value.
        reason: String,
    },

    /// unknown input type '{0}'
    UnknownType(String),

    /// variable '${0}' is referenced from a variable value
    NestedVariable(String),
}

/// A failure local to one field. The field resolves to null and the error is
/// reported with the field's path.
#[derive(Error, Display, Debug, Clone)]
#[non_exhaustive]
pub enum FieldError {
    /// Effect failure
    EffectFailure(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// invalid value for argument '{argument}': {reason}
    InvalidArgument {
        /// The argument name.
        argument: String,
        /// The coercion failure.
        reason: CoercionError,
    },

    /// cannot query field '{field}' on type '{type_name}'
    InvalidField {
        /// The requested field.
        field: String,
        /// The runtime type it was requested on.
        type_name: String,
    },

    /// field '{field}' of type '{type_name}' must have a selection of subfields
    MissingSelection {
        /// The field name.
        field: String,
        /// The object type it resolved to.
        type_name: String,
    },

    /// field '{0}' resolved to a stream outside of a subscription root
    StreamNotAllowed(String),
}

impl ErrorExtension for FieldError {
    fn extension_code(&self) -> String {
        match self {
            FieldError::EffectFailure(_) => "EFFECT_FAILURE",
            FieldError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            FieldError::InvalidField { .. } => "INVALID_FIELD",
            FieldError::MissingSelection { .. } => "INVALID_SELECTION",
            FieldError::StreamNotAllowed(_) => "STREAM_NOT_ALLOWED",
        }
        .to_string()
    }
}

impl FieldError {
    /// Convert the field error to a GraphQL error located at `path`.
    pub(crate) fn to_graphql_error(&self, path: Path, location: Option<&Location>) -> Error {
        let mut error = Error::builder()
            .message(self.to_string())
            .path(path)
            .extension_code(self.extension_code())
            .locations(location.cloned().into_iter().collect::<Vec<_>>())
            .build();
        if let FieldError::EffectFailure(cause) = self {
            error = error.with_cause(cause.clone());
        }
        error
    }
}

/// The operation to run could not be picked from the document.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationSelectionError {
    /// the document does not contain any operation
    NoOperation,

    /// an operation name is required when the document contains {0} operations
    MissingOperationName(usize),

    /// unknown operation named "{0}"
    UnknownOperation(String),

    /// the schema does not define a {0} root type
    UnsupportedOperation(OperationKind),
}

impl ErrorExtension for OperationSelectionError {
    fn extension_code(&self) -> String {
        match self {
            OperationSelectionError::NoOperation
            | OperationSelectionError::MissingOperationName(_) => "OPERATION_NAME_REQUIRED",
            OperationSelectionError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            OperationSelectionError::UnsupportedOperation(_) => "OPERATION_NOT_SUPPORTED",
        }
        .to_string()
    }
}

/// A subscription could not be turned into a stream of responses.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreamSetupError {
    /// subscription operations must select exactly one root field, found {0}
    RootFieldCount(usize),

    /// subscription root field '{0}' does not resolve to a stream
    NotAStream(String),
}

impl ErrorExtension for StreamSetupError {
    fn extension_code(&self) -> String {
        match self {
            StreamSetupError::RootFieldCount(_) => "INVALID_SUBSCRIPTION",
            StreamSetupError::NotAStream(_) => "SUBSCRIPTION_NOT_STREAM",
        }
        .to_string()
    }
}

/// Errors that abort a request before any data is produced.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequestError {
    /// {0}
    Spec(#[from] SpecError),

    /// {0}
    OperationSelection(#[from] OperationSelectionError),

    /// {0}
    StreamSetup(#[from] StreamSetupError),
}

impl ErrorExtension for RequestError {
    fn extension_code(&self) -> String {
        match self {
            RequestError::Spec(error) => error.extension_code(),
            RequestError::OperationSelection(error) => error.extension_code(),
            RequestError::StreamSetup(error) => error.extension_code(),
        }
    }
}

impl RequestError {
    pub fn to_graphql_error(&self) -> Error {
        Error::builder()
            .message(self.to_string())
            .extension_code(self.extension_code())
            .build()
    }

    /// A response carrying this error and no data.
    pub fn to_response(&self) -> Response {
        Response {
            data: None,
            errors: vec![self.to_graphql_error()],
            ..Response::default()
        }
    }
}
