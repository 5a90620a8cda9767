//! The executable side of GraphQL: lowered operations, fragments and
//! selection sets, plus the schema they run against.

pub(crate) mod field_type;
mod fragments;
pub(crate) mod query;
pub(crate) mod schema;
mod selection;

use displaydoc::Display;
pub(crate) use field_type::FieldType;
pub(crate) use fragments::*;
pub(crate) use query::Query;
pub(crate) use schema::Schema;
pub(crate) use selection::*;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::graphql::ErrorExtension;

pub(crate) const TYPENAME: &str = "__typename";

/// GraphQL parsing errors.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SpecError {
    /// selection processing recursion limit exceeded
    RecursionLimitExceeded,
    /// parsing error: {0}
    ParsingError(String),
    /// invalid literal '{0}'
    InvalidLiteral(String),
}

impl ErrorExtension for SpecError {
    fn extension_code(&self) -> String {
        match self {
            SpecError::RecursionLimitExceeded => "RECURSION_LIMIT_EXCEEDED",
            SpecError::ParsingError(_) => "PARSING_ERROR",
            SpecError::InvalidLiteral(_) => "PARSING_ERROR",
        }
        .to_string()
    }
}
