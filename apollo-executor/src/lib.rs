//! A GraphQL execution engine for code-first schemas.
//!
//! A [`Schema`] is a tree of resolvers: each root operation type is a
//! [`SchemaObject`] whose fields produce [`ResolverNode`]s. The [`Executor`]
//! parses an operation, walks its selection set against that tree and
//! assembles a [`Response`] (or a [`ResponseStream`] for subscriptions).

#![cfg_attr(feature = "failfast", allow(unreachable_code))]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

macro_rules! failfast_debug {
    ($($tokens:tt)+) => {{
        tracing::debug!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

macro_rules! failfast_error {
    ($($tokens:tt)+) => {{
        tracing::error!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

pub mod json_ext;

mod configuration;
pub mod error;
mod execution;
mod executor;
pub mod graphql;
pub mod scalars;
mod spec;
mod value;

pub use crate::configuration::Configuration;
pub use crate::configuration::ConfigurationError;
pub use crate::configuration::generate_config_schema;
pub use crate::configuration::Execution as ExecutionConfiguration;
pub use crate::configuration::Parser as ParserConfiguration;
pub use crate::execution::input_coercion::coerce_variable_values;
pub use crate::execution::resolver::Arguments;
pub use crate::execution::resolver::BoxError;
pub use crate::execution::resolver::FieldResolver;
pub use crate::execution::resolver::ResolvedValue;
pub use crate::execution::resolver::ResolverNode;
pub use crate::execution::resolver::SchemaObject;
pub use crate::executor::ExecutionResult;
pub use crate::executor::Executor;
pub use crate::graphql::Request;
pub use crate::graphql::Response;
pub use crate::graphql::ResponseStream;
pub use crate::spec::field_type::FieldType;
pub use crate::spec::query::OperationKind;
pub use crate::spec::query::Query;
pub use crate::spec::schema::EnumType;
pub use crate::spec::schema::InputField;
pub use crate::spec::schema::InputObjectType;
pub use crate::spec::schema::Schema;
pub use crate::spec::schema::SchemaBuilder;
pub use crate::spec::SpecError;
pub use crate::value::InputValue;
pub use crate::value::Object;
pub use crate::value::Value;
pub use crate::value::Variables;
