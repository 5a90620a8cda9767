//! Query parsing.
//!
//! Parsing is delegated to `apollo-compiler`; the resulting document is then
//! lowered into the [`Operation`]s, [`Selection`]s and [`Fragments`] the
//! execution engine walks.

use apollo_compiler::ast;
use apollo_compiler::parser::Parser;
use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Configuration;
use crate::error::OperationSelectionError;
use crate::spec::selection::input_value_from_ast;
use crate::spec::Fragments;
use crate::spec::Selection;
use crate::spec::SpecError;
use crate::value::InputValue;
use crate::value::Variables;

/// A parsed GraphQL document.
#[derive(Debug)]
pub struct Query {
    pub(crate) fragments: Fragments,
    pub(crate) operations: Vec<Operation>,
}

/// The three kinds of operation. Displays as the matching root type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Query
    Query,
    /// Mutation
    Mutation,
    /// Subscription
    Subscription,
}

impl From<ast::OperationType> for OperationKind {
    fn from(operation_type: ast::OperationType) -> Self {
        match operation_type {
            ast::OperationType::Query => OperationKind::Query,
            ast::OperationType::Mutation => OperationKind::Mutation,
            ast::OperationType::Subscription => OperationKind::Subscription,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Operation {
    pub(crate) name: Option<String>,
    pub(crate) kind: OperationKind,
    pub(crate) selection_set: Vec<Selection>,
    variables: Vec<(String, Option<InputValue>)>,
}

impl Query {
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn parse(
        query: impl Into<String>,
        configuration: &Configuration,
    ) -> Result<Self, SpecError> {
        let string = query.into();

        let mut parser = Parser::new()
            .recursion_limit(configuration.parser.recursion_limit)
            .token_limit(configuration.parser.token_limit);
        let result = parser.parse_ast(string.as_str(), "query.graphql");

        // Trace log recursion limit data
        let recursion_limit = parser.recursion_reached();
        tracing::trace!(?recursion_limit, "recursion limit data");

        let document = result.map_err(|invalid| {
            let errors = invalid.errors.to_string();
            failfast_debug!("parsing error(s): {}", errors);
            SpecError::ParsingError(errors)
        })?;

        let fragments = Fragments::from_ast(&document, &document.sources)?;

        let operations = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                ast::Definition::OperationDefinition(operation) => Some(operation),
                _ => None,
            })
            .map(|operation| Operation::from_ast(operation, &document))
            .collect::<Result<Vec<_>, SpecError>>()?;
        tracing::trace!(
            operations = operations.len(),
            fragments = fragments.len(),
            "lowered document"
        );

        Ok(Query {
            fragments,
            operations,
        })
    }

    /// Picks the operation to run.
    ///
    /// Without a name, the document must hold exactly one operation.
    pub(crate) fn operation(
        &self,
        operation_name: Option<&str>,
    ) -> Result<&Operation, OperationSelectionError> {
        match operation_name {
            Some(name) => self
                .operations
                .iter()
                .find(|operation| operation.name.as_deref() == Some(name))
                .ok_or_else(|| OperationSelectionError::UnknownOperation(name.to_string())),
            None => match self.operations.as_slice() {
                [] => Err(OperationSelectionError::NoOperation),
                [operation] => Ok(operation),
                operations => Err(OperationSelectionError::MissingOperationName(
                    operations.len(),
                )),
            },
        }
    }
}

impl Operation {
    fn from_ast(
        operation: &ast::OperationDefinition,
        document: &ast::Document,
    ) -> Result<Self, SpecError> {
        let variables = operation
            .variables
            .iter()
            .map(|variable| {
                let default_value = variable
                    .default_value
                    .as_ref()
                    .map(|value| input_value_from_ast(value))
                    .transpose()?;
                Ok((variable.name.as_str().to_owned(), default_value))
            })
            .collect::<Result<Vec<_>, SpecError>>()?;

        Ok(Operation {
            name: operation.name.as_ref().map(|name| name.as_str().to_owned()),
            kind: operation.operation_type.into(),
            selection_set: Selection::lower_set(&operation.selection_set, &document.sources, 0)?,
            variables,
        })
    }

    /// The request variables completed with the defaults this operation
    /// declares for the ones left out.
    pub(crate) fn variables_with_defaults(&self, mut variables: Variables) -> Variables {
        for (name, default_value) in &self.variables {
            if let Some(default_value) = default_value {
                variables
                    .entry(name.clone())
                    .or_insert_with(|| default_value.clone());
            }
        }
        variables
    }
}
