use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream;
use futures::FutureExt;
use futures::StreamExt;
use indexmap::IndexMap;
use tracing_futures::Instrument;

use crate::error::FieldError;
use crate::execution::collect_fields::collect_fields;
use crate::execution::collect_fields::CollectedField;
use crate::execution::input_coercion::coerce_arguments;
use crate::execution::resolver::FieldResolver;
use crate::execution::resolver::ResolvedValue;
use crate::execution::resolver::ResolverNode;
use crate::execution::resolver::SchemaObject;
use crate::execution::result_coercion::complete_leaf;
use crate::graphql::Error;
use crate::json_ext::Path;
use crate::spec::Field;
use crate::spec::FieldType;
use crate::spec::Query;
use crate::spec::Schema;
use crate::spec::Selection;
use crate::spec::TYPENAME;
use crate::value::Object;
use crate::value::Value;
use crate::value::Variables;

/// Everything one execution of an operation reads from.
#[derive(Clone, Debug)]
pub(crate) struct ExecutionContext {
    pub(crate) schema: Arc<Schema>,
    pub(crate) query: Arc<Query>,
    /// Request variables, completed with the operation's defaults.
    pub(crate) variables: Arc<Variables>,
    pub(crate) max_concurrency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    /// Allowed to resolve fields in any order, including in parallel
    Normal,
    /// Top-level fields of a mutation operation must be executed in order
    Sequential,
}

/// The completed value of one field and the errors raised below it.
#[derive(Debug, Default)]
pub(crate) struct FieldOutcome {
    pub(crate) value: Value,
    pub(crate) errors: Vec<Error>,
    /// Set when the field itself failed and was replaced by null.
    pub(crate) failed: bool,
}

impl FieldOutcome {
    fn value(value: Value) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    pub(crate) fn failure(error: FieldError, path: Path, field: &Field) -> Self {
        tracing::debug!(%path, %error, "field failed");
        Self {
            value: Value::Null,
            errors: vec![error.to_graphql_error(path, field.location.as_ref())],
            failed: true,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SelectionSetOutcome {
    pub(crate) object: Object,
    pub(crate) errors: Vec<Error>,
    /// How many fields of this selection set failed.
    pub(crate) failed_fields: usize,
}

impl ExecutionContext {
    fn concurrency(&self, mode: ExecutionMode) -> usize {
        match mode {
            ExecutionMode::Normal => self.max_concurrency.max(1),
            ExecutionMode::Sequential => 1,
        }
    }

    pub(crate) fn collect_fields<'a>(
        &'a self,
        runtime_type: Option<&str>,
        selection_set: impl IntoIterator<Item = &'a Selection>,
    ) -> IndexMap<&'a str, CollectedField<'a>> {
        collect_fields(
            &self.schema,
            &self.query.fragments,
            &self.variables,
            runtime_type,
            selection_set,
        )
    }
}

/// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
///
/// Fields are resolved concurrently (one at a time in
/// [`ExecutionMode::Sequential`]) and reassembled in selection order.
pub(crate) fn execute_selection_set<'a>(
    ctx: &'a ExecutionContext,
    object: &'a SchemaObject,
    path: &'a Path,
    mode: ExecutionMode,
    selection_set: Vec<&'a Selection>,
) -> BoxFuture<'a, SelectionSetOutcome> {
    async move {
        let fields = ctx.collect_fields(Some(object.type_name()), selection_set);
        let outcomes = stream::iter(fields.into_iter().map(|(response_key, collected)| {
            execute_field(ctx, object, collected, path.join(response_key))
                .map(move |outcome| (response_key, outcome))
        }).collect::<Vec<_>>())
        .buffered(ctx.concurrency(mode))
        .collect::<Vec<_>>()
        .await;

        let mut completed = SelectionSetOutcome {
            object: Object::with_capacity(outcomes.len()),
            ..Default::default()
        };
        for (response_key, mut outcome) in outcomes {
            if outcome.failed {
                completed.failed_fields += 1;
            }
            completed.errors.append(&mut outcome.errors);
            completed
                .object
                .insert(response_key.to_string(), outcome.value);
        }
        completed
    }
    .boxed()
}

/// Finds the resolver of `field` on `object` and runs it on the coerced
/// arguments.
pub(crate) fn resolve_field<'a>(
    ctx: &ExecutionContext,
    object: &'a SchemaObject,
    field: &Field,
    path: &Path,
) -> Result<(&'a FieldResolver, ResolverNode), FieldOutcome> {
    let Some(resolver) = object.get(&field.name) else {
        return Err(FieldOutcome::failure(
            FieldError::InvalidField {
                field: field.name.clone(),
                type_name: object.type_name().to_string(),
            },
            path.clone(),
            field,
        ));
    };
    let arguments = coerce_arguments(
        &ctx.schema,
        &ctx.variables,
        resolver.argument_definitions(),
        field,
    )
    .map_err(|(argument, reason)| {
        FieldOutcome::failure(
            FieldError::InvalidArgument { argument, reason },
            path.clone(),
            field,
        )
    })?;
    Ok((resolver, resolver.resolve(arguments)))
}

/// <https://spec.graphql.org/October2021/#ExecuteField()>
fn execute_field<'a>(
    ctx: &'a ExecutionContext,
    object: &'a SchemaObject,
    collected: CollectedField<'a>,
    path: Path,
) -> BoxFuture<'a, FieldOutcome> {
    async move {
        let field = collected.field;
        if field.name == TYPENAME {
            return FieldOutcome::value(Value::from(object.type_name()));
        }
        match resolve_field(ctx, object, field, &path) {
            Ok((resolver, node)) => complete_node(ctx, resolver.ty(), node, &collected, path).await,
            Err(outcome) => outcome,
        }
    }
    .boxed()
}

/// Runs the effect of `node`, if any, then completes its value.
fn complete_node<'a>(
    ctx: &'a ExecutionContext,
    ty: &'a FieldType,
    node: ResolverNode,
    collected: &'a CollectedField<'a>,
    path: Path,
) -> BoxFuture<'a, FieldOutcome> {
    async move {
        let field = collected.field;
        let resolved = match node {
            ResolverNode::Pure(resolved) => resolved,
            ResolverNode::Effect(effect) => {
                let span = tracing::debug_span!("effect", field = %field.name, %path);
                match effect.instrument(span).await {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        return FieldOutcome::failure(
                            FieldError::EffectFailure(Arc::from(error)),
                            path,
                            field,
                        )
                    }
                }
            }
            ResolverNode::Stream(_) => {
                return FieldOutcome::failure(
                    FieldError::StreamNotAllowed(field.name.clone()),
                    path,
                    field,
                )
            }
        };
        complete_value(ctx, ty, resolved, collected, path).await
    }
    .boxed()
}

/// <https://spec.graphql.org/October2021/#CompleteValue()>
///
/// Errors below this field do not null it: only the failing descendant is
/// replaced by null.
pub(crate) fn complete_value<'a>(
    ctx: &'a ExecutionContext,
    ty: &'a FieldType,
    resolved: ResolvedValue,
    collected: &'a CollectedField<'a>,
    path: Path,
) -> BoxFuture<'a, FieldOutcome> {
    async move {
        match resolved {
            ResolvedValue::Leaf(value) if collected.has_selection_set() => {
                let mut errors = Vec::new();
                let value = project(
                    ctx,
                    value,
                    ty.inner_type_name(),
                    &collected.selection_set,
                    &path,
                    &mut errors,
                );
                FieldOutcome {
                    value,
                    errors,
                    failed: false,
                }
            }
            ResolvedValue::Leaf(value) => FieldOutcome::value(complete_leaf(&ctx.schema, ty, value)),
            ResolvedValue::Object(object) => {
                if !collected.has_selection_set() {
                    return FieldOutcome::failure(
                        FieldError::MissingSelection {
                            field: collected.field.name.clone(),
                            type_name: object.type_name().to_string(),
                        },
                        path,
                        collected.field,
                    );
                }
                let completed = execute_selection_set(
                    ctx,
                    &object,
                    &path,
                    ExecutionMode::Normal,
                    collected.selection_set.clone(),
                )
                .await;
                FieldOutcome {
                    value: Value::Object(completed.object),
                    errors: completed.errors,
                    failed: false,
                }
            }
            ResolvedValue::List(items) => {
                let item_type = ty.list_item_type().unwrap_or(ty);
                let outcomes = stream::iter(items.into_iter().enumerate().map(|(index, item)| {
                    complete_node(ctx, item_type, item, collected, path.join(index))
                }))
                .buffered(ctx.concurrency(ExecutionMode::Normal))
                .collect::<Vec<_>>()
                .await;

                let mut completed = FieldOutcome {
                    value: Value::Null,
                    errors: Vec::new(),
                    failed: false,
                };
                let mut values = Vec::with_capacity(outcomes.len());
                for mut outcome in outcomes {
                    values.push(outcome.value);
                    completed.errors.append(&mut outcome.errors);
                }
                completed.value = Value::List(values);
                completed
            }
        }
    }
    .boxed()
}

/// Applies a sub-selection to a record: an object value produced by a
/// resolver rather than a [`SchemaObject`]. Lists are projected item by
/// item and other values are kept as they are.
///
/// The runtime type of a record is its `__typename` entry, falling back to
/// `type_name`. Nested records only have a type when they carry a
/// `__typename`.
///
/// Record entries have no declared type, so their leaves are copied as the
/// resolver wrote them: no scalar codec runs and integer IDs stay integers.
fn project(
    ctx: &ExecutionContext,
    value: Value,
    type_name: Option<&str>,
    selection_set: &[&Selection],
    path: &Path,
    errors: &mut Vec<Error>,
) -> Value {
    match value {
        Value::Object(record) => {
            let runtime_type = record
                .get(TYPENAME)
                .and_then(Value::as_str)
                .or(type_name);
            let fields = ctx.collect_fields(runtime_type, selection_set.iter().copied());
            let mut projected = Object::with_capacity(fields.len());
            for (response_key, collected) in fields {
                let field = collected.field;
                let value = if field.name == TYPENAME {
                    runtime_type.map(Value::from).unwrap_or_default()
                } else {
                    match record.get(&field.name) {
                        Some(value) if collected.has_selection_set() => project(
                            ctx,
                            value.clone(),
                            None,
                            &collected.selection_set,
                            &path.join(response_key),
                            errors,
                        ),
                        Some(value) => value.clone(),
                        None => {
                            let mut outcome = FieldOutcome::failure(
                                FieldError::InvalidField {
                                    field: field.name.clone(),
                                    type_name: runtime_type.unwrap_or("Object").to_string(),
                                },
                                path.join(response_key),
                                field,
                            );
                            errors.append(&mut outcome.errors);
                            outcome.value
                        }
                    }
                };
                projected.insert(response_key.to_string(), value);
            }
            Value::Object(projected)
        }
        Value::List(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    project(
                        ctx,
                        item,
                        type_name,
                        selection_set,
                        &path.join(index),
                        errors,
                    )
                })
                .collect(),
        ),
        other => other,
    }
}
