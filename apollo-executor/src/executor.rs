//! The root dispatcher.

use std::ops::Add;
use std::sync::Arc;

use futures::stream;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::configuration::Configuration;
use crate::error::FieldError;
use crate::error::OperationSelectionError;
use crate::error::RequestError;
use crate::error::StreamSetupError;
use crate::execution::collect_fields::CollectedField;
use crate::execution::engine::complete_value;
use crate::execution::engine::execute_selection_set;
use crate::execution::engine::resolve_field;
use crate::execution::engine::ExecutionContext;
use crate::execution::engine::ExecutionMode;
use crate::execution::engine::FieldOutcome;
use crate::execution::resolver::BoxError;
use crate::execution::resolver::ResolvedValue;
use crate::execution::resolver::ResolverNode;
use crate::graphql::Request;
use crate::graphql::Response;
use crate::graphql::ResponseStream;
use crate::json_ext::Path;
use crate::spec::query::OperationKind;
use crate::spec::Field;
use crate::spec::FieldType;
use crate::spec::Query;
use crate::spec::Schema;
use crate::spec::Selection;
use crate::spec::TYPENAME;
use crate::value::Object;
use crate::value::Value;
use crate::value::Variables;

/// What executing a request produces: one response, or one response per
/// event for subscriptions.
pub enum ExecutionResult {
    Response(Response),
    Stream(ResponseStream),
}

impl ExecutionResult {
    /// The single response of a query or mutation.
    ///
    /// A subscription yields its first event's response, or a response
    /// without data if the stream ends without any event.
    pub async fn into_response(self) -> Response {
        match self {
            ExecutionResult::Response(response) => response,
            ExecutionResult::Stream(mut stream) => stream.next().await.unwrap_or_default(),
        }
    }

    /// Every result as a stream. A single response becomes a one-element
    /// stream.
    pub fn into_stream(self) -> ResponseStream {
        match self {
            ExecutionResult::Response(response) => stream::once(async { response }).boxed(),
            ExecutionResult::Stream(stream) => stream,
        }
    }
}

impl std::fmt::Debug for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionResult::Response(response) => {
                f.debug_tuple("Response").field(response).finish()
            }
            ExecutionResult::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Runs GraphQL operations against a [`Schema`].
///
/// Executors combine with `+` (or [`Executor::merge`]): the result serves the
/// fields of both, and the left operand wins on conflicts.
#[derive(Clone, Debug)]
pub struct Executor {
    schema: Arc<Schema>,
    configuration: Arc<Configuration>,
}

static_assertions::assert_impl_all!(Executor: Send, Sync);

impl Executor {
    pub fn new(schema: Schema) -> Self {
        Self::with_configuration(schema, Configuration::default())
    }

    pub fn with_configuration(schema: Schema, configuration: Configuration) -> Self {
        Self {
            schema: Arc::new(schema),
            configuration: Arc::new(configuration),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Merges the schemas of both executors. The configuration of `self` is
    /// kept.
    pub fn merge(self, other: Executor) -> Executor {
        let schema = Arc::unwrap_or_clone(self.schema).merge(Arc::unwrap_or_clone(other.schema));
        Executor {
            schema: Arc::new(schema),
            configuration: self.configuration,
        }
    }

    /// Parses the request's document and executes the selected operation.
    ///
    /// Request-level failures (parsing, operation selection, subscription
    /// shape) are returned as `Err`; [`RequestError::to_response`] turns them
    /// into a response without data.
    #[tracing::instrument(skip_all, level = "trace")]
    pub async fn execute(&self, request: Request) -> Result<ExecutionResult, RequestError> {
        let query = Query::parse(request.query, &self.configuration)?;
        self.execute_query(
            Arc::new(query),
            request.operation_name.as_deref(),
            request.variables,
        )
        .await
    }

    /// Like [`Executor::execute`], but request errors become a response.
    pub async fn execute_to_result(&self, request: Request) -> ExecutionResult {
        self.execute(request)
            .await
            .unwrap_or_else(|error| ExecutionResult::Response(error.to_response()))
    }

    /// Executes an operation of an already parsed document.
    #[tracing::instrument(skip_all, level = "trace", fields(operation_name = tracing::field::Empty))]
    pub async fn execute_query(
        &self,
        query: Arc<Query>,
        operation_name: Option<&str>,
        variables: Variables,
    ) -> Result<ExecutionResult, RequestError> {
        let operation = query.operation(operation_name)?;
        tracing::Span::current().record("operation_name", operation.name.as_deref());
        let kind = operation.kind;
        if self.schema.root(kind).is_none() {
            return Err(OperationSelectionError::UnsupportedOperation(kind).into());
        }

        let variables = operation.variables_with_defaults(variables);
        let selection_set = operation.selection_set.clone();
        let ctx = ExecutionContext {
            schema: self.schema.clone(),
            query,
            variables: Arc::new(variables),
            max_concurrency: self.configuration.execution.max_concurrency,
        };

        match kind {
            OperationKind::Subscription => {
                execute_subscription(ctx, &selection_set).map(ExecutionResult::Stream)
            }
            OperationKind::Query | OperationKind::Mutation => {
                let mode = if kind == OperationKind::Mutation
                    && self.configuration.execution.serial_mutations
                {
                    ExecutionMode::Sequential
                } else {
                    ExecutionMode::Normal
                };
                Ok(ExecutionResult::Response(
                    execute_root(&ctx, kind, mode, &selection_set).await,
                ))
            }
        }
    }
}

impl Add for Executor {
    type Output = Executor;

    fn add(self, other: Executor) -> Executor {
        self.merge(other)
    }
}

async fn execute_root(
    ctx: &ExecutionContext,
    kind: OperationKind,
    mode: ExecutionMode,
    selection_set: &[Selection],
) -> Response {
    let Some(root) = ctx.schema.root(kind) else {
        failfast_error!("no root object for a {} operation", kind);
        return RequestError::from(OperationSelectionError::UnsupportedOperation(kind))
            .to_response();
    };
    let path = Path::empty();
    let completed =
        execute_selection_set(ctx, root, &path, mode, selection_set.iter().collect()).await;

    // Nothing to show when every root field failed
    let data = if completed.failed_fields > 0 && completed.failed_fields == completed.object.len()
    {
        Value::Null
    } else {
        Value::Object(completed.object)
    };
    Response::new(Some(data), completed.errors)
}

/// The root field of a subscription, owned so that every event can be
/// completed independently of the request.
struct SubscriptionField {
    field: Field,
    selection_set: Vec<Selection>,
    ty: FieldType,
}

impl SubscriptionField {
    fn collected(&self) -> CollectedField<'_> {
        CollectedField {
            field: &self.field,
            selection_set: self.selection_set.iter().collect(),
        }
    }
}

/// Wraps the outcome of the subscription root field into a response.
fn event_response(field: &Field, outcome: FieldOutcome) -> Response {
    let mut data = Object::with_capacity(1);
    data.insert(field.response_key().to_string(), outcome.value);
    Response::new(Some(Value::Object(data)), outcome.errors)
}

/// <https://spec.graphql.org/October2021/#CreateSourceEventStream()>
///
/// The source stream is dropped, and with it any resource it holds, as soon
/// as the response stream is dropped or an event fails.
fn execute_subscription(
    ctx: ExecutionContext,
    selection_set: &[Selection],
) -> Result<ResponseStream, RequestError> {
    let Some(root) = ctx.schema.subscription() else {
        return Err(
            OperationSelectionError::UnsupportedOperation(OperationKind::Subscription).into(),
        );
    };
    let fields = ctx.collect_fields(Some(root.type_name()), selection_set);
    if fields.len() != 1 {
        return Err(StreamSetupError::RootFieldCount(fields.len()).into());
    }
    let Some(collected) = fields.into_values().next() else {
        return Err(StreamSetupError::RootFieldCount(0).into());
    };
    let field = collected.field;
    if field.name == TYPENAME {
        return Err(StreamSetupError::NotAStream(field.name.clone()).into());
    }

    let path = Path::empty().join(field.response_key());
    let (resolver, node) = match resolve_field(&ctx, root, field, &path) {
        Ok(resolved) => resolved,
        // Bad arguments fail the only event rather than the request
        Err(outcome) => {
            let response = event_response(field, outcome);
            return Ok(stream::once(async { response }).boxed());
        }
    };
    let ResolverNode::Stream(events) = node else {
        return Err(StreamSetupError::NotAStream(field.name.clone()).into());
    };
    tracing::debug!(field = %field.name, "subscription started");

    let subscription = Arc::new(SubscriptionField {
        field: field.clone(),
        selection_set: collected.selection_set.into_iter().cloned().collect(),
        ty: resolver.ty().clone(),
    });

    Ok(until_first_error(events)
        .then(move |event| {
            let ctx = ctx.clone();
            let subscription = subscription.clone();
            async move {
                let path = Path::empty().join(subscription.field.response_key());
                let outcome = match event {
                    Ok(resolved) => {
                        let collected = subscription.collected();
                        complete_value(&ctx, &subscription.ty, resolved, &collected, path).await
                    }
                    Err(error) => FieldOutcome::failure(
                        FieldError::EffectFailure(Arc::from(error)),
                        path,
                        &subscription.field,
                    ),
                };
                event_response(&subscription.field, outcome)
            }
        })
        .boxed())
}

/// Ends the stream right after its first `Err` item, dropping the source.
fn until_first_error(
    events: BoxStream<'static, Result<ResolvedValue, BoxError>>,
) -> BoxStream<'static, Result<ResolvedValue, BoxError>> {
    stream::unfold(Some(events), |events| async move {
        let mut events = events?;
        let event = events.next().await?;
        let next = if event.is_ok() { Some(events) } else { None };
        Some((event, next))
    })
    .boxed()
}
