mod common;

use std::str::FromStr;

use apollo_executor::error::OperationSelectionError;
use apollo_executor::error::RequestError;
use apollo_executor::Configuration;
use apollo_executor::ExecutionResult;
use apollo_executor::Executor;
use apollo_executor::FieldResolver;
use apollo_executor::FieldType;
use apollo_executor::InputValue;
use apollo_executor::Request;
use apollo_executor::ResolverNode;
use apollo_executor::Schema;
use apollo_executor::SchemaObject;
use apollo_executor::SpecError;
use apollo_executor::Value;
use common::expanse;
use common::query;
use common::to_json;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

#[tokio::test]
async fn successful_documents_have_no_errors() {
    let response = query(&expanse(), "{ ship { name class crew { name origin } } }").await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "ship": {
                    "name": "Rocinante",
                    "class": "Corvette",
                    "crew": [
                        {"name": "James Holden", "origin": "EARTH"},
                        {"name": "Naomi Nagata", "origin": "BELT"},
                        {"name": "Amos Burton", "origin": "EARTH"},
                        {"name": "Alex Kamal", "origin": "MARS"}
                    ]
                }
            }
        })
    );
}

#[tokio::test]
async fn skip_and_include() {
    let executor = expanse();
    let document = r#"
        query ($withClass: Boolean!, $skipCrew: Boolean = true) {
            ship {
                name @skip(if: false)
                hidden: name @skip(if: true)
                class @include(if: $withClass)
                crew @skip(if: $skipCrew) { name }
            }
        }
    "#;

    let response = common::execute(
        &executor,
        Request::builder()
            .query(document)
            .variable("withClass", true)
            .build(),
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({"data": {"ship": {"name": "Rocinante", "class": "Corvette"}}})
    );

    let response = common::execute(
        &executor,
        Request::builder()
            .query(document)
            .variable("withClass", false)
            .variable("skipCrew", false)
            .build(),
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "ship": {
                    "name": "Rocinante",
                    "crew": [
                        {"name": "James Holden"},
                        {"name": "Naomi Nagata"},
                        {"name": "Amos Burton"},
                        {"name": "Alex Kamal"}
                    ]
                }
            }
        })
    );
}

#[tokio::test]
async fn skipping_every_subfield_leaves_an_empty_object() {
    let executor = expanse();
    let literal = query(
        &executor,
        "{ ship { name @skip(if: true) } roster { name @include(if: false) } }",
    )
    .await;
    assert_eq!(
        to_json(&literal),
        json!({"data": {"ship": {}, "roster": [{}, {}, {}, {}]}})
    );

    let variable = common::execute(
        &executor,
        Request::builder()
            .query(
                "query ($t: Boolean) { ship { name @skip(if: $t) } roster { name @include(if: false) } }",
            )
            .variable("t", true)
            .build(),
    )
    .await;
    assert_eq!(variable, literal);
}

#[tokio::test]
async fn a_single_value_is_accepted_for_a_list_argument() {
    let executor = expanse();
    let single = query(&executor, r#"{ characters(names: "Alex Kamal") { name } }"#).await;
    let list = query(&executor, r#"{ characters(names: ["Alex Kamal"]) { name } }"#).await;
    assert_eq!(single, list);
    assert_eq!(
        to_json(&single),
        json!({"data": {"characters": [{"name": "Alex Kamal"}]}})
    );
}

#[tokio::test]
async fn variables_resolve_like_literals() {
    let executor = expanse();
    let with_variable = common::execute(
        &executor,
        Request::builder()
            .query("query ($name: String!) { character(name: $name) { name origin nicknames } }")
            .variable("name", "Amos Burton")
            .build(),
    )
    .await;
    let with_literal = query(
        &executor,
        r#"{ character(name: "Amos Burton") { name origin nicknames } }"#,
    )
    .await;
    assert_eq!(with_variable, with_literal);
    assert_eq!(
        to_json(&with_literal),
        json!({
            "data": {
                "character": {"name": "Amos Burton", "origin": "EARTH", "nicknames": ["Timmy"]}
            }
        })
    );
}

#[tokio::test]
async fn variables_come_from_the_request_body() {
    let request: Request = serde_json_bytes::from_value(json!({
        "query": "query Martians($origin: Origin) { characters(origin: $origin) { name } }",
        "operationName": "Martians",
        "variables": {"origin": "MARS"}
    }))
    .unwrap();
    let response = common::execute(&expanse(), request).await;
    assert_eq!(
        to_json(&response),
        json!({"data": {"characters": [{"name": "Alex Kamal"}]}})
    );
}

#[tokio::test]
async fn missing_required_input_fields_fail_the_field() {
    let executor = expanse();
    let response = query(
        &executor,
        "{ search(filter: {origin: EARTH}) { name } ship { name } }",
    )
    .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("INVALID_ARGUMENT")
    );
    assert_eq!(
        to_json(&response)["data"],
        json!({"search": null, "ship": {"name": "Rocinante"}})
    );

    let response = query(
        &executor,
        r#"{ search(filter: {name: "Naomi Nagata"}) { name } }"#,
    )
    .await;
    assert!(response.errors.is_empty());
    assert_eq!(
        to_json(&response)["data"],
        json!({"search": [{"name": "Naomi Nagata"}]})
    );
}

#[tokio::test]
async fn nested_effect_failures_report_their_path() {
    fn object(type_name: &'static str, field: &'static str, resolver: FieldResolver) -> FieldResolver {
        FieldResolver::new(FieldType::named(type_name), move |_| {
            ResolverNode::object(SchemaObject::new(type_name).field(field, resolver.clone()))
        })
    }
    let c = FieldResolver::new(FieldType::Int, |_| {
        ResolverNode::effect(async { Err::<Value, _>("no signal from Tycho") })
    });
    let schema = Schema::builder()
        .query(SchemaObject::new("Query").field("a", object("A", "b", object("B", "c", c))))
        .build();

    let response = query(&Executor::new(schema), "{ a { b { c } } }").await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {"a": {"b": {"c": null}}},
            "errors": [{
                "message": "Effect failure",
                "locations": [{"line": 1, "column": 11}],
                "path": ["a", "b", "c"],
                "extensions": {"code": "EFFECT_FAILURE"}
            }]
        })
    );
}

#[tokio::test]
async fn merged_executors_expose_both_field_sets() {
    let names = || {
        Executor::new(
            Schema::builder()
                .query(SchemaObject::new("Query").field(
                    "name",
                    FieldResolver::new(FieldType::String, |_| ResolverNode::pure("Rocinante")),
                ))
                .build(),
        )
    };
    let ids = || {
        Executor::new(
            Schema::builder()
                .query(SchemaObject::new("Query").field(
                    "id",
                    FieldResolver::new(FieldType::Id, |_| ResolverNode::pure(42)),
                ))
                .build(),
        )
    };

    let expected = json!({"data": {"name": "Rocinante", "id": "42"}});
    let response = query(&(names() + ids()), "{ name id }").await;
    assert_eq!(to_json(&response), expected);
    let response = query(&(ids() + names()), "{ name id }").await;
    assert_eq!(to_json(&response), expected);
}

#[tokio::test]
async fn merged_field_conflicts_keep_the_left_operand() {
    let constant = |value: &'static str| {
        Executor::new(
            Schema::builder()
                .query(SchemaObject::new("Query").field(
                    "name",
                    FieldResolver::new(FieldType::String, move |_| ResolverNode::pure(value)),
                ))
                .build(),
        )
    };
    let merged = constant("left") + constant("right");
    assert_eq!(
        to_json(&query(&merged, "{ name }").await),
        json!({"data": {"name": "left"}})
    );
}

#[test_log::test(tokio::test)]
async fn subscriptions_emit_one_response_per_event() {
    let executor = expanse();
    let result = executor
        .execute(Request::builder().query("subscription { count }").build())
        .await
        .unwrap();
    let ExecutionResult::Stream(stream) = result else {
        panic!("expected a stream");
    };
    let responses = stream
        .map(|response| to_json(&response))
        .collect::<Vec<_>>()
        .await;
    assert_eq!(
        responses,
        vec![
            json!({"data": {"count": 1}}),
            json!({"data": {"count": 2}}),
            json!({"data": {"count": 3}}),
        ]
    );

    let responses = executor
        .execute(Request::builder().query("subscription { n: count(to: 1) }").build())
        .await
        .unwrap()
        .into_stream()
        .collect::<Vec<_>>()
        .await;
    assert_eq!(responses.len(), 1);
    assert_eq!(to_json(&responses[0]), json!({"data": {"n": 1}}));
}

#[tokio::test]
async fn subscription_argument_errors_end_the_stream() {
    let responses = expanse()
        .execute(Request::builder().query(r#"subscription { count(to: "three") }"#).build())
        .await
        .unwrap()
        .into_stream()
        .collect::<Vec<_>>()
        .await;
    assert_eq!(responses.len(), 1);
    assert_eq!(to_json(&responses[0])["data"], json!({"count": null}));
    assert_eq!(
        responses[0].errors[0].extension_code().as_deref(),
        Some("INVALID_ARGUMENT")
    );
}

#[tokio::test]
async fn map_error_only_rewrites_errors() {
    let response = query(&expanse(), "{ reactor }").await;
    assert_eq!(response.data, Some(Value::Null));
    assert_eq!(response.errors.len(), 1);

    let mapped = response.map_error(|_| "X");
    assert_eq!(mapped.data, Some(Value::Null));
    assert_eq!(mapped.errors, vec!["X"]);
    assert_eq!(
        serde_json::to_string(&mapped).unwrap(),
        r#"{"data":null,"errors":["X"]}"#
    );
}

#[test_log::test(tokio::test)]
async fn interface_fragments_match_implementers() {
    let response = query(
        &expanse(),
        r#"{
            characters(origin: EARTH) {
                __typename
                name
                ... on Character { id }
                ... on Belter { nicknames }
            }
        }"#,
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "characters": [
                    {"__typename": "Earther", "name": "James Holden", "id": "1"},
                    {"__typename": "Earther", "name": "Amos Burton", "id": "3"}
                ]
            }
        })
    );
}

#[tokio::test]
async fn union_members_select_their_own_fields() {
    let response = query(
        &expanse(),
        r#"
            query {
                everything {
                    __typename
                    ... on Ship { class }
                    ...Who
                }
            }
            fragment Who on Character { name }
        "#,
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "everything": [
                    {"__typename": "Ship", "class": "Corvette"},
                    {"__typename": "Earther", "name": "James Holden"},
                    {"__typename": "Belter", "name": "Naomi Nagata"},
                    {"__typename": "Earther", "name": "Amos Burton"},
                    {"__typename": "Martian", "name": "Alex Kamal"}
                ]
            }
        })
    );
}

#[tokio::test]
async fn records_use_their_typename_for_fragments() {
    let response = query(
        &expanse(),
        "{ roster { __typename name ... on Martian { rank } } }",
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "roster": [
                    {"__typename": "Earther", "name": "James Holden"},
                    {"__typename": "Belter", "name": "Naomi Nagata"},
                    {"__typename": "Earther", "name": "Amos Burton"},
                    {"__typename": "Martian", "name": "Alex Kamal", "rank": "Pilot"}
                ]
            }
        })
    );
}

#[tokio::test]
async fn fields_with_the_same_response_key_are_merged() {
    let response = query(
        &expanse(),
        "{ ship { name } ship { class } rocinante: ship { name } }",
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "ship": {"name": "Rocinante", "class": "Corvette"},
                "rocinante": {"name": "Rocinante"}
            }
        })
    );
}

#[tokio::test]
async fn arguments_take_their_defaults() {
    let response = query(
        &expanse(),
        r#"{
            character(name: "Naomi Nagata") {
                greeting
                formal: greeting(salutation: "Good evening")
                ship { name }
            }
        }"#,
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "character": {
                    "greeting": "Hello, Naomi Nagata",
                    "formal": "Good evening, Naomi Nagata",
                    "ship": {"name": "Rocinante"}
                }
            }
        })
    );
}

#[tokio::test]
async fn custom_scalars_are_decoded_and_encoded() {
    let executor = expanse();
    let response = query(
        &executor,
        r#"{ byUuid(uuid: "C7D1E3F5-A2B4-4C6D-8E0F-1A3B5C7D9E1F") { name uuid } manifest }"#,
    )
    .await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {
                "byUuid": {
                    "name": "Amos Burton",
                    "uuid": "c7d1e3f5-a2b4-4c6d-8e0f-1a3b5c7d9e1f"
                },
                "manifest": [
                    {"key": "Rocinante", "value": 4},
                    {"key": "Canterbury", "value": 0}
                ]
            }
        })
    );

    let response = query(&executor, r#"{ byUuid(uuid: "Rocinante") { name } }"#).await;
    assert_eq!(response.data, Some(Value::Null));
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("INVALID_ARGUMENT")
    );
}

#[tokio::test]
async fn integer_literals_keep_64_bits() {
    let executor = expanse();
    let literal = query(
        &executor,
        "{ echo(value: 9007199254740993) dock(id: 3000000000) }",
    )
    .await;
    assert_eq!(
        to_json(&literal),
        json!({"data": {"echo": 9_007_199_254_740_993_i64, "dock": "3000000000"}})
    );

    let variable = common::execute(
        &executor,
        Request::builder()
            .query("query ($v: Json, $id: ID!) { echo(value: $v) dock(id: $id) }")
            .variable("v", InputValue::Int(9_007_199_254_740_993))
            .variable("id", InputValue::Int(3_000_000_000))
            .build(),
    )
    .await;
    assert_eq!(variable, literal);

    // Int stays 32 bits
    let response = query(
        &executor,
        r#"{ search(filter: {name: "Alex Kamal", limit: 3000000000}) { name } }"#,
    )
    .await;
    assert_eq!(response.data, Some(Value::Null));
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("INVALID_ARGUMENT")
    );
}

#[tokio::test]
async fn undeclared_input_fields_fail_the_field() {
    let response = query(
        &expanse(),
        r#"{ search(filter: {name: "Alex Kamal", ship: "Razorback"}) { name } }"#,
    )
    .await;
    assert_eq!(response.data, Some(Value::Null));
    assert_eq!(
        response.errors[0].message,
        "invalid value for argument 'filter': field 'ship' is not defined by input object 'CharacterFilter'"
    );
}

#[tokio::test]
async fn invalid_enum_values_fail_the_field() {
    let response = query(&expanse(), "{ characters(origin: PLUTO) { name } }").await;
    assert_eq!(response.data, Some(Value::Null));
    assert_eq!(
        response.errors[0].message,
        "invalid value for argument 'origin': 'PLUTO' is not a value of enum 'Origin'"
    );
}

#[tokio::test]
async fn unknown_fields_are_field_errors() {
    let response = query(&expanse(), "{\n  ship {\n    registry\n    name\n  }\n}").await;
    assert_eq!(
        to_json(&response),
        json!({
            "data": {"ship": {"registry": null, "name": "Rocinante"}},
            "errors": [{
                "message": "cannot query field 'registry' on type 'Ship'",
                "locations": [{"line": 3, "column": 5}],
                "path": ["ship", "registry"],
                "extensions": {"code": "INVALID_FIELD"}
            }]
        })
    );
}

#[tokio::test]
async fn request_errors_abort_before_execution() {
    let executor = expanse();
    let error = executor
        .execute(
            Request::builder()
                .query("query Ship { ship { name } }")
                .operation_name("Crew")
                .build(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        error,
        RequestError::OperationSelection(OperationSelectionError::UnknownOperation(
            "Crew".to_string()
        ))
    );

    let error = executor
        .execute(Request::builder().query("{ ship { name }").build())
        .await
        .unwrap_err();
    assert!(matches!(error, RequestError::Spec(SpecError::ParsingError(_))));
    let response = error.to_response();
    assert_eq!(response.data, None);
    assert_eq!(
        to_json(&response)["errors"][0]["extensions"]["code"],
        json!("PARSING_ERROR")
    );
}

#[tokio::test]
async fn configuration_does_not_change_results() {
    let configuration = Configuration::from_str(
        r#"
execution:
  max_concurrency: 1
"#,
    )
    .unwrap();
    let serial = Executor::with_configuration(common::expanse_schema(), configuration);
    let document = "{ characters { name ship { name } } everything { __typename } }";
    assert_eq!(
        query(&serial, document).await,
        query(&expanse(), document).await
    );
}
