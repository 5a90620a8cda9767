//! A small schema of characters and ships shared by the integration tests.
#![allow(dead_code)]

use apollo_executor::scalars::JsonScalar;
use apollo_executor::scalars::UuidScalar;
use apollo_executor::Arguments;
use apollo_executor::BoxError;
use apollo_executor::ExecutionResult;
use apollo_executor::Executor;
use apollo_executor::FieldResolver;
use apollo_executor::FieldType;
use apollo_executor::InputField;
use apollo_executor::InputObjectType;
use apollo_executor::Object;
use apollo_executor::Request;
use apollo_executor::ResolvedValue;
use apollo_executor::ResolverNode;
use apollo_executor::Response;
use apollo_executor::Schema;
use apollo_executor::SchemaObject;
use apollo_executor::Value;
use futures::stream;
use futures::StreamExt;

#[derive(Clone, Copy, Debug)]
pub struct Character {
    pub id: i64,
    pub name: &'static str,
    pub origin: &'static str,
    pub nicknames: &'static [&'static str],
    pub uuid: &'static str,
}

pub const CHARACTERS: [Character; 4] = [
    Character {
        id: 1,
        name: "James Holden",
        origin: "EARTH",
        nicknames: &["Jim"],
        uuid: "3a8f5c1e-0b6d-4e2a-9c41-7f2d8e6b5a90",
    },
    Character {
        id: 2,
        name: "Naomi Nagata",
        origin: "BELT",
        nicknames: &[],
        uuid: "9b2e4d7a-5c31-4f08-8a6e-1d3c5b7f9e20",
    },
    Character {
        id: 3,
        name: "Amos Burton",
        origin: "EARTH",
        nicknames: &["Timmy"],
        // stored the way an upstream service would send it
        uuid: "C7D1E3F5-A2B4-4C6D-8E0F-1A3B5C7D9E1F",
    },
    Character {
        id: 4,
        name: "Alex Kamal",
        origin: "MARS",
        nicknames: &[],
        uuid: "5e6f7a8b-9c0d-4e1f-a2b3-c4d5e6f7a8b9",
    },
];

impl Character {
    pub fn type_name(&self) -> &'static str {
        match self.origin {
            "EARTH" => "Earther",
            "MARS" => "Martian",
            _ => "Belter",
        }
    }

    pub fn find(name: &str) -> Option<Character> {
        CHARACTERS
            .iter()
            .find(|character| character.name == name)
            .copied()
    }

    pub fn to_object(self) -> SchemaObject {
        SchemaObject::new(self.type_name())
            .field(
                "id",
                FieldResolver::new(FieldType::Id.non_null(), move |_| {
                    ResolverNode::pure(self.id)
                }),
            )
            .field(
                "name",
                FieldResolver::new(FieldType::String.non_null(), move |_| {
                    ResolverNode::pure(self.name)
                }),
            )
            .field(
                "origin",
                FieldResolver::new(FieldType::named("Origin"), move |_| {
                    ResolverNode::pure(Value::Enum(self.origin.to_string()))
                }),
            )
            .field(
                "nicknames",
                FieldResolver::new(FieldType::list(FieldType::String.non_null()), move |_| {
                    ResolverNode::pure(self.nicknames.to_vec())
                }),
            )
            .field(
                "uuid",
                FieldResolver::new(FieldType::named("UUID"), move |_| {
                    ResolverNode::pure(self.uuid)
                }),
            )
            .field(
                "greeting",
                FieldResolver::new(FieldType::String, move |arguments| {
                    let salutation = arguments
                        .get("salutation")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    ResolverNode::pure(format!("{salutation}, {}", self.name))
                })
                .argument_with_default("salutation", FieldType::String, "Hello"),
            )
            .field(
                "ship",
                FieldResolver::new(FieldType::named("Ship"), |_| {
                    ResolverNode::effect(async {
                        tokio::task::yield_now().await;
                        Ok::<_, BoxError>(rocinante())
                    })
                }),
            )
    }

    /// The character as a plain record rather than a resolver object.
    pub fn to_record(self) -> Value {
        let mut record = Object::new();
        record.insert("__typename".to_string(), self.type_name().into());
        record.insert("name".to_string(), self.name.into());
        if self.origin == "MARS" {
            record.insert("rank".to_string(), "Pilot".into());
        }
        Value::Object(record)
    }
}

pub fn rocinante() -> SchemaObject {
    SchemaObject::new("Ship")
        .field(
            "name",
            FieldResolver::new(FieldType::String.non_null(), |_| {
                ResolverNode::pure("Rocinante")
            }),
        )
        .field(
            "class",
            FieldResolver::new(FieldType::String, |_| ResolverNode::pure("Corvette")),
        )
        .field(
            "crew",
            FieldResolver::new(FieldType::list(FieldType::named("Character")), |_| {
                characters(CHARACTERS.iter().copied())
            }),
        )
}

fn characters(characters: impl IntoIterator<Item = Character>) -> ResolverNode {
    ResolverNode::list(
        characters
            .into_iter()
            .map(|character| ResolverNode::object(character.to_object())),
    )
}

fn strings(value: Option<&Value>) -> Option<Vec<&str>> {
    value
        .and_then(Value::as_list)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
}

fn search(arguments: &Arguments) -> ResolverNode {
    let Some(filter) = arguments.get("filter").and_then(Value::as_object) else {
        return ResolverNode::null();
    };
    let name = filter.get("name").and_then(Value::as_str);
    let origin = filter.get("origin").and_then(Value::as_str);
    let limit = match filter.get("limit") {
        Some(Value::Int(limit)) => *limit as usize,
        _ => usize::MAX,
    };
    characters(
        CHARACTERS
            .iter()
            .copied()
            .filter(|character| name.map_or(true, |name| character.name == name))
            .filter(|character| origin.map_or(true, |origin| character.origin == origin))
            .take(limit),
    )
}

fn query_root() -> SchemaObject {
    SchemaObject::new("Query")
        .field(
            "characters",
            FieldResolver::new(
                FieldType::list(FieldType::named("Character").non_null()),
                |arguments| {
                    let origin = arguments.get("origin").and_then(Value::as_str);
                    let names = strings(arguments.get("names"));
                    characters(CHARACTERS.iter().copied().filter(|character| {
                        origin.map_or(true, |origin| character.origin == origin)
                            && names
                                .as_ref()
                                .map_or(true, |names| names.contains(&character.name))
                    }))
                },
            )
            .argument("origin", FieldType::named("Origin"))
            .argument("names", FieldType::list(FieldType::String.non_null())),
        )
        .field(
            "character",
            FieldResolver::with_single_argument(
                FieldType::named("Character"),
                "name",
                FieldType::String.non_null(),
                |name| {
                    let found = name.as_str().and_then(Character::find);
                    ResolverNode::effect(async move {
                        tokio::task::yield_now().await;
                        Ok::<ResolvedValue, BoxError>(match found {
                            Some(character) => character.to_object().into(),
                            None => Value::Null.into(),
                        })
                    })
                },
            ),
        )
        .field(
            "byUuid",
            FieldResolver::with_single_argument(
                FieldType::named("Character"),
                "uuid",
                FieldType::named("UUID").non_null(),
                |uuid| {
                    let uuid = uuid.as_str().unwrap_or_default().to_string();
                    match CHARACTERS
                        .iter()
                        .find(|character| character.uuid.to_lowercase() == uuid)
                    {
                        Some(character) => ResolverNode::object(character.to_object()),
                        None => ResolverNode::null(),
                    }
                },
            ),
        )
        .field(
            "search",
            FieldResolver::new(FieldType::list(FieldType::named("Character")), search)
                .argument("filter", FieldType::named("CharacterFilter").non_null()),
        )
        .field(
            "ship",
            FieldResolver::new(FieldType::named("Ship"), |_| {
                ResolverNode::object(rocinante())
            }),
        )
        .field(
            "everything",
            FieldResolver::new(FieldType::list(FieldType::named("SearchResult")), |_| {
                ResolverNode::list(
                    std::iter::once(ResolverNode::object(rocinante())).chain(
                        CHARACTERS
                            .iter()
                            .map(|character| ResolverNode::object(character.to_object())),
                    ),
                )
            }),
        )
        .field(
            "roster",
            FieldResolver::new(FieldType::list(FieldType::named("Character")), |_| {
                ResolverNode::pure(
                    CHARACTERS
                        .iter()
                        .map(|character| character.to_record())
                        .collect::<Vec<_>>(),
                )
            }),
        )
        .field(
            "manifest",
            FieldResolver::new(FieldType::named("Json"), |_| {
                ResolverNode::pure(Value::entries([("Rocinante", 4), ("Canterbury", 0)]))
            }),
        )
        .field(
            "echo",
            FieldResolver::with_single_argument(
                FieldType::named("Json"),
                "value",
                FieldType::named("Json"),
                |value| ResolverNode::pure(value),
            ),
        )
        .field(
            "dock",
            FieldResolver::with_single_argument(
                FieldType::Id,
                "id",
                FieldType::Id.non_null(),
                |id| ResolverNode::pure(id),
            ),
        )
        .field(
            "reactor",
            FieldResolver::new(FieldType::Int, |_| {
                ResolverNode::effect(async { Err::<Value, _>("reactor offline") })
            }),
        )
}

fn subscription_root() -> SchemaObject {
    SchemaObject::new("Subscription").field(
        "count",
        FieldResolver::new(FieldType::Int.non_null(), |arguments| {
            let to = match arguments.get("to") {
                Some(Value::Int(to)) => *to,
                _ => 0,
            };
            ResolverNode::stream(stream::iter(1..=to).map(Value::from))
        })
        .argument_with_default("to", FieldType::Int, 3),
    )
}

pub fn expanse_schema() -> Schema {
    Schema::builder()
        .query(query_root())
        .subscription(subscription_root())
        .enum_type("Origin", ["EARTH", "MARS", "BELT"])
        .input_object(
            InputObjectType::builder()
                .name("CharacterFilter")
                .field(InputField::new("name", FieldType::String.non_null()))
                .field(InputField::new("origin", FieldType::named("Origin")))
                .field(InputField::new("limit", FieldType::Int).with_default(10))
                .build(),
        )
        .implementers("Character", ["Earther", "Martian", "Belter"])
        .implementers("SearchResult", ["Earther", "Martian", "Belter", "Ship"])
        .scalar("UUID", UuidScalar)
        .scalar("Json", JsonScalar)
        .build()
}

pub fn expanse() -> Executor {
    Executor::new(expanse_schema())
}

/// Runs a query or mutation and returns its response.
pub async fn execute(executor: &Executor, request: Request) -> Response {
    match executor.execute_to_result(request).await {
        ExecutionResult::Response(response) => response,
        ExecutionResult::Stream(_) => panic!("expected a single response"),
    }
}

pub async fn query(executor: &Executor, query: &str) -> Response {
    execute(executor, Request::builder().query(query).build()).await
}

pub fn to_json(response: &Response) -> serde_json_bytes::Value {
    serde_json_bytes::to_value(response).unwrap()
}
