//! Logic for loading configuration in to an object model
use std::str::FromStr;

use displaydoc::Display;
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
}

/// The configuration of the execution engine.
///
/// Can be created through `serde::Deserialize` from various formats,
/// or from YAML with [`Configuration::from_str`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Limits applied while parsing operations.
    pub parser: Parser,

    /// Execution behaviour.
    pub execution: Execution,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder(visibility = "pub")]
    fn new(parser: Option<Parser>, execution: Option<Execution>) -> Self {
        Self {
            parser: parser.unwrap_or_default(),
            execution: execution.unwrap_or_default(),
        }
    }

    fn validate(self) -> Result<Self, ConfigurationError> {
        if self.execution.max_concurrency == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid execution configuration",
                error: "max_concurrency must be at least 1".to_string(),
            });
        }
        if self.parser.recursion_limit == 0 || self.parser.token_limit == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid parser configuration",
                error: "limits must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

/// Parser limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Parser {
    /// Maximum nesting depth of a parsed document
    /// default: 500
    #[serde(default = "default_parser_recursion_limit")]
    pub recursion_limit: usize,

    /// Maximum number of tokens of a parsed document
    /// default: 15000
    #[serde(default = "default_parser_token_limit")]
    pub token_limit: usize,
}

fn default_parser_recursion_limit() -> usize {
    // This is `apollo-parser`’s default, which protects against stack overflow
    // but is still very high for "reasonable" queries.
    500
}

fn default_parser_token_limit() -> usize {
    15_000
}

#[buildstructor::buildstructor]
impl Parser {
    #[builder(visibility = "pub")]
    fn new(recursion_limit: Option<usize>, token_limit: Option<usize>) -> Self {
        Self {
            recursion_limit: recursion_limit.unwrap_or_else(default_parser_recursion_limit),
            token_limit: token_limit.unwrap_or_else(default_parser_token_limit),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::builder().build()
    }
}

/// Execution behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Execution {
    /// Maximum number of sibling fields or list items resolved at the same
    /// time within one selection set
    /// default: 64
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Run the root fields of mutations one after the other
    /// default: true
    #[serde(default = "default_serial_mutations")]
    pub serial_mutations: bool,
}

fn default_max_concurrency() -> usize {
    64
}

fn default_serial_mutations() -> bool {
    true
}

#[buildstructor::buildstructor]
impl Execution {
    #[builder(visibility = "pub")]
    fn new(max_concurrency: Option<usize>, serial_mutations: Option<bool>) -> Self {
        Self {
            max_concurrency: max_concurrency.unwrap_or_else(default_max_concurrency),
            serial_mutations: serial_mutations.unwrap_or_else(default_serial_mutations),
        }
    }
}

impl Default for Execution {
    fn default() -> Self {
        Execution::builder().build()
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(raw_yaml: &str) -> Result<Self, Self::Err> {
        validate_configuration(raw_yaml)
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    settings.into_generator().into_root_schema_for::<Configuration>()
}

/// Parses YAML configuration and checks the values serde cannot.
pub(crate) fn validate_configuration(raw_yaml: &str) -> Result<Configuration, ConfigurationError> {
    if raw_yaml.trim().is_empty() {
        return Ok(Configuration::default());
    }
    let configuration: Configuration =
        serde_yaml::from_str(raw_yaml).map_err(ConfigurationError::DeserializeConfigError)?;
    configuration.validate()
}
