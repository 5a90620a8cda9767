use apollo_compiler::ast;
use apollo_compiler::parser::SourceMap;
use apollo_compiler::Node;
use indexmap::IndexMap;

use crate::execution::input_coercion::coerce_builtin_scalar;
use crate::graphql::Location;
use crate::spec::FieldType;
use crate::spec::SpecError;
use crate::value::InputValue;
use crate::value::Value;
use crate::value::Variables;

// The RECURSION_LIMIT is chosen to be:
//   < # expected to cause stack overflow &&
//   > # expected in a legitimate query
pub(crate) const RECURSION_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Selection {
    Field(Field),
    InlineFragment {
        // Optional in the document: a fragment without condition always applies
        type_condition: Option<String>,
        include_skip: IncludeSkip,
        selection_set: Vec<Selection>,
    },
    FragmentSpread {
        name: String,
        include_skip: IncludeSkip,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Field {
    pub(crate) alias: Option<String>,
    pub(crate) name: String,
    pub(crate) arguments: Vec<(String, InputValue)>,
    /// Empty for leaf selections.
    pub(crate) selection_set: Vec<Selection>,
    /// Whether the document gives this field a selection set, which may have
    /// been emptied by statically skipped selections.
    pub(crate) has_selection_set: bool,
    pub(crate) include_skip: IncludeSkip,
    pub(crate) location: Option<Location>,
}

impl Field {
    /// The key under which this field appears in the response.
    pub(crate) fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.name.as_str())
    }

    pub(crate) fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments
            .iter()
            .find_map(|(argument, value)| (argument == name).then_some(value))
    }
}

impl Selection {
    pub(crate) fn from_ast(
        selection: &ast::Selection,
        sources: &SourceMap,
        mut count: usize,
    ) -> Result<Option<Self>, SpecError> {
        if count > RECURSION_LIMIT {
            tracing::error!("selection processing recursion limit({RECURSION_LIMIT}) exceeded");
            return Err(SpecError::RecursionLimitExceeded);
        }
        count += 1;
        Ok(match selection {
            // Spec: https://spec.graphql.org/draft/#Field
            ast::Selection::Field(field) => {
                let include_skip = IncludeSkip::parse(&field.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                let arguments = field
                    .arguments
                    .iter()
                    .map(|argument| {
                        Ok((
                            argument.name.as_str().to_owned(),
                            input_value_from_ast(&argument.value)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, SpecError>>()?;

                let selection_set = Self::lower_set(&field.selection_set, sources, count)?;

                Some(Self::Field(Field {
                    alias: field.alias.as_ref().map(|alias| alias.as_str().to_owned()),
                    name: field.name.as_str().to_owned(),
                    arguments,
                    selection_set,
                    has_selection_set: !field.selection_set.is_empty(),
                    include_skip,
                    location: location(field, sources),
                }))
            }
            // Spec: https://spec.graphql.org/draft/#InlineFragment
            ast::Selection::InlineFragment(inline_fragment) => {
                let include_skip = IncludeSkip::parse(&inline_fragment.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                let selection_set =
                    Self::lower_set(&inline_fragment.selection_set, sources, count)?;
                // Can be empty with a statically skipped selection set
                if selection_set.is_empty() {
                    return Ok(None);
                }

                Some(Self::InlineFragment {
                    type_condition: inline_fragment
                        .type_condition
                        .as_ref()
                        .map(|name| name.as_str().to_owned()),
                    include_skip,
                    selection_set,
                })
            }
            // Spec: https://spec.graphql.org/draft/#FragmentSpread
            ast::Selection::FragmentSpread(fragment_spread) => {
                let include_skip = IncludeSkip::parse(&fragment_spread.directives);
                if include_skip.statically_skipped() {
                    return Ok(None);
                }

                Some(Self::FragmentSpread {
                    name: fragment_spread.fragment_name.as_str().to_owned(),
                    include_skip,
                })
            }
        })
    }

    pub(crate) fn lower_set(
        selections: &[ast::Selection],
        sources: &SourceMap,
        count: usize,
    ) -> Result<Vec<Selection>, SpecError> {
        selections
            .iter()
            .filter_map(|selection| Selection::from_ast(selection, sources, count).transpose())
            .collect()
    }

    pub(crate) fn include_skip(&self) -> &IncludeSkip {
        match self {
            Selection::Field(field) => &field.include_skip,
            Selection::InlineFragment { include_skip, .. }
            | Selection::FragmentSpread { include_skip, .. } => include_skip,
        }
    }
}

fn location<T>(node: &Node<T>, sources: &SourceMap) -> Option<Location> {
    let range = node.line_column_range(sources)?;
    Some(Location {
        line: range.start.line as u32,
        column: range.start.column as u32,
    })
}

/// Lowers a literal from the document. Integers keep 64 bits, so that `Int`
/// coercion reports values outside of 32 bits and `ID` or custom scalars see
/// them unchanged. Only integers beyond 64 bits become floats.
pub(crate) fn input_value_from_ast(value: &ast::Value) -> Result<InputValue, SpecError> {
    Ok(match value {
        ast::Value::Null => InputValue::Null,
        ast::Value::Enum(name) => InputValue::Enum(name.as_str().to_owned()),
        ast::Value::Variable(name) => InputValue::Variable(name.as_str().to_owned()),
        ast::Value::String(s) => InputValue::String(s.as_str().to_owned()),
        ast::Value::Float(f) => InputValue::Float(
            f.try_to_f64()
                .map_err(|_| SpecError::InvalidLiteral(f.as_str().to_owned()))?,
        ),
        ast::Value::Int(i) => match i.as_str().parse::<i64>() {
            Ok(int) => InputValue::Int(int),
            Err(_) => InputValue::Float(
                i.try_to_f64()
                    .map_err(|_| SpecError::InvalidLiteral(i.as_str().to_owned()))?,
            ),
        },
        ast::Value::Boolean(b) => InputValue::Boolean(*b),
        ast::Value::List(items) => InputValue::List(
            items
                .iter()
                .map(|item| input_value_from_ast(item))
                .collect::<Result<_, _>>()?,
        ),
        ast::Value::Object(fields) => InputValue::Object(
            fields
                .iter()
                .map(|(name, value)| Ok((name.as_str().to_owned(), input_value_from_ast(value)?)))
                .collect::<Result<IndexMap<_, _>, SpecError>>()?,
        ),
    })
}

/// The `@include` and `@skip` conditions attached to a selection.
///
/// A directive may appear more than once: every `@skip` must be false and
/// every `@include` true for the selection to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IncludeSkip {
    include: Vec<Condition>,
    skip: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Condition {
    Yes,
    No,
    Variable(String),
}

impl IncludeSkip {
    pub(crate) fn parse(directives: &ast::DirectiveList) -> Self {
        let mut include_skip = Self::default();
        for directive in directives.iter() {
            if directive.name == "include" {
                include_skip
                    .include
                    .push(Condition::parse(directive).unwrap_or(Condition::Yes));
            }
            if directive.name == "skip" {
                include_skip
                    .skip
                    .push(Condition::parse(directive).unwrap_or(Condition::No));
            }
        }
        include_skip
    }

    pub(crate) fn statically_skipped(&self) -> bool {
        self.skip.iter().any(|condition| matches!(condition, Condition::Yes))
            || self
                .include
                .iter()
                .any(|condition| matches!(condition, Condition::No))
    }

    pub(crate) fn should_skip(&self, variables: &Variables) -> bool {
        // A missing or non-boolean variable falls back to the directive's
        // neutral value
        self.skip
            .iter()
            .any(|condition| condition.eval(variables).unwrap_or(false))
            || self
                .include
                .iter()
                .any(|condition| !condition.eval(variables).unwrap_or(true))
    }
}

impl Condition {
    pub(crate) fn parse(directive: &ast::Directive) -> Option<Self> {
        let value: &ast::Value = directive.specified_argument_by_name("if")?;
        match value {
            ast::Value::Boolean(true) => Some(Condition::Yes),
            ast::Value::Boolean(false) => Some(Condition::No),
            ast::Value::Variable(variable) => {
                Some(Condition::Variable(variable.as_str().to_owned()))
            }
            _ => None,
        }
    }

    pub(crate) fn eval(&self, variables: &Variables) -> Option<bool> {
        match self {
            Condition::Yes => Some(true),
            Condition::No => Some(false),
            Condition::Variable(variable_name) => {
                let value = variables.get(variable_name.as_str())?;
                match coerce_builtin_scalar(&FieldType::Boolean, value) {
                    Ok(Value::Boolean(b)) => Some(b),
                    _ => {
                        tracing::debug!(
                            variable = %variable_name,
                            "directive condition is not a boolean, using its default"
                        );
                        None
                    }
                }
            }
        }
    }
}
