use std::collections::HashSet;

use indexmap::IndexMap;

use crate::spec::Field;
use crate::spec::Fragments;
use crate::spec::Schema;
use crate::spec::Selection;
use crate::value::Variables;

/// The fields sharing one response key, merged.
#[derive(Debug)]
pub(crate) struct CollectedField<'a> {
    /// The first occurrence, which provides the name, arguments and location.
    pub(crate) field: &'a Field,
    /// The sub-selections of every occurrence, in document order.
    pub(crate) selection_set: Vec<&'a Selection>,
}

impl CollectedField<'_> {
    /// True for composite fields, even when every sub-selection was skipped.
    pub(crate) fn has_selection_set(&self) -> bool {
        self.field.has_selection_set || !self.selection_set.is_empty()
    }
}

/// <https://spec.graphql.org/October2021/#CollectFields()>
///
/// `runtime_type` is `None` for records whose type is unknown, in which case
/// only fragments without a type condition apply.
pub(crate) fn collect_fields<'a>(
    schema: &Schema,
    fragments: &'a Fragments,
    variables: &Variables,
    runtime_type: Option<&str>,
    selection_set: impl IntoIterator<Item = &'a Selection>,
) -> IndexMap<&'a str, CollectedField<'a>> {
    let mut collected = IndexMap::new();
    let mut visited_fragments = HashSet::new();
    collect_fields_inner(
        schema,
        fragments,
        variables,
        runtime_type,
        selection_set,
        &mut visited_fragments,
        &mut collected,
    );
    collected
}

fn collect_fields_inner<'a>(
    schema: &Schema,
    fragments: &'a Fragments,
    variables: &Variables,
    runtime_type: Option<&str>,
    selection_set: impl IntoIterator<Item = &'a Selection>,
    visited_fragments: &mut HashSet<&'a str>,
    collected: &mut IndexMap<&'a str, CollectedField<'a>>,
) {
    for selection in selection_set {
        if selection.include_skip().should_skip(variables) {
            continue;
        }
        match selection {
            Selection::Field(field) => {
                collected
                    .entry(field.response_key())
                    .or_insert_with(|| CollectedField {
                        field,
                        selection_set: Vec::new(),
                    })
                    .selection_set
                    .extend(&field.selection_set);
            }
            Selection::FragmentSpread { name, .. } => {
                let new = visited_fragments.insert(name.as_str());
                if !new {
                    continue;
                }
                let Some(fragment) = fragments.get(name) else {
                    failfast_debug!("missing fragment named: {}", name);
                    continue;
                };
                if !does_fragment_type_apply(schema, runtime_type, &fragment.type_condition) {
                    continue;
                }
                collect_fields_inner(
                    schema,
                    fragments,
                    variables,
                    runtime_type,
                    &fragment.selection_set,
                    visited_fragments,
                    collected,
                )
            }
            Selection::InlineFragment {
                type_condition,
                selection_set,
                ..
            } => {
                if let Some(type_condition) = type_condition {
                    if !does_fragment_type_apply(schema, runtime_type, type_condition) {
                        continue;
                    }
                }
                collect_fields_inner(
                    schema,
                    fragments,
                    variables,
                    runtime_type,
                    selection_set,
                    visited_fragments,
                    collected,
                )
            }
        }
    }
}

/// <https://spec.graphql.org/October2021/#DoesFragmentTypeApply()>
fn does_fragment_type_apply(
    schema: &Schema,
    runtime_type: Option<&str>,
    type_condition: &str,
) -> bool {
    match runtime_type {
        Some(object_type) => {
            object_type == type_condition || schema.is_subtype(type_condition, object_type)
        }
        None => false,
    }
}
