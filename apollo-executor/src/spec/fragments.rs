use std::collections::HashMap;

use apollo_compiler::ast;
use apollo_compiler::parser::SourceMap;

use crate::spec::Selection;
use crate::spec::SpecError;

#[derive(Debug, Default)]
pub(crate) struct Fragments {
    map: HashMap<String, Fragment>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub(crate) type_condition: String,
    pub(crate) selection_set: Vec<Selection>,
}

impl Fragments {
    pub(crate) fn from_ast(document: &ast::Document, sources: &SourceMap) -> Result<Self, SpecError> {
        let mut map = HashMap::new();
        for definition in &document.definitions {
            // Spec: https://spec.graphql.org/draft/#FragmentDefinition
            let ast::Definition::FragmentDefinition(fragment_definition) = definition else {
                continue;
            };
            let name = fragment_definition.name.as_str().to_owned();
            let fragment = Fragment {
                type_condition: fragment_definition.type_condition.as_str().to_owned(),
                selection_set: Selection::lower_set(
                    &fragment_definition.selection_set,
                    sources,
                    0,
                )?,
            };
            if map.insert(name.clone(), fragment).is_some() {
                failfast_debug!("fragment {} is defined more than once", name);
            }
        }
        Ok(Fragments { map })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Fragment> {
        self.map.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
