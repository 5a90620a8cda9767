use serde::Deserialize;
use serde::Serialize;

// Primitives are taken from scalars: https://spec.graphql.org/draft/#sec-Scalars
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Named type {0}
    Named(String),
    /// List type {0}
    List(Box<FieldType>),
    /// Non null type {0}
    NonNull(Box<FieldType>),
    /// String
    String,
    /// Int
    Int,
    /// Float
    Float,
    /// Id
    Id,
    /// Boolean
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Named(ty) => write!(f, "{ty}"),
            FieldType::List(ty) => write!(f, "[{ty}]"),
            FieldType::NonNull(ty) => write!(f, "{ty}!"),
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Id => write!(f, "ID"),
            FieldType::Boolean => write!(f, "Boolean"),
        }
    }
}

impl FieldType {
    /// A named type, mapping the built-in scalar names to their variants.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "String" => Self::String,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "ID" => Self::Id,
            "Boolean" => Self::Boolean,
            _ => Self::Named(name),
        }
    }

    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wraps the type as non-null. Already non-null types are left alone.
    pub fn non_null(self) -> Self {
        match self {
            non_null @ FieldType::NonNull(_) => non_null,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// return the name of the type on which selections happen
    ///
    /// Example if we get the field `list: [User!]!`, it will return "User"
    pub fn inner_type_name(&self) -> Option<&str> {
        match self {
            FieldType::Named(name) => Some(name.as_str()),
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.inner_type_name(),
            FieldType::String
            | FieldType::Int
            | FieldType::Float
            | FieldType::Id
            | FieldType::Boolean => None,
        }
    }

    /// The type of list items, looking through a non-null wrapper.
    pub(crate) fn list_item_type(&self) -> Option<&FieldType> {
        match self {
            FieldType::List(inner) => Some(inner),
            FieldType::NonNull(inner) => inner.list_item_type(),
            _ => None,
        }
    }

    pub fn is_builtin_scalar(&self) -> bool {
        match self {
            FieldType::Named(_) | FieldType::List(_) | FieldType::NonNull(_) => false,
            FieldType::String
            | FieldType::Int
            | FieldType::Float
            | FieldType::Id
            | FieldType::Boolean => true,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }
}
