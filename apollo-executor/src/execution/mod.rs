//! GraphQL execution engine.
//!
//! Resolution walks the resolver tree of a [`Schema`](crate::Schema) rather
//! than a type system: every object position is a [`SchemaObject`] whose
//! fields produce [`ResolverNode`]s, and leaf values are passed through with
//! only scalar codecs applied.
//!
//! [`SchemaObject`]: resolver::SchemaObject
//! [`ResolverNode`]: resolver::ResolverNode

pub(crate) mod collect_fields;
pub(crate) mod engine;
pub(crate) mod input_coercion;
pub(crate) mod resolver;
pub(crate) mod result_coercion;
