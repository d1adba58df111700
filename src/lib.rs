// nestype library entry point
//
// Structural type descriptors for arbitrarily nested values: derive a schema
// from a sample, test other values against it, pull their leaves out in a
// fixed order and rebuild values from flat leaf sequences.

pub mod flatten;
pub mod internal;
pub mod schema;
pub mod value;

pub use crate::flatten::{expand_entries, expand_paths, FlatValue, Flattener, Path, PathEntry};
pub use crate::internal::error::{Error, Result};
pub use crate::schema::{
    derive_schema, extract_leaves, fill_schema, ContainerKinds, NestedType, Schema, SetOrder,
    TraversalConfig,
};
pub use crate::value::{get_nested, Key, MapOrder, Mapping, NdArray, Record, Step, TypeTag, Value, ValueSet};
