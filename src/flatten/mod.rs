// Flatten module for nestype
//
// Path-based flattening of nested values and its inverse, path-key expansion.

pub use self::expand::{expand, expand_entries, expand_paths};
pub use self::flattener::{is_default_leaf, FlatValue, Flattener, PathEntry, Predicate, Reducer};
pub use self::path::Path;

pub mod expand;
pub mod flattener;
pub mod path;
