// Value module for nestype
//
// The nested values that schemas are derived from, filled into and flattened.

pub use self::access::{get_nested, Step};
pub use self::containers::{MapOrder, Mapping, ValueSet};
pub use self::types::{Key, NdArray, Record, TypeTag, Value};

pub mod access;
pub mod containers;
pub mod json;
pub mod types;
