use thiserror::Error;

use crate::schema::types::Schema;
use crate::value::TypeTag;

/// Unified error type for the nestype library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A value's shape or leaf types disagree with a schema.
    #[error("Type Mismatch: the value has type {actual}, which does not match this format: {expected}")]
    TypeMismatch {
        expected: Box<Schema>,
        actual: Box<Schema>,
    },

    /// A single leaf disagrees with the type recorded in the schema while filling.
    #[error("Schema Mismatch: leaf {position} has type {actual}, expected {expected}")]
    SchemaMismatch {
        expected: TypeTag,
        actual: TypeTag,
        position: usize,
    },

    /// The leaf source ran out before every leaf position was filled.
    #[error("Insufficient Data: ran out of leaves after {filled} of {expected}")]
    InsufficientData { filled: usize, expected: usize },

    /// The leaf source still had values after the schema was filled.
    #[error("Excess Data: the schema takes {expected} leaves but more were supplied")]
    ExcessData { expected: usize },

    /// Filled set elements compared equal, so the set would lose positions.
    #[error("Duplicate Set Elements: the set node takes {expected} elements but the leaves give only {distinct} distinct ones")]
    DuplicateSetElements { expected: usize, distinct: usize },

    /// Leaf extraction over a container with no well-defined order.
    #[error("Ordering Error: {0}")]
    Ordering(String),

    /// Nesting went past the configured recursion limit.
    #[error("Depth Exceeded: maximum nesting depth ({limit}) exceeded")]
    DepthExceeded { limit: usize },

    /// Malformed path expression, missing key-chain step or conflicting expansion.
    #[error("Path Error: {0}")]
    PathError(String),

    /// Conversion to or from JSON documents.
    #[error("Json Error: {0}")]
    JsonError(String),
}

/// A specialized `Result` type for nestype operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err.to_string())
    }
}

impl Error {
    /// Builds a `TypeMismatch` from the two schemas being compared.
    pub fn type_mismatch(expected: Schema, actual: Schema) -> Self {
        Error::TypeMismatch {
            expected: Box::new(expected),
            actual: Box::new(actual),
        }
    }
}

/*
Panic policy:

Recoverable failures (shape mismatches, leaf-count mismatches, malformed paths)
are reported through Result<T, Error>. Panics are reserved for programming
errors; the library never catches them.
*/
