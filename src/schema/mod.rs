// Schema module for nestype
//
// This module provides the nested-structure type system. It includes:
//
// 1. Container classification and traversal configuration
// 2. Schema derivation from sample values
// 3. Depth-first leaf extraction
// 4. Schema filling from a flat leaf sequence
// 5. The `NestedType` descriptor tying these together

// Re-export public types and functions
pub use self::classifier::{
    classify, is_container, ContainerKinds, Node, SeqKind, SetOrder, TraversalConfig, MAX_NESTING_DEPTH,
};
pub use self::filler::fill_schema;
pub use self::inference::derive_schema;
pub use self::leaves::extract_leaves;
pub use self::nested_type::NestedType;
pub use self::types::{ContainerKind, MapSchema, Schema};

// Sub-modules
pub mod classifier;
pub mod filler;
pub mod inference;
pub mod leaves;
pub mod nested_type;
pub mod types;
