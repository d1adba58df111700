// Nested type descriptor
//
// `NestedType` is the reusable public face of the schema machinery: derive it
// once from a sample, then test, flatten and rebuild many values against it.

use std::fmt;

use tracing::debug;

use crate::internal::error::{Error, Result};
use crate::schema::classifier::TraversalConfig;
use crate::schema::filler::fill_schema;
use crate::schema::inference::derive_schema;
use crate::schema::leaves::extract_leaves;
use crate::schema::types::Schema;
use crate::value::Value;

/// The type of an arbitrarily nested value.
///
/// Two descriptors are equal iff their schemas are structurally equal; the
/// traversal configuration does not take part in comparisons.
///
/// ```
/// use nestype::{Mapping, NestedType, Value};
///
/// let sample = Value::list(vec![
///     Value::from(1),
///     Value::from(Mapping::sorted().with("a", Value::tuple([3, 4])).with("b", "x")),
/// ]);
/// let nested = NestedType::from_sample(&sample).unwrap();
/// assert_eq!(nested.to_string(), "NestedType([int, {'a': (int, int), 'b': str}])");
///
/// let leaves = nested.leaves_of(&sample).unwrap();
/// assert_eq!(nested.fill(leaves, true).unwrap(), sample);
/// ```
#[derive(Debug, Clone)]
pub struct NestedType {
    schema: Schema,
    config: TraversalConfig,
}

impl NestedType {
    /// Wraps an existing schema with the default traversal configuration.
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, TraversalConfig::default())
    }

    /// Wraps an existing schema with a custom traversal configuration.
    pub fn with_config(schema: Schema, config: TraversalConfig) -> Self {
        Self { schema, config }
    }

    /// Derives the descriptor of `sample` with the default configuration.
    pub fn from_sample(sample: &Value) -> Result<Self> {
        Self::from_sample_with(sample, TraversalConfig::default())
    }

    /// Derives the descriptor of `sample` with a custom configuration.
    pub fn from_sample_with(sample: &Value, config: TraversalConfig) -> Result<Self> {
        let schema = derive_schema(sample, &config)?;
        debug!(leaves = schema.leaf_count(), "derived nested type {}", schema);
        Ok(Self { schema, config })
    }

    /// Returns the schema every matching value has.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the traversal configuration used by every operation.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Returns true if `value` has exactly this shape and these leaf types.
    pub fn matches(&self, value: &Value) -> bool {
        match derive_schema(value, &self.config) {
            Ok(schema) => schema == self.schema,
            Err(_) => false,
        }
    }

    /// Fails with `Error::TypeMismatch`, carrying both schemas, unless `value`
    /// matches this type.
    pub fn check(&self, value: &Value) -> Result<()> {
        let actual = derive_schema(value, &self.config)?;
        if actual != self.schema {
            debug!(expected = %self.schema, actual = %actual, "nested type mismatch");
            return Err(Error::type_mismatch(self.schema.clone(), actual));
        }
        Ok(())
    }

    /// Leaf values of a matching `value`, in depth-first order.
    pub fn leaves_of(&self, value: &Value) -> Result<Vec<Value>> {
        self.check(value)?;
        extract_leaves(value, &self.config)
    }

    /// Rebuilds a value of this type from a flat sequence of leaves.
    pub fn fill<I>(&self, leaves: I, check_types: bool) -> Result<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        fill_schema(&self.schema, leaves, check_types, &self.config)
    }

    /// Number of leaves a value of this type holds.
    pub fn leaf_count(&self) -> usize {
        self.schema.leaf_count()
    }
}

impl PartialEq for NestedType {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl Eq for NestedType {}

impl fmt::Display for NestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NestedType({})", self.schema)
    }
}
