// Leaf extraction
//
// Flattens a value into its leaves in depth-first order. The visiting order
// must match `inference::derive_schema` exactly, otherwise extracted leaves
// would not line up with the schema used to fill them back in.

use crate::internal::error::{Error, Result};
use crate::schema::classifier::{classify, Node, TraversalConfig};
use crate::schema::inference::arrange_set;
use crate::value::Value;

/// Collects the leaf values of `value` in depth-first order.
///
/// Mappings are visited in their canonical order. Sets have no inherent
/// order, so extraction from a set fails with `Error::Ordering` unless
/// `config.set_order` supplies one. Set elements are then visited sorted by
/// their own schema first, matching the child order of derived set nodes.
pub fn extract_leaves(value: &Value, config: &TraversalConfig) -> Result<Vec<Value>> {
    let mut leaves = Vec::new();
    extract_into(value, config, 0, &mut leaves)?;
    Ok(leaves)
}

fn extract_into(
    value: &Value,
    config: &TraversalConfig,
    depth: usize,
    leaves: &mut Vec<Value>,
) -> Result<()> {
    config.enter(depth)?;

    match classify(value, config.kinds) {
        Node::Sequence(_, items) => {
            for item in items {
                extract_into(item, config, depth + 1, leaves)?;
            }
        }
        Node::Mapping(mapping) => {
            for item in mapping.values() {
                extract_into(item, config, depth + 1, leaves)?;
            }
        }
        Node::Set(set) => {
            if !config.set_order.is_ordered() {
                return Err(Error::Ordering(format!(
                    "Have no way to consistently extract leaf values from a set of {} elements; \
                     configure a set order",
                    set.len()
                )));
            }
            for (_, item) in arrange_set(set, config, depth)? {
                extract_into(item, config, depth + 1, leaves)?;
            }
        }
        Node::Leaf(leaf) => leaves.push(leaf.clone()),
    }
    Ok(())
}
