// Schema derivation for nestype
//
// This module derives a schema from a sample value: containers are rebuilt
// node for node, leaves are replaced by their type tags.

use crate::internal::error::Result;
use crate::schema::classifier::{classify, Node, SeqKind, TraversalConfig};
use crate::schema::types::{MapSchema, Schema};
use crate::value::{Value, ValueSet};

/// Derives the schema of `value`.
///
/// Mapping entries are visited in the mapping's canonical order. Set elements
/// are sorted by their own schema first and by `config.set_order` second
/// (storage order when unordered), which is the same order leaf extraction
/// uses.
pub fn derive_schema(value: &Value, config: &TraversalConfig) -> Result<Schema> {
    derive_at(value, config, 0)
}

fn derive_at(value: &Value, config: &TraversalConfig, depth: usize) -> Result<Schema> {
    config.enter(depth)?;

    match classify(value, config.kinds) {
        Node::Sequence(kind, items) => {
            let children = items
                .iter()
                .map(|item| derive_at(item, config, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            Ok(match kind {
                SeqKind::List => Schema::List(children),
                SeqKind::Tuple => Schema::Tuple(children),
            })
        }
        Node::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, item) in mapping.iter() {
                entries.push((key.clone(), derive_at(item, config, depth + 1)?));
            }
            Ok(Schema::Map(MapSchema::from_ordered(mapping.order(), entries)))
        }
        Node::Set(set) => {
            let children = arrange_set(set, config, depth)?
                .into_iter()
                .map(|(schema, _)| schema)
                .collect();
            Ok(Schema::Set(children))
        }
        Node::Leaf(leaf) => Ok(Schema::Leaf(leaf.type_tag())),
    }
}

/// Elements of a set at `depth` paired with their schemas, sorted by schema
/// and then by the configured set order.
///
/// Two sets with equal schema nodes list their children in the same order
/// here, so leaves pulled in this order line up with the schema's children.
pub(crate) fn arrange_set<'a>(
    set: &'a ValueSet,
    config: &TraversalConfig,
    depth: usize,
) -> Result<Vec<(Schema, &'a Value)>> {
    let mut elements = set
        .iter()
        .map(|item| Ok((derive_at(item, config, depth + 1)?, item)))
        .collect::<Result<Vec<_>>>()?;
    elements.sort_by(|(sa, a), (sb, b)| {
        sa.canonical_cmp(sb)
            .then_with(|| config.set_order.compare(a, b))
    });
    Ok(elements)
}
