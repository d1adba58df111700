// Schema filling
//
// Rebuilds a value from a schema and a flat source of leaves. One cursor is
// shared by the whole recursive walk and advanced depth-first, mirroring the
// order of leaf extraction.

use std::sync::Arc;

use crate::internal::error::{Error, Result};
use crate::schema::classifier::{check_depth, TraversalConfig};
use crate::schema::types::Schema;
use crate::value::{Mapping, Value, ValueSet};

/// Shared leaf source for one fill.
struct LeafCursor<I> {
    leaves: I,
    consumed: usize,
    expected: usize,
}

impl<I: Iterator<Item = Value>> LeafCursor<I> {
    fn pull(&mut self) -> Result<Value> {
        match self.leaves.next() {
            Some(leaf) => {
                self.consumed += 1;
                Ok(leaf)
            }
            None => Err(Error::InsufficientData {
                filled: self.consumed,
                expected: self.expected,
            }),
        }
    }
}

/// Fills `schema` with values pulled from `leaves`.
///
/// With `check_types`, every pulled leaf must carry exactly the type tag
/// recorded at its position. The source must be used up exactly: running out
/// early fails with `InsufficientData`, leftovers fail with `ExcessData`.
pub fn fill_schema<I>(
    schema: &Schema,
    leaves: I,
    check_types: bool,
    config: &TraversalConfig,
) -> Result<Value>
where
    I: IntoIterator<Item = Value>,
{
    let expected = schema.leaf_count();
    let mut cursor = LeafCursor {
        leaves: leaves.into_iter(),
        consumed: 0,
        expected,
    };

    let filled = fill_node(schema, &mut cursor, check_types, config.max_depth, 0)?;

    // Only the outermost call checks for leftovers.
    if cursor.leaves.next().is_some() {
        tracing::trace!(expected, "leaf source not exhausted after fill");
        return Err(Error::ExcessData { expected });
    }
    Ok(filled)
}

fn fill_node<I>(
    schema: &Schema,
    cursor: &mut LeafCursor<I>,
    check_types: bool,
    max_depth: usize,
    depth: usize,
) -> Result<Value>
where
    I: Iterator<Item = Value>,
{
    check_depth(depth, max_depth)?;

    match schema {
        Schema::Leaf(tag) => {
            let position = cursor.consumed;
            let leaf = cursor.pull()?;
            if check_types {
                let actual = leaf.type_tag();
                if actual != *tag {
                    return Err(Error::SchemaMismatch {
                        expected: tag.clone(),
                        actual,
                        position,
                    });
                }
            }
            Ok(leaf)
        }
        Schema::List(items) => Ok(Value::List(Arc::new(fill_all(
            items, cursor, check_types, max_depth, depth,
        )?))),
        Schema::Tuple(items) => Ok(Value::Tuple(Arc::new(fill_all(
            items, cursor, check_types, max_depth, depth,
        )?))),
        Schema::Map(node) => {
            let mut mapping = Mapping::new(node.order());
            for (key, child) in node.iter() {
                let value = fill_node(child, cursor, check_types, max_depth, depth + 1)?;
                mapping.insert(key.clone(), value);
            }
            Ok(Value::from(mapping))
        }
        Schema::Set(items) => {
            let elements = fill_all(items, cursor, check_types, max_depth, depth)?;
            let set = ValueSet::from_values(elements);
            if set.len() != items.len() {
                return Err(Error::DuplicateSetElements {
                    expected: items.len(),
                    distinct: set.len(),
                });
            }
            Ok(Value::from(set))
        }
    }
}

fn fill_all<I>(
    items: &[Schema],
    cursor: &mut LeafCursor<I>,
    check_types: bool,
    max_depth: usize,
    depth: usize,
) -> Result<Vec<Value>>
where
    I: Iterator<Item = Value>,
{
    items
        .iter()
        .map(|child| fill_node(child, cursor, check_types, max_depth, depth + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::classifier::SetOrder;
    use crate::schema::inference::derive_schema;
    use crate::schema::leaves::extract_leaves;
    use crate::value::{NdArray, Record, TypeTag};

    fn sample() -> Value {
        Value::list(vec![
            Value::from(1),
            Value::from(2),
            Value::from(
                Mapping::sorted()
                    .with("a", Value::tuple([3, 4]))
                    .with("b", "x"),
            ),
        ])
    }

    fn nines(tail: Value) -> Vec<Value> {
        vec![Value::from(9), Value::from(9), Value::from(9), Value::from(9), tail]
    }

    #[test]
    fn test_fill_rebuilds_shape() {
        let config = TraversalConfig::default();
        let schema = derive_schema(&sample(), &config).unwrap();
        let filled = fill_schema(&schema, nines(Value::from("z")), true, &config).unwrap();

        let expected = Value::list(vec![
            Value::from(9),
            Value::from(9),
            Value::from(
                Mapping::sorted()
                    .with("a", Value::tuple([9, 9]))
                    .with("b", "z"),
            ),
        ]);
        assert_eq!(filled, expected);
    }

    #[test]
    fn test_fill_type_check() {
        let config = TraversalConfig::default();
        let schema = derive_schema(&sample(), &config).unwrap();

        let err = fill_schema(&schema, nines(Value::from(9)), true, &config).unwrap_err();
        assert_eq!(
            err,
            Error::SchemaMismatch {
                expected: TypeTag::Str,
                actual: TypeTag::Int,
                position: 4,
            }
        );

        // Without the check the wrong-typed leaf is accepted as is.
        let filled = fill_schema(&schema, nines(Value::from(9)), false, &config).unwrap();
        assert_eq!(extract_leaves(&filled, &config).unwrap(), nines(Value::from(9)));
    }

    #[test]
    fn test_fill_insufficient_data() {
        let config = TraversalConfig::default();
        let schema = derive_schema(&sample(), &config).unwrap();
        let err = fill_schema(&schema, vec![Value::from(9); 3], true, &config).unwrap_err();
        assert_eq!(err, Error::InsufficientData { filled: 3, expected: 5 });
    }

    #[test]
    fn test_fill_excess_data() {
        let config = TraversalConfig::default();
        let schema = derive_schema(&sample(), &config).unwrap();
        let mut leaves = nines(Value::from("z"));
        leaves.push(Value::from(9));
        let err = fill_schema(&schema, leaves, true, &config).unwrap_err();
        assert_eq!(err, Error::ExcessData { expected: 5 });
    }

    #[test]
    fn test_round_trip_with_opaque_leaves_and_sets() {
        let config = TraversalConfig::new().with_set_order(SetOrder::Canonical);
        let v = Value::from(
            Mapping::insertion()
                .with("weights", NdArray::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap())
                .with("meta", Record::new("Meta").with_attr("epoch", 3))
                .with("tags", ValueSet::from_values(["b", "a"]))
                .with("history", Value::list(vec![Value::tuple([0.5, 0.25]), Value::tuple([0.125, 0.0625])])),
        );
        let schema = derive_schema(&v, &config).unwrap();
        let leaves = extract_leaves(&v, &config).unwrap();
        assert_eq!(fill_schema(&schema, leaves, true, &config).unwrap(), v);
    }

    #[test]
    fn test_set_fill_rejects_equal_elements() {
        let config = TraversalConfig::new().with_set_order(SetOrder::Canonical);
        let schema = derive_schema(&Value::from(ValueSet::from_values([1, 2])), &config).unwrap();

        let err = fill_schema(&schema, vec![Value::from(9), Value::from(9)], true, &config).unwrap_err();
        assert_eq!(err, Error::DuplicateSetElements { expected: 2, distinct: 1 });

        let filled = fill_schema(&schema, vec![Value::from(9), Value::from(8)], true, &config).unwrap();
        assert_eq!(filled, Value::from(ValueSet::from_values([8, 9])));
    }

    #[test]
    fn test_set_leaves_line_up_with_schema_children() {
        let config = TraversalConfig::new().with_set_order(SetOrder::Canonical);
        let sample = Value::from(ValueSet::from_values(vec![
            Value::tuple(vec![Value::from(1), Value::from("a")]),
            Value::tuple(vec![Value::from(2), Value::from(3)]),
        ]));
        let other = Value::from(ValueSet::from_values(vec![
            Value::tuple(vec![Value::from(1), Value::from(5)]),
            Value::tuple(vec![Value::from(2), Value::from("b")]),
        ]));
        let schema = derive_schema(&sample, &config).unwrap();
        assert_eq!(derive_schema(&other, &config).unwrap(), schema);

        let leaves = extract_leaves(&other, &config).unwrap();
        assert_eq!(
            leaves,
            vec![Value::from(1), Value::from(5), Value::from(2), Value::from("b")]
        );
        assert_eq!(fill_schema(&schema, leaves, true, &config).unwrap(), other);
    }

    #[test]
    fn test_leaf_schema_fills_from_single_value() {
        let config = TraversalConfig::default();
        let schema = Schema::Leaf(TypeTag::Float);
        assert_eq!(
            fill_schema(&schema, vec![Value::from(1.5)], true, &config).unwrap(),
            Value::from(1.5)
        );
        assert!(fill_schema(&schema, Vec::new(), true, &config).is_err());
    }

    #[test]
    fn test_empty_schema_takes_no_leaves() {
        let config = TraversalConfig::default();
        let schema = Schema::List(vec![]);
        assert_eq!(
            fill_schema(&schema, Vec::new(), true, &config).unwrap(),
            Value::list(Vec::<Value>::new())
        );
        assert_eq!(
            fill_schema(&schema, vec![Value::Null], true, &config).unwrap_err(),
            Error::ExcessData { expected: 0 }
        );
    }
}
