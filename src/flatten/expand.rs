// Path-key expansion
//
// The inverse of flattening: builds a nested value from `(path, leaf)` pairs.
// Entries are inserted into an intermediate tree in one pass, then each branch
// becomes a list (when its steps are exactly the indices `0..n`) or a
// key-sorted mapping.

use crate::flatten::flattener::{FlatValue, PathEntry};
use crate::flatten::path::Path;
use crate::internal::error::{Error, Result};
use crate::schema::classifier::MAX_NESTING_DEPTH;
use crate::value::{Key, Mapping, Step, Value};

enum Slot {
    Leaf(Value),
    /// Children in first-seen order
    Branch(Vec<(Step, Slot)>),
}

/// Expands `(path string, leaf)` pairs such as `("['a'][0].b", 1)` into a
/// nested value.
pub fn expand_paths<I, P>(entries: I) -> Result<Value>
where
    I: IntoIterator<Item = (P, Value)>,
    P: AsRef<str>,
{
    let parsed = entries
        .into_iter()
        .map(|(p, v)| Ok((p.as_ref().parse::<Path>()?, v)))
        .collect::<Result<Vec<_>>>()?;
    expand(parsed)
}

/// Expands flattener output back into a nested value.
///
/// Fails on `AlreadySeen` entries, which carry no leaf to put back.
pub fn expand_entries(entries: &[PathEntry]) -> Result<Value> {
    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path.clone().unwrap_or_default();
        match &entry.value {
            FlatValue::Leaf(v) => pairs.push((path, v.clone())),
            FlatValue::AlreadySeen { .. } => {
                return Err(Error::PathError(format!(
                    "Cannot expand repeated sub-object at {:?}",
                    path.to_string()
                )))
            }
        }
    }
    expand(pairs)
}

/// Expands parsed `(path, leaf)` pairs into a nested value.
///
/// An empty input gives an empty mapping; a single entry with the empty path
/// gives that leaf. A path that lands on or under an existing leaf, or that
/// repeats, fails with `Error::PathError`.
pub fn expand<I>(entries: I) -> Result<Value>
where
    I: IntoIterator<Item = (Path, Value)>,
{
    let mut root: Option<Slot> = None;

    for (path, value) in entries {
        if path.steps().len() > MAX_NESTING_DEPTH {
            return Err(Error::DepthExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        if path.is_empty() {
            if root.is_some() {
                return Err(conflict(&path));
            }
            root = Some(Slot::Leaf(value));
            continue;
        }
        let node = root.get_or_insert_with(|| Slot::Branch(Vec::new()));
        insert_at(node, path.steps(), value, &path)?;
    }

    match root {
        Some(slot) => finish(slot),
        None => Ok(Value::from(Mapping::sorted())),
    }
}

fn insert_at(node: &mut Slot, steps: &[Step], value: Value, path: &Path) -> Result<()> {
    let children = match node {
        Slot::Branch(children) => children,
        Slot::Leaf(_) => return Err(conflict(path)),
    };
    let (step, rest) = match steps.split_first() {
        Some(split) => split,
        None => return Err(conflict(path)),
    };

    let existing = children.iter().position(|(s, _)| s == step);
    if rest.is_empty() {
        if existing.is_some() {
            return Err(conflict(path));
        }
        children.push((step.clone(), Slot::Leaf(value)));
        return Ok(());
    }

    let pos = match existing {
        Some(pos) => pos,
        None => {
            children.push((step.clone(), Slot::Branch(Vec::new())));
            children.len() - 1
        }
    };
    insert_at(&mut children[pos].1, rest, value, path)
}

fn finish(slot: Slot) -> Result<Value> {
    let children = match slot {
        Slot::Leaf(value) => return Ok(value),
        Slot::Branch(children) => children,
    };

    if let Some(order) = dense_indices(&children) {
        let mut items: Vec<Option<Slot>> = children.into_iter().map(|(_, s)| Some(s)).collect();
        let mut list = Vec::with_capacity(items.len());
        for pos in order {
            if let Some(slot) = items[pos].take() {
                list.push(finish(slot)?);
            }
        }
        return Ok(Value::from(list));
    }

    let mut mapping = Mapping::sorted();
    for (step, child) in children {
        let key = step_key(&step);
        if mapping.contains_key(&key) {
            return Err(Error::PathError(format!("Key {} is given more than once", key)));
        }
        mapping.insert(key, finish(child)?);
    }
    Ok(Value::from(mapping))
}

/// If every step is an index and together they are exactly `0..n`, returns
/// the child positions in index order.
fn dense_indices(children: &[(Step, Slot)]) -> Option<Vec<usize>> {
    let mut by_index = vec![None; children.len()];
    for (pos, (step, _)) in children.iter().enumerate() {
        match step {
            Step::Index(i) if *i < children.len() && by_index[*i].is_none() => by_index[*i] = Some(pos),
            _ => return None,
        }
    }
    by_index.into_iter().collect()
}

fn step_key(step: &Step) -> Key {
    match step {
        Step::Index(i) => Key::Int(*i as i64),
        Step::Key(k) => k.clone(),
        Step::Attr(name) => Key::Str(name.clone()),
    }
}

fn conflict(path: &Path) -> Error {
    Error::PathError(format!("Conflicting entry at path {:?}", path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flattener::Flattener;

    #[test]
    fn test_expand_builds_lists_and_maps() {
        let v = expand_paths(vec![
            ("['a'][1]", Value::from(2)),
            ("['a'][0]", Value::from(1)),
            ("['b'].c", Value::from("x")),
        ])
        .unwrap();

        let expected = Value::from(
            Mapping::sorted()
                .with("a", Value::list([1, 2]))
                .with("b", Mapping::sorted().with("c", "x")),
        );
        assert_eq!(v, expected);
    }

    #[test]
    fn test_sparse_indices_become_int_keys() {
        let v = expand_paths(vec![("[0]", Value::from("a")), ("[2]", Value::from("c"))]).unwrap();
        let expected = Value::from(Mapping::sorted().with(0, "a").with(2, "c"));
        assert_eq!(v, expected);
    }

    #[test]
    fn test_root_leaf_and_empty_input() {
        assert_eq!(expand_paths(vec![("", Value::from(5))]).unwrap(), Value::from(5));
        assert_eq!(
            expand_paths(Vec::<(&str, Value)>::new()).unwrap(),
            Value::from(Mapping::sorted())
        );
    }

    #[test]
    fn test_conflicting_paths() {
        assert!(expand_paths(vec![("['a']", Value::from(1)), ("['a'][0]", Value::from(2))]).is_err());
        assert!(expand_paths(vec![("['a'][0]", Value::from(1)), ("['a']", Value::from(2))]).is_err());
        assert!(expand_paths(vec![("[0]", Value::from(1)), ("[0]", Value::from(2))]).is_err());
        assert!(expand_paths(vec![(".a", Value::from(1)), ("['a']", Value::from(2))]).is_err());
        assert!(expand_paths(vec![("", Value::from(1)), ("[0]", Value::from(2))]).is_err());
    }

    #[test]
    fn test_expand_inverts_flatten() {
        let v = Value::from(
            Mapping::sorted()
                .with("layers", Value::list(vec![
                    Value::from(Mapping::sorted().with("units", 64).with("act", "relu")),
                    Value::from(Mapping::sorted().with("units", 10).with("act", "softmax")),
                ]))
                .with("lr", 0.01),
        );
        let entries = Flattener::new().flatten(&v).unwrap();
        assert_eq!(expand_entries(&entries).unwrap(), v);
    }

    #[test]
    fn test_rendered_paths_with_quoted_keys_expand_back() {
        let v = Value::from(
            Mapping::sorted()
                .with("a']b", 1)
                .with("back\\slash", Value::list(["x"])),
        );
        let entries = Flattener::new().flatten(&v).unwrap();
        let rendered: Vec<(String, Value)> = entries
            .iter()
            .map(|e| match &e.value {
                FlatValue::Leaf(leaf) => (e.path_string(), leaf.clone()),
                other => panic!("Expected a leaf, got {}", other),
            })
            .collect();
        assert_eq!(rendered[0].0, "['a\\']b']");
        assert_eq!(expand_paths(rendered).unwrap(), v);
    }

    #[test]
    fn test_repeats_cannot_be_expanded() {
        let shared = Value::list([1]);
        let v = Value::list(vec![shared.clone(), shared]);
        let entries = Flattener::new().flatten(&v).unwrap();
        assert!(matches!(expand_entries(&entries), Err(Error::PathError(_))));
    }
}
