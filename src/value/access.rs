// Key-chain access into nested values

use std::fmt;

use crate::internal::error::{Error, Result};
use crate::value::types::{Key, Value};

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Position in a sequence, or an integer key in a mapping
    Index(usize),
    /// Mapping key
    Key(Key),
    /// Attribute of an object, or a text key in a mapping
    Attr(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Index(i) => write!(f, "[{}]", i),
            Step::Key(k) => write!(f, "[{}]", k),
            Step::Attr(name) => write!(f, ".{}", name),
        }
    }
}

impl From<usize> for Step {
    fn from(i: usize) -> Self {
        Step::Index(i)
    }
}

impl From<&str> for Step {
    fn from(s: &str) -> Self {
        Step::Key(Key::from(s))
    }
}

impl From<Key> for Step {
    fn from(k: Key) -> Self {
        Step::Key(k)
    }
}

/// Follows a chain of steps from `root`, returning the value it reaches.
///
/// An empty chain returns `root` itself.
pub fn get_nested<'a>(root: &'a Value, steps: &[Step]) -> Result<&'a Value> {
    let mut current = root;
    for (depth, step) in steps.iter().enumerate() {
        current = child(current, step).ok_or_else(|| {
            Error::PathError(format!(
                "No child {} at step {} of {}",
                step,
                depth,
                render_chain(&steps[..depth])
            ))
        })?;
    }
    Ok(current)
}

fn child<'a>(value: &'a Value, step: &Step) -> Option<&'a Value> {
    match (value, step) {
        (Value::List(items) | Value::Tuple(items), Step::Index(i)) => items.get(*i),
        (Value::List(items) | Value::Tuple(items), Step::Key(Key::Int(i))) => {
            usize::try_from(*i).ok().and_then(|i| items.get(i))
        }
        (Value::Map(m), Step::Index(i)) => i64::try_from(*i).ok().and_then(|i| m.get(&Key::Int(i))),
        (Value::Map(m), Step::Key(k)) => m.get(k),
        (Value::Map(m), Step::Attr(name)) => m.get(&Key::Str(name.clone())),
        (Value::Object(r), Step::Attr(name)) => r.attr(name),
        _ => None,
    }
}

fn render_chain(steps: &[Step]) -> String {
    if steps.is_empty() {
        return "the root".to_string();
    }
    steps.iter().map(|s| s.to_string()).collect()
}
