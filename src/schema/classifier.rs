// Container classifier and traversal configuration
//
// Every traversal in the crate starts by classifying a value into one of the
// closed variants of `Node`. The recognized container kinds, set ordering and
// recursion limit travel together in `TraversalConfig`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::internal::error::{Error, Result};
use crate::schema::types::ContainerKind;
use crate::value::{Mapping, Value, ValueSet};

/// Default recursion limit for every traversal.
pub const MAX_NESTING_DEPTH: usize = 128;

bitflags! {
    /// Set of container kinds a traversal breaks into.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContainerKinds: u8 {
        const SEQUENCE = 0b001;
        const MAPPING = 0b010;
        const SET = 0b100;
    }
}

impl ContainerKinds {
    /// Returns true if containers of `kind` are broken down.
    pub fn recognizes(&self, kind: ContainerKind) -> bool {
        match kind {
            ContainerKind::Sequence => self.contains(ContainerKinds::SEQUENCE),
            ContainerKind::Mapping => self.contains(ContainerKinds::MAPPING),
            ContainerKind::Set => self.contains(ContainerKinds::SET),
        }
    }
}

impl Default for ContainerKinds {
    fn default() -> Self {
        ContainerKinds::all()
    }
}

/// Comparison function for custom set orderings.
pub type SetComparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// How set elements are ordered when a traversal has to visit them in sequence.
#[derive(Clone, Default)]
pub enum SetOrder {
    /// No order: leaf extraction from a set fails with `Error::Ordering`
    #[default]
    Unordered,
    /// Sort by [`Value::canonical_cmp`]
    Canonical,
    /// Sort by a caller-supplied comparison
    Custom(SetComparator),
}

impl SetOrder {
    /// Creates a custom ordering from a comparison function.
    pub fn custom<F>(cmp: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        SetOrder::Custom(Arc::new(cmp))
    }

    /// Elements of `set` in this order, or `None` when unordered.
    pub fn arrange<'a>(&self, set: &'a ValueSet) -> Option<Vec<&'a Value>> {
        match self {
            SetOrder::Unordered => None,
            SetOrder::Canonical => Some(set.sorted_by(Value::canonical_cmp)),
            SetOrder::Custom(cmp) => Some(set.sorted_by(|a, b| cmp(a, b))),
        }
    }

    /// Compares two elements under this order. Unordered treats every pair as
    /// equal, so a stable sort keeps storage order.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            SetOrder::Unordered => Ordering::Equal,
            SetOrder::Canonical => a.canonical_cmp(b),
            SetOrder::Custom(cmp) => cmp(a, b),
        }
    }

    /// Returns false for `SetOrder::Unordered`.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, SetOrder::Unordered)
    }
}

impl fmt::Debug for SetOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOrder::Unordered => write!(f, "Unordered"),
            SetOrder::Canonical => write!(f, "Canonical"),
            SetOrder::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Configuration shared by schema derivation, leaf extraction and filling.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Container kinds to break into; anything else is a leaf
    pub kinds: ContainerKinds,

    /// Order used when visiting set elements
    pub set_order: SetOrder,

    /// Maximum nesting depth before failing with `Error::DepthExceeded`
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            kinds: ContainerKinds::default(),
            set_order: SetOrder::default(),
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl TraversalConfig {
    /// Creates a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container kinds to break into.
    pub fn with_kinds(mut self, kinds: ContainerKinds) -> Self {
        self.kinds = kinds;
        self
    }

    /// Sets the order used for set elements.
    pub fn with_set_order(mut self, set_order: SetOrder) -> Self {
        self.set_order = set_order;
        self
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fails once `depth` goes past the configured limit.
    pub(crate) fn enter(&self, depth: usize) -> Result<()> {
        check_depth(depth, self.max_depth)
    }
}

pub(crate) fn check_depth(depth: usize, limit: usize) -> Result<()> {
    if depth > limit {
        tracing::trace!(depth, limit, "nesting limit hit");
        return Err(Error::DepthExceeded { limit });
    }
    Ok(())
}

/// Flavour of a sequence container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqKind {
    List,
    Tuple,
}

/// A value classified for traversal.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Sequence(SeqKind, &'a [Value]),
    Mapping(&'a Mapping),
    Set(&'a ValueSet),
    Leaf(&'a Value),
}

/// Classifies `value` against the recognized container kinds.
pub fn classify(value: &Value, kinds: ContainerKinds) -> Node<'_> {
    match value {
        Value::List(items) if kinds.recognizes(ContainerKind::Sequence) => {
            Node::Sequence(SeqKind::List, items.as_slice())
        }
        Value::Tuple(items) if kinds.recognizes(ContainerKind::Sequence) => {
            Node::Sequence(SeqKind::Tuple, items.as_slice())
        }
        Value::Map(m) if kinds.recognizes(ContainerKind::Mapping) => Node::Mapping(m),
        Value::Set(s) if kinds.recognizes(ContainerKind::Set) => Node::Set(s),
        other => Node::Leaf(other),
    }
}

/// Returns true if `value` is broken down further under `kinds`.
pub fn is_container(value: &Value, kinds: ContainerKinds) -> bool {
    !matches!(classify(value, kinds), Node::Leaf(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{NdArray, Record};

    #[test]
    fn test_default_kinds_recognize_all_containers() {
        let kinds = ContainerKinds::default();
        assert!(is_container(&Value::list([1]), kinds));
        assert!(is_container(&Value::tuple([1]), kinds));
        assert!(is_container(&Value::from(Mapping::sorted()), kinds));
        assert!(is_container(&Value::from(ValueSet::new()), kinds));
    }

    #[test]
    fn test_leaves_are_never_containers() {
        let kinds = ContainerKinds::all();
        assert!(!is_container(&Value::Int(1), kinds));
        assert!(!is_container(&Value::from("text"), kinds));
        assert!(!is_container(&Value::Null, kinds));
        assert!(!is_container(&Value::from(NdArray::from_vec(vec![1.0, 2.0])), kinds));
        assert!(!is_container(&Value::from(Record::new("Point")), kinds));
    }

    #[test]
    fn test_unrecognized_kinds_become_leaves() {
        let kinds = ContainerKinds::SEQUENCE;
        assert!(is_container(&Value::list([1]), kinds));
        assert!(!is_container(&Value::from(Mapping::sorted()), kinds));
        assert!(!is_container(&Value::from(ValueSet::new()), kinds));
        assert!(matches!(classify(&Value::tuple([1]), kinds), Node::Sequence(SeqKind::Tuple, _)));
    }

    #[test]
    fn test_set_order_arrange() {
        let set = ValueSet::from_values([3, 1, 2]);
        assert!(SetOrder::Unordered.arrange(&set).is_none());

        let canonical: Vec<Value> = SetOrder::Canonical.arrange(&set).unwrap().into_iter().cloned().collect();
        assert_eq!(canonical, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);

        let reversed = SetOrder::custom(|a, b| b.canonical_cmp(a));
        let desc: Vec<Value> = reversed.arrange(&set).unwrap().into_iter().cloned().collect();
        assert_eq!(desc, vec![Value::Int(3), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_depth_guard() {
        let config = TraversalConfig::new().with_max_depth(2);
        assert!(config.enter(2).is_ok());
        assert_eq!(config.enter(3), Err(Error::DepthExceeded { limit: 2 }));
    }
}
