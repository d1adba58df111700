// Schema type system for nestype
//
// A schema is a value with every leaf replaced by its type tag. Container
// nodes keep their kind, length, key set and mapping order contract, so a
// schema fully describes the shape a conforming value must have.

use std::cmp::Ordering;
use std::fmt;

use crate::value::{Key, MapOrder, TypeTag};

/// The kinds of container a value can be broken into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    Mapping,
    Set,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Sequence => write!(f, "sequence"),
            ContainerKind::Mapping => write!(f, "mapping"),
            ContainerKind::Set => write!(f, "set"),
        }
    }
}

/// Schema node for a mapping: keys in visiting order plus the order contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSchema {
    order: MapOrder,
    entries: Vec<(Key, Schema)>,
}

impl MapSchema {
    /// Creates a mapping node. `entries` must already be in visiting order.
    pub(crate) fn from_ordered(order: MapOrder, entries: Vec<(Key, Schema)>) -> Self {
        Self { order, entries }
    }

    /// Creates a mapping node from entries in any order.
    ///
    /// Sorted nodes sort their entries by key; insertion nodes keep the given
    /// order. Later duplicates replace earlier ones.
    pub fn new<I, K>(order: MapOrder, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<Key>,
    {
        let mut deduped: Vec<(Key, Schema)> = Vec::new();
        for (k, s) in entries {
            let k = k.into();
            match deduped.iter_mut().find(|(existing, _)| *existing == k) {
                Some(slot) => slot.1 = s,
                None => deduped.push((k, s)),
            }
        }
        if order == MapOrder::Sorted {
            deduped.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        Self {
            order,
            entries: deduped,
        }
    }

    /// Returns the order contract recorded for this node.
    pub fn order(&self) -> MapOrder {
        self.order
    }

    /// Entries in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Schema)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    /// Returns the child schema under `key`.
    pub fn get(&self, key: &Key) -> Option<&Schema> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the node has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structural schema of a nested value.
#[derive(Debug, Clone)]
pub enum Schema {
    /// A leaf position, holding the leaf's type tag
    Leaf(TypeTag),
    List(Vec<Schema>),
    Tuple(Vec<Schema>),
    Map(MapSchema),
    /// Set node; compared as a multiset of child schemas
    Set(Vec<Schema>),
}

impl Schema {
    /// Returns the container kind of this node, or `None` for a leaf.
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Schema::Leaf(_) => None,
            Schema::List(_) | Schema::Tuple(_) => Some(ContainerKind::Sequence),
            Schema::Map(_) => Some(ContainerKind::Mapping),
            Schema::Set(_) => Some(ContainerKind::Set),
        }
    }

    /// Returns true for a leaf position.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Schema::Leaf(_))
    }

    /// Number of leaf positions, i.e. the length of any matching leaf sequence.
    pub fn leaf_count(&self) -> usize {
        match self {
            Schema::Leaf(_) => 1,
            Schema::List(items) | Schema::Tuple(items) | Schema::Set(items) => {
                items.iter().map(Schema::leaf_count).sum()
            }
            Schema::Map(m) => m.iter().map(|(_, s)| s.leaf_count()).sum(),
        }
    }

    /// Type tags of every leaf position, in depth-first order.
    pub fn leaf_tags(&self) -> Vec<&TypeTag> {
        let mut tags = Vec::with_capacity(self.leaf_count());
        self.collect_tags(&mut tags);
        tags
    }

    /// Total order over schemas, consistent with equality.
    ///
    /// Set nodes compare by their children sorted under this same order, so
    /// two set nodes holding the same multiset of children compare equal.
    pub fn canonical_cmp(&self, other: &Schema) -> Ordering {
        match (self, other) {
            (Schema::Leaf(a), Schema::Leaf(b)) => a.cmp(b),
            (Schema::List(a), Schema::List(b)) | (Schema::Tuple(a), Schema::Tuple(b)) => {
                cmp_children(a.iter(), b.iter())
            }
            (Schema::Map(a), Schema::Map(b)) => a.order.cmp(&b.order).then_with(|| {
                let mut left = a.entries.iter();
                let mut right = b.entries.iter();
                loop {
                    match (left.next(), right.next()) {
                        (Some((ka, sa)), Some((kb, sb))) => {
                            let ord = ka.cmp(kb).then_with(|| sa.canonical_cmp(sb));
                            if ord != Ordering::Equal {
                                return ord;
                            }
                        }
                        (l, r) => return l.is_some().cmp(&r.is_some()),
                    }
                }
            }),
            (Schema::Set(a), Schema::Set(b)) => cmp_children(sorted_children(a), sorted_children(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Schema::Leaf(_) => 0,
            Schema::List(_) => 1,
            Schema::Tuple(_) => 2,
            Schema::Map(_) => 3,
            Schema::Set(_) => 4,
        }
    }

    fn collect_tags<'a>(&'a self, tags: &mut Vec<&'a TypeTag>) {
        match self {
            Schema::Leaf(tag) => tags.push(tag),
            Schema::List(items) | Schema::Tuple(items) | Schema::Set(items) => {
                for item in items {
                    item.collect_tags(tags);
                }
            }
            Schema::Map(m) => {
                for (_, s) in m.iter() {
                    s.collect_tags(tags);
                }
            }
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Schema::Leaf(a), Schema::Leaf(b)) => a == b,
            (Schema::List(a), Schema::List(b)) | (Schema::Tuple(a), Schema::Tuple(b)) => a == b,
            (Schema::Map(a), Schema::Map(b)) => a == b,
            (Schema::Set(a), Schema::Set(b)) => multiset_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Schema {}

fn sorted_children(items: &[Schema]) -> impl Iterator<Item = &Schema> {
    let mut sorted: Vec<&Schema> = items.iter().collect();
    sorted.sort_by(|a, b| a.canonical_cmp(b));
    sorted.into_iter()
}

fn cmp_children<'a>(
    mut a: impl Iterator<Item = &'a Schema>,
    mut b: impl Iterator<Item = &'a Schema>,
) -> Ordering {
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                let ord = x.canonical_cmp(y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (x, y) => return x.is_some().cmp(&y.is_some()),
        }
    }
}

fn multiset_eq(a: &[Schema], b: &[Schema]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match b.iter().enumerate().position(|(i, y)| !used[i] && x == y) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Schema]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Leaf(tag) => write!(f, "{}", tag),
            Schema::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Schema::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Schema::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, s)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, s)?;
                }
                write!(f, "}}")
            }
            Schema::Set(items) if items.is_empty() => write!(f, "set()"),
            Schema::Set(items) => {
                write!(f, "{{")?;
                write_items(f, items)?;
                write!(f, "}}")
            }
        }
    }
}
