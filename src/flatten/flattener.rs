// Path flattener
//
// Walks a nested value and produces `(path, leaf)` entries, where the path is
// the access expression leading from the root to the leaf. Unlike the schema
// machinery it can break into attribute-bearing objects, reduce values with
// custom handlers and report shared sub-objects instead of walking them twice.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::flatten::path::Path;
use crate::internal::error::{Error, Result};
use crate::schema::classifier::{check_depth, SetOrder, MAX_NESTING_DEPTH};
use crate::value::{Step, Value};

/// Decides whether a value is emitted as a leaf.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Reduces a value to the leaf emitted in its place.
pub type Reducer = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// The value half of a path entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// A leaf, or the output of a custom handler
    Leaf(Value),
    /// A sub-object that was already decomposed earlier in the same walk
    AlreadySeen { address: usize },
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Leaf(v) => write!(f, "{}", v),
            FlatValue::AlreadySeen { address } => write!(f, "Already seen object at {:#x}", address),
        }
    }
}

/// One leaf of a flattened value.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// Access expression from the root; `None` when the root itself is the leaf
    pub path: Option<Path>,
    pub value: FlatValue,
}

impl PathEntry {
    /// The rendered path, empty for the root.
    pub fn path_string(&self) -> String {
        self.path.as_ref().map(Path::to_string).unwrap_or_default()
    }
}

/// Default leaf predicate: numbers, booleans, text, bytes and opaque arrays.
pub fn is_default_leaf(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bytes(_) | Value::NdArray(_)
    )
}

/// Configurable path flattener.
///
/// ```
/// use nestype::{Flattener, Mapping, Value};
///
/// let v = Value::list(vec![Value::from(1), Value::from(Mapping::sorted().with("a", "x"))]);
/// let paths: Vec<String> = Flattener::new()
///     .flatten(&v)
///     .unwrap()
///     .iter()
///     .map(|e| format!("{} = {}", e.path_string(), e.value))
///     .collect();
/// assert_eq!(paths, vec!["[0] = 1", "[1]['a'] = 'x'"]);
/// ```
#[derive(Clone)]
pub struct Flattener {
    leaf_predicate: Predicate,
    handlers: Vec<(Predicate, Reducer)>,
    expand_objects: bool,
    detect_repeats: bool,
    set_order: SetOrder,
    max_depth: usize,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            leaf_predicate: Arc::new(is_default_leaf),
            handlers: Vec::new(),
            expand_objects: true,
            detect_repeats: true,
            set_order: SetOrder::Canonical,
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl fmt::Debug for Flattener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flattener")
            .field("handlers", &self.handlers.len())
            .field("expand_objects", &self.expand_objects)
            .field("detect_repeats", &self.detect_repeats)
            .field("set_order", &self.set_order)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Flattener {
    /// Creates a flattener with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the leaf predicate.
    pub fn leaf_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.leaf_predicate = Arc::new(predicate);
        self
    }

    /// Registers a custom handler. Handlers are tried in registration order,
    /// after the leaf predicate; the first match wins.
    pub fn handler<P, R>(mut self, predicate: P, reducer: R) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
        R: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let predicate: Predicate = Arc::new(predicate);
        let reducer: Reducer = Arc::new(reducer);
        self.handlers.push((predicate, reducer));
        self
    }

    /// Whether attribute-bearing objects are broken into `.attribute` entries.
    pub fn expand_objects(mut self, expand: bool) -> Self {
        self.expand_objects = expand;
        self
    }

    /// Whether a sub-object seen earlier in the walk is reported instead of
    /// decomposed again.
    pub fn detect_repeats(mut self, detect: bool) -> Self {
        self.detect_repeats = detect;
        self
    }

    /// Sets the order in which set elements are walked.
    pub fn set_order(mut self, order: SetOrder) -> Self {
        self.set_order = order;
        self
    }

    /// Sets the nesting limit.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Flattens `value` into path entries in depth-first order.
    pub fn flatten(&self, value: &Value) -> Result<Vec<PathEntry>> {
        let mut walk = Walk {
            flattener: self,
            memo: HashSet::new(),
            prefix: Vec::new(),
            entries: Vec::new(),
        };
        walk.visit(value, 0)?;
        trace!(entries = walk.entries.len(), "flattened value");
        Ok(walk.entries)
    }
}

/// State of one top-level flatten call. The memo dies with it.
struct Walk<'f> {
    flattener: &'f Flattener,
    memo: HashSet<usize>,
    prefix: Vec<Step>,
    entries: Vec<PathEntry>,
}

impl Walk<'_> {
    fn emit(&mut self, value: FlatValue) {
        let path = if self.prefix.is_empty() {
            None
        } else {
            Some(Path::new(self.prefix.clone()))
        };
        self.entries.push(PathEntry { path, value });
    }

    fn visit_child(&mut self, step: Step, value: &Value, depth: usize) -> Result<()> {
        self.prefix.push(step);
        let result = self.visit(value, depth + 1);
        self.prefix.pop();
        result
    }

    fn visit(&mut self, value: &Value, depth: usize) -> Result<()> {
        let flattener = self.flattener;
        check_depth(depth, flattener.max_depth)?;

        if (flattener.leaf_predicate)(value) {
            self.emit(FlatValue::Leaf(value.clone()));
            return Ok(());
        }

        if let Some((_, reducer)) = flattener.handlers.iter().find(|(applies, _)| applies(value)) {
            let reduced = reducer(value);
            self.emit(FlatValue::Leaf(reduced));
            return Ok(());
        }

        let decomposable = match value {
            Value::List(_) | Value::Tuple(_) | Value::Map(_) | Value::Set(_) => true,
            Value::Object(_) => flattener.expand_objects,
            _ => false,
        };
        if !decomposable {
            if let Value::Object(_) = value {
                self.emit(FlatValue::Leaf(value.clone()));
            }
            // Nulls and anything the leaf predicate rejected contribute nothing.
            return Ok(());
        }

        if flattener.detect_repeats {
            if let Some(address) = value.identity() {
                if !self.memo.insert(address) {
                    debug!(path = %Path::new(self.prefix.clone()), "repeated sub-object");
                    self.emit(FlatValue::AlreadySeen { address });
                    return Ok(());
                }
            }
        }

        match value {
            Value::List(items) | Value::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.visit_child(Step::Index(i), item, depth)?;
                }
            }
            Value::Map(mapping) => {
                for (key, item) in mapping.iter() {
                    self.visit_child(Step::Key(key.clone()), item, depth)?;
                }
            }
            Value::Set(set) => {
                let ordered = flattener.set_order.arrange(set).ok_or_else(|| {
                    Error::Ordering("Cannot flatten a set without a set order".to_string())
                })?;
                for (i, item) in ordered.into_iter().enumerate() {
                    self.visit_child(Step::Index(i), item, depth)?;
                }
            }
            Value::Object(record) => {
                for (name, item) in record.attrs() {
                    self.visit_child(Step::Attr(name.to_string()), item, depth)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
