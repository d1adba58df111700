// Value model for nestype
//
// This module defines the in-memory values walked by the schema and flatten
// modules: scalar leaves, opaque arrays, attribute-bearing objects and the
// reference-counted containers built from them.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::value::containers::{Mapping, ValueSet};

/// Identifies the runtime type of a value.
///
/// Schemas store one tag per leaf position; the filler compares tags to decide
/// whether a replacement leaf fits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    NdArray,
    List,
    Tuple,
    Map,
    Set,
    /// Attribute-bearing object, tagged by its type name
    Object(String),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Null => write!(f, "null"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Str => write!(f, "str"),
            TypeTag::Bytes => write!(f, "bytes"),
            TypeTag::NdArray => write!(f, "ndarray"),
            TypeTag::List => write!(f, "list"),
            TypeTag::Tuple => write!(f, "tuple"),
            TypeTag::Map => write!(f, "map"),
            TypeTag::Set => write!(f, "set"),
            TypeTag::Object(name) => write!(f, "{}", name),
        }
    }
}

/// A mapping key.
///
/// Keys are totally ordered so that sorted mappings have one canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Key {
    /// Converts the key back into a leaf value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::Int(*i),
            Key::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    if c == '\'' || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "'")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

/// An opaque numeric array. Always a leaf: never broken into per-element values.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Creates an array with the given shape, or `None` if the data length
    /// does not match the product of the dimensions.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Option<Self> {
        if shape.iter().product::<usize>() != data.len() {
            return None;
        }
        Some(Self { shape, data })
    }

    /// Creates a one-dimensional array.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Returns the dimensions, outermost first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the elements in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// An object carrying named attributes.
///
/// Schemas treat records as leaves tagged by `type_name`; the path flattener
/// can break them into `.attribute` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    attrs: Vec<(String, Value)>,
}

impl Record {
    /// Creates a record with no attributes.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: Vec::new(),
        }
    }

    /// Sets an attribute, replacing an existing one of the same name in place.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Returns the type name used as the record's leaf tag.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Attributes in definition order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// A nested value.
///
/// Containers, arrays and records sit behind `Arc`, so cloning a value shares
/// the sub-object instead of copying it. The `Arc` address is the object's
/// identity (see [`Value::identity`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Bytes),
    NdArray(Arc<NdArray>),
    /// Mutable sequence
    List(Arc<Vec<Value>>),
    /// Immutable sequence
    Tuple(Arc<Vec<Value>>),
    Map(Arc<Mapping>),
    Set(Arc<ValueSet>),
    Object(Arc<Record>),
}

impl Value {
    /// Returns the runtime type tag of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::NdArray(_) => TypeTag::NdArray,
            Value::List(_) => TypeTag::List,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Map(_) => TypeTag::Map,
            Value::Set(_) => TypeTag::Set,
            Value::Object(record) => TypeTag::Object(record.type_name().to_string()),
        }
    }

    /// Identity of a shared sub-object, or `None` for inline scalars.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::NdArray(a) => Some(Arc::as_ptr(a) as *const () as usize),
            Value::List(items) | Value::Tuple(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Map(m) => Some(Arc::as_ptr(m) as *const () as usize),
            Value::Set(s) => Some(Arc::as_ptr(s) as *const () as usize),
            Value::Object(r) => Some(Arc::as_ptr(r) as *const () as usize),
            _ => None,
        }
    }

    /// Builds a list from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds a tuple from anything convertible into values.
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total order used by `SetOrder::Canonical`.
    ///
    /// Values of different types order by type first; floats use IEEE total
    /// ordering; sets compare by their canonically sorted elements.
    pub fn canonical_cmp(&self, other: &Value) -> Ordering {
        let rank = self.rank().cmp(&other.rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::NdArray(a), Value::NdArray(b)) => a.shape.cmp(&b.shape).then_with(|| {
                cmp_slices(a.data.as_slice(), b.data.as_slice(), |x, y| x.total_cmp(y))
            }),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                cmp_slices(a.as_slice(), b.as_slice(), Value::canonical_cmp)
            }
            (Value::Map(a), Value::Map(b)) => {
                let a: Vec<_> = a.iter().collect();
                let b: Vec<_> = b.iter().collect();
                cmp_slices(&a, &b, |(ka, va), (kb, vb)| {
                    ka.cmp(kb).then_with(|| va.canonical_cmp(vb))
                })
            }
            (Value::Set(a), Value::Set(b)) => {
                let a = a.sorted_by(Value::canonical_cmp);
                let b = b.sorted_by(Value::canonical_cmp);
                cmp_slices(&a, &b, |x, y| x.canonical_cmp(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.type_name.cmp(&b.type_name).then_with(|| {
                    cmp_slices(a.attrs.as_slice(), b.attrs.as_slice(), |(na, va), (nb, vb)| {
                        na.cmp(nb).then_with(|| va.canonical_cmp(vb))
                    })
                })
            }
            _ => Ordering::Equal,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Bytes(_) => 5,
            Value::NdArray(_) => 6,
            Value::List(_) => 7,
            Value::Tuple(_) => 8,
            Value::Map(_) => 9,
            Value::Set(_) => 10,
            Value::Object(_) => 11,
        }
    }
}

fn cmp_slices<T>(a: &[T], b: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Value>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Bytes(b) => write!(f, "bytes({})", hex::encode(b)),
            Value::NdArray(a) => write!(f, "ndarray(shape={:?})", a.shape),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items.iter())?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items.iter())?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Set(s) if s.is_empty() => write!(f, "set()"),
            Value::Set(s) => {
                write!(f, "{{")?;
                write_joined(f, s.iter())?;
                write!(f, "}}")
            }
            Value::Object(r) => {
                write!(f, "{}(", r.type_name)?;
                for (i, (name, v)) in r.attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, v)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<NdArray> for Value {
    fn from(a: NdArray) -> Self {
        Value::NdArray(Arc::new(a))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(Arc::new(r))
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Map(Arc::new(m))
    }
}

impl From<ValueSet> for Value {
    fn from(s: ValueSet) -> Self {
        Value::Set(Arc::new(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

impl From<Key> for Value {
    fn from(k: Key) -> Self {
        k.to_value()
    }
}
