// JSON bridge for nestype values
//
// Converts serde_json documents into values and back. JSON objects become
// key-sorted mappings, matching serde_json's default map ordering.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::internal::error::{Error, Result};
use crate::value::containers::{MapOrder, Mapping};
use crate::value::types::{Key, Value};

impl Value {
    /// Converts a JSON document into a value.
    ///
    /// Integral numbers that fit in `i64` become `Int`, every other number
    /// becomes `Float`.
    pub fn from_json(json: &Json) -> Result<Value> {
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(Error::JsonError(format!("Unrepresentable number: {}", n)))
                }
            }
            Json::String(s) => Ok(Value::Str(s.clone())),
            Json::Array(items) => {
                let values = items.iter().map(Value::from_json).collect::<Result<Vec<_>>>()?;
                Ok(Value::from(values))
            }
            Json::Object(fields) => {
                let mut mapping = Mapping::new(MapOrder::Sorted);
                for (k, v) in fields {
                    mapping.insert(k.as_str(), Value::from_json(v)?);
                }
                Ok(Value::from(mapping))
            }
        }
    }

    /// Converts a value into a JSON document.
    ///
    /// Tuples and sets render as arrays, bytes as hex strings, arrays as
    /// `{"shape": [...], "data": [...]}` and objects as their attribute maps.
    /// Non-finite floats render as `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Float(x) => float_to_json(*x),
            Value::Str(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(hex::encode(b)),
            Value::NdArray(a) => {
                let mut fields = JsonMap::new();
                fields.insert(
                    "shape".to_string(),
                    Json::Array(a.shape().iter().map(|d| Json::Number((*d as u64).into())).collect()),
                );
                fields.insert(
                    "data".to_string(),
                    Json::Array(a.data().iter().map(|x| float_to_json(*x)).collect()),
                );
                Json::Object(fields)
            }
            Value::List(items) | Value::Tuple(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Set(s) => Json::Array(s.iter().map(Value::to_json).collect()),
            Value::Map(m) => {
                let mut fields = JsonMap::new();
                for (k, v) in m.iter() {
                    fields.insert(key_to_json(k), v.to_json());
                }
                Json::Object(fields)
            }
            Value::Object(r) => {
                let mut fields = JsonMap::new();
                for (name, v) in r.attrs() {
                    fields.insert(name.to_string(), v.to_json());
                }
                Json::Object(fields)
            }
        }
    }
}

fn float_to_json(x: f64) -> Json {
    Number::from_f64(x).map(Json::Number).unwrap_or(Json::Null)
}

fn key_to_json(key: &Key) -> String {
    match key {
        Key::Str(s) => s.clone(),
        Key::Int(i) => i.to_string(),
        Key::Bool(b) => b.to_string(),
    }
}
