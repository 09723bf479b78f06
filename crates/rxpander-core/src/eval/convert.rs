//! Conversion between Starlark values and JSON values.
//!
//! JSON is the neutral carrier for everything crossing the Starlark
//! boundary: namespace bindings, variable domains, and expression results
//! all live as `serde_json::Value` on the Rust side because Starlark values
//! cannot outlive their evaluation heap.

use starlark::collections::SmallMap;
use starlark::values::dict::{Dict, DictRef};
use starlark::values::list::{AllocList, ListRef};
use starlark::values::{Heap, Value};

use super::EvalError;

/// Converts a Starlark value to a `serde_json::Value`.
///
/// Supported conversions: `None` -> null, bool, int, float, string, list,
/// dict (string keys). Anything else (functions, opaque values) fails with
/// [`EvalError::Conversion`].
pub fn starlark_to_json(value: Value) -> Result<serde_json::Value, EvalError> {
    if value.is_none() {
        return Ok(serde_json::Value::Null);
    }

    if let Some(b) = value.unpack_bool() {
        return Ok(serde_json::Value::Bool(b));
    }

    if let Some(i) = value.unpack_i32() {
        return Ok(serde_json::Value::Number(i.into()));
    }
    // Ints beyond i32 only expose their string form in starlark 0.12.
    if value.get_type() == "int" {
        let s = value.to_str();
        if let Ok(i) = s.parse::<i64>() {
            return Ok(serde_json::Value::Number(serde_json::Number::from(i)));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Ok(serde_json::Value::Number(serde_json::Number::from(u)));
        }
        return Err(EvalError::Conversion {
            message: format!("cannot represent int {} as a JSON number", s),
        });
    }

    if let Some(s) = value.unpack_str() {
        return Ok(serde_json::Value::String(s.to_string()));
    }

    if value.get_type() == "float" {
        let s = value.to_str();
        if let Ok(f) = s.parse::<f64>() {
            return serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| EvalError::Conversion {
                    message: format!("cannot represent float {} as a JSON number", f),
                });
        }
    }

    if let Some(list) = ListRef::from_value(value) {
        let items: Result<Vec<_>, _> = list.iter().map(starlark_to_json).collect();
        return Ok(serde_json::Value::Array(items?));
    }

    if let Some(dict) = DictRef::from_value(value) {
        let mut map = serde_json::Map::new();
        for (key, item) in dict.iter() {
            let key = key.unpack_str().ok_or_else(|| EvalError::Conversion {
                message: format!("dict key must be a string, got {}", key.get_type()),
            })?;
            map.insert(key.to_string(), starlark_to_json(item)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    Err(EvalError::Conversion {
        message: format!("unsupported value of type {}", value.get_type()),
    })
}

/// Allocates a `serde_json::Value` on a Starlark heap.
pub fn json_to_starlark<'v>(
    heap: &'v Heap,
    value: &serde_json::Value,
) -> Result<Value<'v>, EvalError> {
    match value {
        serde_json::Value::Null => Ok(Value::new_none()),
        serde_json::Value::Bool(b) => Ok(Value::new_bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(heap.alloc(i))
            } else if let Some(f) = n.as_f64() {
                Ok(heap.alloc(f))
            } else {
                Err(EvalError::Conversion {
                    message: format!("cannot represent JSON number {} in Starlark", n),
                })
            }
        }
        serde_json::Value::String(s) => Ok(heap.alloc_str(s).to_value()),
        serde_json::Value::Array(items) => {
            let values: Result<Vec<_>, _> =
                items.iter().map(|v| json_to_starlark(heap, v)).collect();
            Ok(heap.alloc(AllocList(values?)))
        }
        serde_json::Value::Object(map) => {
            let mut entries: SmallMap<Value<'v>, Value<'v>> = SmallMap::new();
            for (key, item) in map {
                let key = heap
                    .alloc_str(key)
                    .to_value()
                    .get_hashed()
                    .map_err(|e| EvalError::Conversion {
                        message: e.to_string(),
                    })?;
                entries.insert_hashed(key, json_to_starlark(heap, item)?);
            }
            Ok(heap.alloc(Dict::new(entries)))
        }
    }
}

/// Renders a value for splicing into an expanded line.
///
/// Strings render bare, numbers as written, and `True`/`False`/`None` in
/// the scripting convention template authors see; lists and dicts fall back
/// to compact JSON.
pub fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
