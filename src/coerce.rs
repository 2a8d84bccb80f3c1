//! Lowering of free-form block bodies into JSON-shaped data.
//!
//! Nested `config`/`role` bodies have no fixed schema; each auth backend
//! defines its own. This module flattens a body into a
//! `serde_json::Map<String, Value>` and offers [`coerce`], a bounded
//! widening function the provisioning layer uses to pull typed scalars back
//! out of that map once the backend schema is known.

use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::ast::{Body, Literal, Node};

/// Destination shape for [`coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// UTF-8 string.
    String,
    /// Integer or float.
    Number,
    /// Boolean.
    Bool,
    /// Ordered list.
    List,
    /// Keyed map.
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// A value could not take the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot coerce {found} into {expected}")]
pub struct CoerceError {
    /// The shape the caller asked for.
    pub expected: Kind,
    /// Kind of the value actually present.
    pub found: &'static str,
}

/// Kind name of a JSON value, for diagnostics.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Flattens a block body into a keyed map.
///
/// Literals become JSON scalars, lists become arrays, and nested bodies
/// become objects. Labels nest: `server "web" { port = 80 }` flattens to
/// `{"server": {"web": {"port": 80}}}`. A repeated key merges: two objects
/// merge key-wise, anything else accumulates into an array in document
/// order.
pub fn body_to_map(body: &Body) -> Result<Map<String, Value>, CoerceError> {
    let mut map = Map::new();

    for item in body.items() {
        let mut value = node_to_value(&item.value)?;
        for label in item.labels.iter().rev() {
            let mut wrapped = Map::new();
            wrapped.insert(label.clone(), value);
            value = Value::Object(wrapped);
        }

        match map.remove(&item.key) {
            None => {
                map.insert(item.key.clone(), value);
            }
            Some(existing) => {
                map.insert(item.key.clone(), merge(existing, value));
            }
        }
    }

    Ok(map)
}

fn node_to_value(node: &Node) -> Result<Value, CoerceError> {
    match node {
        Node::Literal(Literal::String(s)) => Ok(Value::String(s.clone())),
        Node::Literal(Literal::Int(i)) => Ok(Value::Number((*i).into())),
        Node::Literal(Literal::Float(f)) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or(CoerceError {
                expected: Kind::Number,
                found: "non-finite number",
            }),
        Node::Literal(Literal::Bool(b)) => Ok(Value::Bool(*b)),
        Node::List(nodes) => nodes
            .iter()
            .map(node_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Node::Body(body) => body_to_map(body).map(Value::Object),
    }
}

/// Combines two values that arrived under the same key.
fn merge(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                match left.remove(&key) {
                    None => {
                        left.insert(key, value);
                    }
                    Some(previous) => {
                        left.insert(key, merge(previous, value));
                    }
                }
            }
            Value::Object(left)
        }
        (Value::Array(mut items), value) => {
            items.push(value);
            Value::Array(items)
        }
        (previous, value) => Value::Array(vec![previous, value]),
    }
}

/// Coerces a value into the requested shape, widening scalars best-effort.
///
/// Accepted widenings:
///
/// - string → number when the text parses as one
/// - string → bool for `"true"`, `"false"`, `"1"`, `"0"`, and `""` (false)
/// - number / bool → string via display
/// - number → bool (non-zero is `true`)
/// - any scalar → single-element list
///
/// Everything else is a structural mismatch and fails with [`CoerceError`].
pub fn coerce(value: &Value, kind: Kind) -> Result<Value, CoerceError> {
    let mismatch = CoerceError {
        expected: kind,
        found: kind_of(value),
    };

    match kind {
        Kind::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(mismatch),
        },
        Kind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    Ok(Value::Number(i.into()))
                } else if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
                    Ok(Value::Number(n))
                } else {
                    Err(mismatch)
                }
            }
            Value::Bool(b) => Ok(Value::Number(i64::from(*b).into())),
            _ => Err(mismatch),
        },
        Kind::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" | "" => Ok(Value::Bool(false)),
                _ => Err(mismatch),
            },
            Value::Number(n) => Ok(Value::Bool(n.as_f64() != Some(0.0))),
            _ => Err(mismatch),
        },
        Kind::List => match value {
            Value::Array(_) => Ok(value.clone()),
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                Ok(Value::Array(vec![value.clone()]))
            }
            _ => Err(mismatch),
        },
        Kind::Map => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(mismatch),
        },
    }
}
