//! The generic document value consumed by the encoder.
//!
//! Loaders (YAML, JSON, or hand-built trees in tests) produce a [`Value`];
//! the encoder only ever borrows it.

use crate::stack::ensure_sufficient_stack;
use chrono::{NaiveDate, NaiveDateTime};

/// A decoded document node. Mirrors what a YAML loader yields: scalars,
/// calendar values, and ordered containers.
///
/// Mappings use `Vec<(String, Value)>` so that source order survives without
/// depending on `IndexMap`; keys are unique (see [`Value::insert`]).
///
/// Dropping, cloning and comparing never recurse on the call stack, so a
/// tree of any depth can be handled.
#[derive(Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// An integer outside the `i64` range, as canonical decimal digits with
    /// an optional leading `-`. Encoded verbatim.
    BigInt(String),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    /// Wall-clock date and time as written. Any UTC offset in the source is
    /// dropped; only the date part is ever encoded.
    DateTime(NaiveDateTime),
    Sequence(Vec<Value>),
    /// Key-value pairs in insertion order.
    Mapping(Vec<(String, Value)>),
    /// Textual form of a node the model has no variant for (e.g. a scalar
    /// under an application tag). Always encoded as a quoted string.
    Opaque(String),
}

impl Value {
    /// Build a mapping from key/value pairs. A repeated key overwrites the
    /// earlier value but keeps the earlier position.
    pub fn mapping<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Value::Mapping(Vec::new());
        for (key, value) in pairs {
            map.insert(key, value);
        }
        map
    }

    /// Insert into a mapping, replacing an existing key in place.
    ///
    /// Returns the previous value for `key`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not a [`Value::Mapping`].
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let kind = self.type_name();
        let Value::Mapping(pairs) = self else {
            panic!("cannot insert a key into a {kind}");
        };
        let (key, value) = (key.into(), value.into());
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                pairs.push((key, value));
                None
            }
        }
    }

    /// Look up a key in a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Short lowercase name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Opaque(_) => "opaque",
        }
    }

    fn has_children(&self) -> bool {
        match self {
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(pairs) => !pairs.is_empty(),
            _ => false,
        }
    }
}

/// Children are moved onto a heap worklist before their parent is freed, so
/// every nested `drop` sees empty containers.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending: Vec<Value> = match self {
            Value::Sequence(items) if items.iter().any(Value::has_children) => {
                std::mem::take(items)
            }
            Value::Mapping(pairs) if pairs.iter().any(|(_, v)| v.has_children()) => {
                std::mem::take(pairs).into_iter().map(|(_, v)| v).collect()
            }
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Sequence(items) => pending.append(items),
                Value::Mapping(pairs) => pending.extend(pairs.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        ensure_sufficient_stack(|| match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(n) => Value::Int(*n),
            Value::BigInt(digits) => Value::BigInt(digits.clone()),
            Value::Float(f) => Value::Float(*f),
            Value::Text(s) => Value::Text(s.clone()),
            Value::Date(d) => Value::Date(*d),
            Value::DateTime(dt) => Value::DateTime(*dt),
            Value::Sequence(items) => Value::Sequence(items.clone()),
            Value::Mapping(pairs) => Value::Mapping(pairs.clone()),
            Value::Opaque(s) => Value::Opaque(s.clone()),
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        ensure_sufficient_stack(|| match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Any iterable that is not text becomes a sequence.
impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().map(Into::into).collect())
    }
}

/// JSON integers that fit `i64` become `Int`, larger unsigned ones `BigInt`;
/// everything else becomes `Float`. Object order is kept (`serde_json` is built with `preserve_order`).
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(u)) => Value::BigInt(u.to_string()),
                (None, None) => n
                    .as_f64()
                    .map_or_else(|| Value::Opaque(n.to_string()), Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(arr) => arr.into_iter().collect(),
            serde_json::Value::Object(map) => {
                Value::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
