//! The key domain of keyed sequences.
//!
//! A [`Key`] is either an integer or a string. Strings that spell a canonical
//! decimal integer are stored as integers, so `"5"` and `5` are the same key.
//! This is the equivalence used by arrays, lookups and every derived-key set
//! (`distinct`, `union`, `except`, `intersect`).

use std::fmt;

use crate::error::{LinqError, Result};
use crate::value::Value;

/// A hashable, totally ordered sequence key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key that is not a canonical integer.
    Str(String),
}

impl Key {
    /// Creates a string key, applying numeric-string coercion.
    pub fn string(s: impl Into<String>) -> Self {
        let s = s.into();
        match canonical_int(&s) {
            Some(n) => Key::Int(n),
            None => Key::Str(s),
        }
    }

    /// Converts a value into a key.
    ///
    /// Booleans become `0`/`1`, null becomes the empty string and floats are
    /// truncated. Arrays, sequences, objects and host values are not keys.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Key::default()),
            Value::Bool(b) => Ok(Key::Int(*b as i64)),
            Value::Int(n) => Ok(Key::Int(*n)),
            Value::Float(f) => Ok(Key::Int(f.trunc() as i64)),
            Value::Str(s) => Ok(Key::string(s.as_str())),
            other => Err(LinqError::InvalidArgument(format!(
                "illegal offset type: {}",
                other.type_name()
            ))),
        }
    }

    /// Returns the integer payload, if this is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Str(_) => None,
        }
    }

    /// Returns the string payload, if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s),
        }
    }

    /// Converts the key back into a value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::Int(*n),
            Key::Str(s) => Value::Str(s.clone()),
        }
    }
}

/// The key a null key coerces to.
impl Default for Key {
    fn default() -> Self {
        Key::Str(String::new())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{}", n),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n as i64)
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Key::Int(n as i64)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::string(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::string(s)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(n) => Value::Int(n),
            Key::Str(s) => Value::Str(s),
        }
    }
}

/// Parses `s` as a canonical decimal `i64`: no sign other than a leading `-`,
/// no leading zeros, no `-0`, no surrounding whitespace.
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s == "-0" {
        return None;
    }
    s.parse().ok()
}
