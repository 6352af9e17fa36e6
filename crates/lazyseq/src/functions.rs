//! Default functions and element selectors.
//!
//! [`functions()`] exposes a process-wide table of constant functions for
//! callers to pass wherever an operator takes a closure. Operators do not read
//! it; their own defaults are [`Selector::Key`], [`Selector::Value`] and the
//! regular sort mode. The table is built once on first use and never changes
//! afterwards.
//!
//! [`Selector`] is how operators receive a caller-supplied projection. The
//! `Key` and `Value` variants name the two built-in projections explicitly so
//! the ordering subsystem can recognize them without comparing closures.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;

use crate::compare;
use crate::error::Result;
use crate::key::Key;
use crate::value::Value;

/// Projection applied to each `(value, key)` pair.
#[derive(Clone)]
pub enum Selector {
    /// Projects the pair key.
    Key,
    /// Projects the pair value.
    Value,
    /// Custom projection.
    Func(Rc<dyn Fn(&Value, &Key) -> Value>),
}

impl Selector {
    /// Wraps a closure. Taking the closure through this constructor lets the
    /// compiler infer its argument types.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value, &Key) -> Value + 'static,
    {
        Selector::Func(Rc::new(f))
    }

    /// Applies the projection.
    pub fn apply(&self, value: &Value, key: &Key) -> Value {
        match self {
            Selector::Key => key.to_value(),
            Selector::Value => value.clone(),
            Selector::Func(f) => f(value, key),
        }
    }

    /// Applies the projection and coerces the result into a key.
    pub fn key(&self, value: &Value, key: &Key) -> Result<Key> {
        match self {
            Selector::Key => Ok(key.clone()),
            other => Key::from_value(&other.apply(value, key)),
        }
    }
}

impl<F> From<F> for Selector
where
    F: Fn(&Value, &Key) -> Value + 'static,
{
    fn from(f: F) -> Self {
        Selector::func(f)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Key => f.write_str("Selector::Key"),
            Selector::Value => f.write_str("Selector::Value"),
            Selector::Func(_) => f.write_str("Selector::Func(..)"),
        }
    }
}

/// Table of constant default functions.
#[derive(Debug)]
pub struct Functions {
    /// Returns the value unchanged.
    pub identity: fn(&Value, &Key) -> Value,
    /// Returns the pair key as a value.
    pub key_of: fn(&Value, &Key) -> Value,
    /// Returns the pair value.
    pub value_of: fn(&Value, &Key) -> Value,
    /// Predicate that accepts everything.
    pub always_true: fn(&Value, &Key) -> bool,
    /// Predicate that rejects everything.
    pub always_false: fn(&Value, &Key) -> bool,
    /// Action that does nothing.
    pub blank: fn(&Value, &Key),
    /// Strict three-way comparison.
    pub compare_strict: fn(&Value, &Value) -> Ordering,
    /// Strict three-way comparison, reversed.
    pub compare_strict_reversed: fn(&Value, &Value) -> Ordering,
    /// Loose three-way comparison.
    pub compare_loose: fn(&Value, &Value) -> Ordering,
    /// Loose three-way comparison, reversed.
    pub compare_loose_reversed: fn(&Value, &Value) -> Ordering,
    /// Numeric comparison.
    pub compare_numeric: fn(&Value, &Value) -> Ordering,
    /// Numeric comparison, reversed.
    pub compare_numeric_reversed: fn(&Value, &Value) -> Ordering,
}

static FUNCTIONS: Lazy<Functions> = Lazy::new(|| Functions {
    identity: |v, _| v.clone(),
    key_of: |_, k| k.to_value(),
    value_of: |v, _| v.clone(),
    always_true: |_, _| true,
    always_false: |_, _| false,
    blank: |_, _| {},
    compare_strict: compare::compare_strict,
    compare_strict_reversed: |a, b| compare::compare_strict(b, a),
    compare_loose: compare::loose_cmp,
    compare_loose_reversed: |a, b| compare::loose_cmp(b, a),
    compare_numeric: compare::compare_numeric,
    compare_numeric_reversed: |a, b| compare::compare_numeric(b, a),
});

/// Returns the shared table of default functions.
pub fn functions() -> &'static Functions {
    &FUNCTIONS
}

/// Returns a fresh counter yielding `0, 1, 2, ...` on successive calls.
///
/// Every call builds an independent counter.
pub fn increment() -> impl Fn() -> i64 {
    let next = Cell::new(0i64);
    move || {
        let n = next.get();
        next.set(n + 1);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_functions() {
        let f = functions();
        let (v, k) = (Value::from("x"), Key::from(3));
        assert_eq!((f.identity)(&v, &k), v);
        assert_eq!((f.key_of)(&v, &k), Value::Int(3));
        assert_eq!((f.value_of)(&v, &k), v);
        assert!((f.always_true)(&v, &k));
        assert!(!(f.always_false)(&v, &k));
        (f.blank)(&v, &k);
    }

    #[test]
    fn registry_comparers() {
        let f = functions();
        let (one, two) = (Value::Int(1), Value::Int(2));
        assert_eq!((f.compare_strict)(&one, &two), Ordering::Less);
        assert_eq!((f.compare_strict_reversed)(&one, &two), Ordering::Greater);
        assert_eq!((f.compare_loose)(&one, &Value::from("1")), Ordering::Equal);
        assert_eq!((f.compare_loose_reversed)(&one, &two), Ordering::Greater);
        assert_eq!((f.compare_numeric)(&two, &one), Ordering::Greater);
        assert_eq!((f.compare_numeric_reversed)(&two, &one), Ordering::Less);
    }

    #[test]
    fn registry_comparer_matches_default_sort() {
        let f = functions();
        let default = crate::ordering::SortComparer::default();
        let values = [Value::Int(2), Value::from("10"), Value::from("1a"), Value::Null];
        for a in &values {
            for b in &values {
                assert_eq!((f.compare_strict)(a, b), default.compare(a, b));
            }
        }
    }

    #[test]
    fn registry_is_shared() {
        assert!(std::ptr::eq(functions(), functions()));
    }

    #[test]
    fn counters_are_independent() {
        let a = increment();
        let b = increment();
        assert_eq!(a(), 0);
        assert_eq!(a(), 1);
        assert_eq!(b(), 0);
        assert_eq!(a(), 2);
    }

    #[test]
    fn selector_projections() {
        let (v, k) = (Value::Int(10), Key::from("a"));
        assert_eq!(Selector::Key.apply(&v, &k), Value::from("a"));
        assert_eq!(Selector::Value.apply(&v, &k), Value::Int(10));
        let doubled = Selector::func(|v, _| Value::Int(v.to_int() * 2));
        assert_eq!(doubled.apply(&v, &k), Value::Int(20));
        assert_eq!(doubled.key(&v, &k).unwrap(), Key::Int(20));
    }

    #[test]
    fn selector_key_rejects_compound() {
        let bad = Selector::func(|_, _| Value::list(Vec::new()));
        assert!(bad.key(&Value::Null, &Key::Int(0)).is_err());
    }
}
