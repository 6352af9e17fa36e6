//! Quantifiers, concatenation and set operators.
//!
//! The set operators compare elements by a derived key (the value itself by
//! default) held in a seen-set. The seen-set is per pass, so every
//! enumeration of the result starts clean.

use std::collections::HashSet;

use crate::enumerable::{lazily, Enumerable, Pairs};
use crate::error::Result;
use crate::functions::Selector;
use crate::key::Key;
use crate::traits::IntoEnumerable;
use crate::value::Value;

impl Enumerable {
    /// Returns `true` if every element satisfies `predicate`. Vacuously
    /// `true` when empty.
    pub fn all<P>(&self, predicate: P) -> Result<bool>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        for item in self.iter() {
            let (k, v) = item?;
            if !predicate(&v, &k) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns `true` if the sequence has at least one element.
    pub fn any(&self) -> Result<bool> {
        self.iter().next().transpose().map(|first| first.is_some())
    }

    /// Returns `true` if some element satisfies `predicate`.
    pub fn any_where<P>(&self, predicate: P) -> Result<bool>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Appends one element under the default key (the empty string).
    pub fn append(&self, value: impl Into<Value>) -> Enumerable {
        self.append_keyed(value, Key::default())
    }

    /// Appends one element under `key`.
    pub fn append_keyed(&self, value: impl Into<Value>, key: impl Into<Key>) -> Enumerable {
        let source = self.clone();
        let pair = (key.into(), value.into());
        Enumerable::from_factory(move || Box::new(source.iter().chain(std::iter::once(Ok(pair.clone())))))
    }

    /// Prepends one element under the default key (the empty string).
    pub fn prepend(&self, value: impl Into<Value>) -> Enumerable {
        self.prepend_keyed(value, Key::default())
    }

    /// Prepends one element under `key`.
    pub fn prepend_keyed(&self, value: impl Into<Value>, key: impl Into<Key>) -> Enumerable {
        let source = self.clone();
        let pair = (key.into(), value.into());
        Enumerable::from_factory(move || Box::new(std::iter::once(Ok(pair.clone())).chain(source.iter())))
    }

    /// Yields the source followed by `other`, keys untouched.
    pub fn concat(&self, other: impl IntoEnumerable) -> Result<Enumerable> {
        let other = other.into_enumerable()?;
        let source = self.clone();
        Ok(Enumerable::from_factory(move || Box::new(source.iter().chain(other.iter()))))
    }

    /// Returns `true` if some value is strictly equal to `value`.
    pub fn contains(&self, value: impl Into<Value>) -> Result<bool> {
        let needle = value.into();
        for item in self.values() {
            if item? == needle {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Drops repeated values, keeping the first occurrence.
    ///
    /// ```
    /// use lazyseq::{Enumerable, Value};
    ///
    /// let seq: Enumerable = [1, 2, 1, 3, 2].into_iter().map(Value::from).collect();
    /// let expected: Vec<Value> = [1, 2, 3].into_iter().map(Value::from).collect();
    /// assert_eq!(seq.distinct().to_list().unwrap(), expected);
    /// ```
    pub fn distinct(&self) -> Enumerable {
        self.distinct_by(Selector::Value)
    }

    /// Drops elements whose derived key was already seen.
    pub fn distinct_by(&self, selector: impl Into<Selector>) -> Enumerable {
        let source = self.clone();
        let selector = selector.into();
        Enumerable::from_factory(move || unseen(source.iter(), selector.clone(), HashSet::new()))
    }

    /// Distinct elements of the source followed by those of `other`.
    pub fn union(&self, other: impl IntoEnumerable) -> Result<Enumerable> {
        self.union_by(other, Selector::Value)
    }

    /// Like [`union`](Self::union), comparing derived keys.
    pub fn union_by(&self, other: impl IntoEnumerable, selector: impl Into<Selector>) -> Result<Enumerable> {
        let other = other.into_enumerable()?;
        let source = self.clone();
        let selector = selector.into();
        Ok(Enumerable::from_factory(move || {
            unseen(Box::new(source.iter().chain(other.iter())), selector.clone(), HashSet::new())
        }))
    }

    /// Distinct elements of the source that do not occur in `other`.
    pub fn except(&self, other: impl IntoEnumerable) -> Result<Enumerable> {
        self.except_by(other, Selector::Value)
    }

    /// Like [`except`](Self::except), comparing derived keys.
    pub fn except_by(&self, other: impl IntoEnumerable, selector: impl Into<Selector>) -> Result<Enumerable> {
        let other = other.into_enumerable()?;
        let source = self.clone();
        let selector = selector.into();
        Ok(Enumerable::from_factory(move || {
            let (source, other, selector) = (source.clone(), other.clone(), selector.clone());
            lazily(move || {
                let seen = key_set(&other, &selector)?;
                Ok(unseen(source.iter(), selector, seen))
            })
        }))
    }

    /// Distinct elements of the source that also occur in `other`.
    pub fn intersect(&self, other: impl IntoEnumerable) -> Result<Enumerable> {
        self.intersect_by(other, Selector::Value)
    }

    /// Like [`intersect`](Self::intersect), comparing derived keys.
    pub fn intersect_by(&self, other: impl IntoEnumerable, selector: impl Into<Selector>) -> Result<Enumerable> {
        let other = other.into_enumerable()?;
        let source = self.clone();
        let selector = selector.into();
        Ok(Enumerable::from_factory(move || {
            let (source, other, selector) = (source.clone(), other.clone(), selector.clone());
            lazily(move || {
                let mut pending = key_set(&other, &selector)?;
                Ok(Box::new(source.iter().filter_map(move |item| {
                    let (k, v) = match item {
                        Ok(pair) => pair,
                        Err(err) => return Some(Err(err)),
                    };
                    match selector.key(&v, &k) {
                        Ok(derived) => pending.remove(&derived).then_some(Ok((k, v))),
                        Err(err) => Some(Err(err)),
                    }
                })) as Pairs)
            })
        }))
    }
}

fn key_set(seq: &Enumerable, selector: &Selector) -> Result<HashSet<Key>> {
    seq.iter()
        .map(|item| {
            let (k, v) = item?;
            selector.key(&v, &k)
        })
        .collect()
}

// Passes through the elements whose derived key is not yet in `seen`,
// recording each one emitted.
fn unseen(pairs: Pairs, selector: Selector, mut seen: HashSet<Key>) -> Pairs {
    Box::new(pairs.filter_map(move |item| {
        let (k, v) = match item {
            Ok(pair) => pair,
            Err(err) => return Some(Err(err)),
        };
        match selector.key(&v, &k) {
            Ok(derived) => seen.insert(derived).then_some(Ok((k, v))),
            Err(err) => Some(Err(err)),
        }
    }))
}
