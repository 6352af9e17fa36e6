//! Element access, searching and paging.

use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};
use crate::key::Key;
use crate::value::Value;

fn any_element(_: &Value, _: &Key) -> bool {
    true
}

impl Enumerable {
    /// Returns the value stored under `key`.
    ///
    /// Array-backed sequences answer with a lookup; anything else is scanned
    /// until the first pair with that key.
    pub fn element_at(&self, key: impl Into<Key>) -> Result<Value> {
        self.find_key(&key.into())?.ok_or(LinqError::NoKey)
    }

    /// Like [`element_at`](Self::element_at), returning `default` when the
    /// key is missing.
    pub fn element_at_or_default(&self, key: impl Into<Key>, default: impl Into<Value>) -> Result<Value> {
        Ok(self.find_key(&key.into())?.unwrap_or_else(|| default.into()))
    }

    fn find_key(&self, key: &Key) -> Result<Option<Value>> {
        if let Some(array) = self.snapshot() {
            return Ok(array.get(key).cloned());
        }
        for item in self.iter() {
            let (k, v) = item?;
            if &k == key {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn first_match<P>(&self, predicate: P) -> Result<Option<Value>>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn last_match<P>(&self, predicate: P) -> Result<Option<Value>>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        if let Some(array) = self.snapshot() {
            return Ok(array
                .iter()
                .rev()
                .find(|&(k, v)| predicate(v, k))
                .map(|(_, v)| v.clone()));
        }
        let mut found = None;
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                found = Some(v);
            }
        }
        Ok(found)
    }

    // A second match is an error even when the caller has a default.
    fn single_match<P>(&self, predicate: P) -> Result<Option<Value>>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        let mut found = None;
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                if found.is_some() {
                    return Err(LinqError::ManyMatches);
                }
                found = Some(v);
            }
        }
        Ok(found)
    }

    /// Returns the first value. Fails with
    /// [`NoMatches`](LinqError::NoMatches) when empty, like every member of
    /// the `first`, `last` and `single` families without a default.
    pub fn first(&self) -> Result<Value> {
        self.first_match(any_element)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the first value satisfying `predicate`. Fails with
    /// [`NoMatches`](LinqError::NoMatches) when none does.
    pub fn first_where<P>(&self, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        self.first_match(predicate)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the first value, or `default` when empty.
    pub fn first_or_default(&self, default: impl Into<Value>) -> Result<Value> {
        Ok(self.first_match(any_element)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the first value satisfying `predicate`, or `default`.
    pub fn first_or_default_where<P>(&self, default: impl Into<Value>, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.first_match(predicate)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the first value, or the result of `fallback` when empty.
    pub fn first_or_fallback<F>(&self, fallback: F) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        Ok(self.first_match(any_element)?.unwrap_or_else(fallback))
    }

    /// Returns the first value satisfying `predicate`, or the result of
    /// `fallback`.
    pub fn first_or_fallback_where<F, P>(&self, fallback: F, predicate: P) -> Result<Value>
    where
        F: FnOnce() -> Value,
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.first_match(predicate)?.unwrap_or_else(fallback))
    }

    /// Returns the last value. Fails with
    /// [`NoMatches`](LinqError::NoMatches) when empty.
    pub fn last(&self) -> Result<Value> {
        self.last_match(any_element)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the last value satisfying `predicate`.
    pub fn last_where<P>(&self, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        self.last_match(predicate)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the last value, or `default` when empty.
    pub fn last_or_default(&self, default: impl Into<Value>) -> Result<Value> {
        Ok(self.last_match(any_element)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the last value satisfying `predicate`, or `default`.
    pub fn last_or_default_where<P>(&self, default: impl Into<Value>, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.last_match(predicate)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the last value, or the result of `fallback` when empty.
    pub fn last_or_fallback<F>(&self, fallback: F) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        Ok(self.last_match(any_element)?.unwrap_or_else(fallback))
    }

    /// Returns the last value satisfying `predicate`, or the result of
    /// `fallback`.
    pub fn last_or_fallback_where<F, P>(&self, fallback: F, predicate: P) -> Result<Value>
    where
        F: FnOnce() -> Value,
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.last_match(predicate)?.unwrap_or_else(fallback))
    }

    /// Returns the only value.
    ///
    /// Fails with [`NoMatches`](LinqError::NoMatches) when empty and with
    /// [`ManyMatches`](LinqError::ManyMatches) when there is more than one.
    pub fn single(&self) -> Result<Value> {
        self.single_match(any_element)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the only value satisfying `predicate`.
    pub fn single_where<P>(&self, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        self.single_match(predicate)?.ok_or(LinqError::NoMatches)
    }

    /// Returns the only value, or `default` when empty. More than one value
    /// is still an error.
    pub fn single_or_default(&self, default: impl Into<Value>) -> Result<Value> {
        Ok(self.single_match(any_element)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the only value satisfying `predicate`, or `default`.
    pub fn single_or_default_where<P>(&self, default: impl Into<Value>, predicate: P) -> Result<Value>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.single_match(predicate)?.unwrap_or_else(|| default.into()))
    }

    /// Returns the only value, or the result of `fallback` when empty.
    pub fn single_or_fallback<F>(&self, fallback: F) -> Result<Value>
    where
        F: FnOnce() -> Value,
    {
        Ok(self.single_match(any_element)?.unwrap_or_else(fallback))
    }

    /// Returns the only value satisfying `predicate`, or the result of
    /// `fallback`.
    pub fn single_or_fallback_where<F, P>(&self, fallback: F, predicate: P) -> Result<Value>
    where
        F: FnOnce() -> Value,
        P: Fn(&Value, &Key) -> bool,
    {
        Ok(self.single_match(predicate)?.unwrap_or_else(fallback))
    }

    /// Returns the key of the first value strictly equal to `value`.
    pub fn index_of(&self, value: impl Into<Value>) -> Result<Option<Key>> {
        let needle = value.into();
        self.find_index(move |v, _| *v == needle)
    }

    /// Returns the key of the last value strictly equal to `value`.
    pub fn last_index_of(&self, value: impl Into<Value>) -> Result<Option<Key>> {
        let needle = value.into();
        self.find_last_index(move |v, _| *v == needle)
    }

    /// Returns the key of the first value satisfying `predicate`.
    pub fn find_index<P>(&self, predicate: P) -> Result<Option<Key>>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                return Ok(Some(k));
            }
        }
        Ok(None)
    }

    /// Returns the key of the last value satisfying `predicate`.
    pub fn find_last_index<P>(&self, predicate: P) -> Result<Option<Key>>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        let mut found = None;
        for item in self.iter() {
            let (k, v) = item?;
            if predicate(&v, &k) {
                found = Some(k);
            }
        }
        Ok(found)
    }

    /// Bypasses `count` elements. Counts of zero or less skip nothing.
    pub fn skip(&self, count: i64) -> Enumerable {
        let source = self.clone();
        Enumerable::from_factory(move || {
            let mut remaining = count;
            Box::new(source.iter().filter(move |item| {
                if item.is_err() || remaining <= 0 {
                    return true;
                }
                remaining -= 1;
                false
            }))
        })
    }

    /// Bypasses elements while `predicate` holds, then yields the rest.
    pub fn skip_while<P>(&self, predicate: P) -> Enumerable
    where
        P: Fn(&Value, &Key) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Enumerable::from_factory(move || {
            let predicate = Rc::clone(&predicate);
            Box::new(source.iter().skip_while(move |item| match item {
                Ok((k, v)) => predicate(v, k),
                Err(_) => false,
            }))
        })
    }

    /// Yields at most `count` elements. A count of zero or less yields
    /// nothing and never starts a pass over the source.
    ///
    /// ```
    /// use lazyseq::{to_infinity, Value};
    ///
    /// let first: Vec<Value> = to_infinity(1, 1).take(3).to_list().unwrap();
    /// assert_eq!(first, vec![Value::from(1), Value::from(2), Value::from(3)]);
    /// ```
    pub fn take(&self, count: i64) -> Enumerable {
        if count <= 0 {
            return Enumerable::from_factory(|| Box::new(std::iter::empty()));
        }
        let source = self.clone();
        let limit = usize::try_from(count).unwrap_or(usize::MAX);
        Enumerable::from_factory(move || Box::new(source.iter().take(limit)))
    }

    /// Yields elements while `predicate` holds.
    pub fn take_while<P>(&self, predicate: P) -> Enumerable
    where
        P: Fn(&Value, &Key) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Enumerable::from_factory(move || {
            let predicate = Rc::clone(&predicate);
            Box::new(source.iter().take_while(move |item| match item {
                Ok((k, v)) => predicate(v, k),
                Err(_) => true,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ints(values: &[i64]) -> Enumerable {
        values.iter().map(|&n| Value::Int(n)).collect()
    }

    fn list(seq: &Enumerable) -> Vec<i64> {
        seq.to_list().unwrap().iter().map(Value::to_int).collect()
    }

    fn streamed(values: &'static [i64]) -> Enumerable {
        Enumerable::from_factory(move || {
            Box::new(values.iter().enumerate().map(|(i, &n)| Ok((Key::from(i), Value::Int(n)))))
        })
    }

    #[test]
    fn element_access() {
        let seq = Enumerable::from_pairs([("a", 1), ("b", 2)]);
        assert_eq!(seq.element_at("b").unwrap(), Value::Int(2));
        assert!(matches!(seq.element_at("z"), Err(LinqError::NoKey)));
        assert_eq!(seq.element_at_or_default("z", 0).unwrap(), Value::Int(0));
        let lazy = streamed(&[5, 6]);
        assert_eq!(lazy.element_at(1).unwrap(), Value::Int(6));
        assert!(matches!(lazy.element_at(2), Err(LinqError::NoKey)));
    }

    #[test]
    fn first_family() {
        let seq = ints(&[1, 2, 3, 4]);
        let even = |v: &Value, _: &Key| v.to_int() % 2 == 0;
        assert_eq!(seq.first().unwrap(), Value::Int(1));
        assert_eq!(seq.first_where(even).unwrap(), Value::Int(2));
        assert!(matches!(ints(&[]).first(), Err(LinqError::NoMatches)));
        assert!(matches!(ints(&[1]).first_where(even), Err(LinqError::NoMatches)));
        assert_eq!(ints(&[]).first_or_default(9).unwrap(), Value::Int(9));
        assert_eq!(ints(&[1]).first_or_default_where(9, even).unwrap(), Value::Int(9));
        assert_eq!(ints(&[]).first_or_fallback(|| Value::from("fb")).unwrap(), Value::from("fb"));
        assert_eq!(
            seq.first_or_fallback_where(|| Value::Null, even).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn last_family() {
        let even = |v: &Value, _: &Key| v.to_int() % 2 == 0;
        for seq in [ints(&[1, 2, 3, 4, 5]), streamed(&[1, 2, 3, 4, 5])] {
            assert_eq!(seq.last().unwrap(), Value::Int(5));
            assert_eq!(seq.last_where(even).unwrap(), Value::Int(4));
            assert_eq!(seq.last_or_default_where(0, |v, _| v.to_int() > 9).unwrap(), Value::Int(0));
        }
        assert!(matches!(ints(&[]).last(), Err(LinqError::NoMatches)));
        assert!(matches!(ints(&[1]).last_where(even), Err(LinqError::NoMatches)));
        assert_eq!(ints(&[]).last_or_default(7).unwrap(), Value::Int(7));
        assert_eq!(ints(&[]).last_or_fallback(|| Value::Int(8)).unwrap(), Value::Int(8));
        assert_eq!(
            ints(&[1, 3]).last_or_fallback_where(|| Value::Int(8), even).unwrap(),
            Value::Int(8)
        );
    }

    #[test]
    fn single_family() {
        let even = |v: &Value, _: &Key| v.to_int() % 2 == 0;
        assert_eq!(ints(&[4]).single().unwrap(), Value::Int(4));
        assert!(matches!(ints(&[]).single(), Err(LinqError::NoMatches)));
        assert!(matches!(ints(&[1, 2]).single(), Err(LinqError::ManyMatches)));
        assert_eq!(ints(&[1, 2, 3]).single_where(even).unwrap(), Value::Int(2));
        assert!(matches!(ints(&[1, 3]).single_where(even), Err(LinqError::NoMatches)));
        assert_eq!(ints(&[]).single_or_default(0).unwrap(), Value::Int(0));
        assert_eq!(ints(&[1]).single_or_default_where(0, even).unwrap(), Value::Int(0));
        assert_eq!(ints(&[]).single_or_fallback(|| Value::Int(1)).unwrap(), Value::Int(1));
        assert_eq!(
            ints(&[1]).single_or_fallback_where(|| Value::Int(1), even).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn single_defaults_do_not_hide_many_matches() {
        assert!(matches!(ints(&[1, 2]).single_or_default(0), Err(LinqError::ManyMatches)));
        assert!(matches!(
            ints(&[2, 4]).single_or_fallback_where(|| Value::Null, |v, _| v.to_int() % 2 == 0),
            Err(LinqError::ManyMatches)
        ));
    }

    #[test]
    fn index_searches() {
        let seq = Enumerable::from_pairs([("a", 1), ("b", 2), ("c", 1)]);
        assert_eq!(seq.index_of(1).unwrap(), Some(Key::from("a")));
        assert_eq!(seq.last_index_of(1).unwrap(), Some(Key::from("c")));
        assert_eq!(seq.index_of("1").unwrap(), None);
        assert_eq!(seq.find_index(|v, _| v.to_int() > 1).unwrap(), Some(Key::from("b")));
        assert_eq!(seq.find_last_index(|v, _| v.to_int() > 5).unwrap(), None);
    }

    #[test]
    fn skipping() {
        let seq = ints(&[1, 2, 3, 4]);
        assert_eq!(list(&seq.skip(2)), vec![3, 4]);
        assert_eq!(list(&seq.skip(0)), vec![1, 2, 3, 4]);
        assert_eq!(list(&seq.skip(-3)), vec![1, 2, 3, 4]);
        assert_eq!(list(&seq.skip(10)), Vec::<i64>::new());
        assert_eq!(list(&ints(&[1, 2, 5, 1]).skip_while(|v, _| v.to_int() < 3)), vec![5, 1]);
        // Keys are preserved.
        assert_eq!(seq.skip(3).collect_pairs().unwrap()[0].0, Key::Int(3));
    }

    #[test]
    fn taking() {
        let seq = ints(&[1, 2, 3, 4]);
        assert_eq!(list(&seq.take(2)), vec![1, 2]);
        assert_eq!(list(&seq.take(10)), vec![1, 2, 3, 4]);
        assert_eq!(list(&ints(&[1, 2, 5, 1]).take_while(|v, _| v.to_int() < 3)), vec![1, 2]);
    }

    #[test]
    fn take_nothing_never_enumerates() {
        let passes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&passes);
        let seq = Enumerable::from_factory(move || {
            counter.set(counter.get() + 1);
            Box::new(std::iter::empty())
        });
        assert!(seq.take(0).to_list().unwrap().is_empty());
        assert!(seq.take(-1).to_list().unwrap().is_empty());
        assert_eq!(passes.get(), 0);
    }
}
