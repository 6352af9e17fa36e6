//! The keyed sequence.
//!
//! An [`Enumerable`] is an ordered stream of `(Key, Value)` pairs with one of
//! three production rules:
//!
//! - **array**: a shared materialized snapshot, replayed on every pass;
//! - **factory**: a closure building a fresh pull iterator on every pass;
//! - **handle**: a shared, externally owned iterator. Passes continue where
//!   the previous one stopped, so the sequence is empty after exhaustion.
//!
//! Operators never touch their parent when they are built. They return a new
//! factory-backed sequence that holds the parent by `Rc` and pulls from it
//! only when the result itself is enumerated.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::key::Key;
use crate::value::{Array, Value};

/// A pull iterator over the pairs of a sequence.
///
/// Items are `Result`s so that failures found during enumeration reach the
/// consumer; terminal operations stop at the first `Err`.
pub type Pairs = Box<dyn Iterator<Item = Result<(Key, Value)>>>;

#[derive(Clone)]
enum Source {
    Array(Rc<Array>),
    Factory(Rc<dyn Fn() -> Pairs>),
    Handle(Rc<RefCell<Pairs>>),
}

/// A lazily evaluated sequence of key/value pairs.
///
/// Cloning is cheap: clones share the production rule.
///
/// # Example
///
/// ```
/// use lazyseq::{Enumerable, Value};
///
/// let seq: Enumerable = vec![Value::from(1), Value::from(2)].into_iter().collect();
/// let doubled = seq.select(|v, _| Value::from(v.to_int() * 2));
/// assert_eq!(doubled.to_list().unwrap(), vec![Value::from(2), Value::from(4)]);
/// ```
#[derive(Clone)]
pub struct Enumerable {
    source: Source,
}

impl Enumerable {
    /// Wraps a materialized array. Every pass replays it.
    pub fn from_array(array: Array) -> Self {
        Enumerable {
            source: Source::Array(Rc::new(array)),
        }
    }

    /// Builds a snapshot from pairs. Duplicate keys keep the first position
    /// and the last value.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<Key>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_array(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a restartable sequence. The factory runs once per pass.
    pub fn from_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Pairs + 'static,
    {
        Enumerable {
            source: Source::Factory(Rc::new(factory)),
        }
    }

    /// Wraps an externally owned iterator. The sequence is not restartable:
    /// a second pass resumes where the first stopped.
    pub fn wrap_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = (Key, Value)> + 'static,
    {
        let pairs: Pairs = Box::new(iter.map(Ok));
        Enumerable {
            source: Source::Handle(Rc::new(RefCell::new(pairs))),
        }
    }

    /// Builds a snapshot with sequential integer keys.
    pub(crate) fn from_values(values: Vec<Value>) -> Self {
        Self::from_array(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Int(i as i64), v))
                .collect(),
        )
    }

    /// Starts a pass over the sequence.
    pub fn iter(&self) -> Pairs {
        match &self.source {
            Source::Array(array) => {
                let array = Rc::clone(array);
                let mut index = 0;
                Box::new(std::iter::from_fn(move || {
                    let (k, v) = array.get_index(index)?;
                    index += 1;
                    Some(Ok((k.clone(), v.clone())))
                }))
            }
            Source::Factory(factory) => factory(),
            Source::Handle(handle) => {
                let handle = Rc::clone(handle);
                // A nested pass over the same handle sees it as exhausted.
                Box::new(std::iter::from_fn(move || {
                    handle.try_borrow_mut().ok()?.next()
                }))
            }
        }
    }

    /// Starts a pass over the values only.
    pub fn values(&self) -> impl Iterator<Item = Result<Value>> {
        self.iter().map(|item| item.map(|(_, v)| v))
    }

    /// Drains one pass into a vector of pairs.
    pub(crate) fn collect_pairs(&self) -> Result<Vec<(Key, Value)>> {
        self.iter().collect()
    }

    /// Returns the backing snapshot, if this sequence is array-backed.
    pub(crate) fn snapshot(&self) -> Option<&Rc<Array>> {
        match &self.source {
            Source::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns `true` if both sequences share the same production rule.
    pub fn ptr_eq(&self, other: &Enumerable) -> bool {
        match (&self.source, &other.source) {
            (Source::Array(a), Source::Array(b)) => Rc::ptr_eq(a, b),
            (Source::Factory(a), Source::Factory(b)) => Rc::ptr_eq(a, b),
            (Source::Handle(a), Source::Handle(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Runs `build` on the first pull and streams the pairs it returns.
pub(crate) fn deferred<F>(build: F) -> Pairs
where
    F: FnOnce() -> Result<Vec<(Key, Value)>> + 'static,
{
    Box::new(
        std::iter::once_with(build).flat_map(|result| -> Pairs {
            match result {
                Ok(pairs) => Box::new(pairs.into_iter().map(Ok)),
                Err(err) => Box::new(std::iter::once(Err(err))),
            }
        }),
    )
}

/// Runs `start` on the first pull and streams the pass it returns. A failed
/// start is yielded as a single error.
pub(crate) fn lazily<F>(start: F) -> Pairs
where
    F: FnOnce() -> Result<Pairs> + 'static,
{
    Box::new(
        std::iter::once_with(start)
            .flat_map(|started| started.unwrap_or_else(|err| -> Pairs { Box::new(std::iter::once(Err(err))) })),
    )
}

impl FromIterator<Value> for Enumerable {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl fmt::Debug for Enumerable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Array(a) => write!(f, "Enumerable(array, {} pairs)", a.len()),
            Source::Factory(_) => f.write_str("Enumerable(factory)"),
            Source::Handle(_) => f.write_str("Enumerable(handle)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_factory(calls: Rc<Cell<usize>>) -> Enumerable {
        Enumerable::from_factory(move || {
            calls.set(calls.get() + 1);
            Box::new((0..3i64).map(|i| Ok((Key::Int(i), Value::Int(i * 10)))))
        })
    }

    #[test]
    fn array_replays() {
        let seq = Enumerable::from_pairs([("a", 1), ("b", 2)]);
        let first: Vec<_> = seq.values().collect::<Result<_>>().unwrap();
        let second: Vec<_> = seq.values().collect::<Result<_>>().unwrap();
        assert_eq!(first, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(first, second);
    }

    #[test]
    fn from_pairs_last_write_wins() {
        let seq = Enumerable::from_pairs([("a", 1), ("b", 2), ("a", 3)]);
        let pairs = seq.collect_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![(Key::from("a"), Value::Int(3)), (Key::from("b"), Value::Int(2))]
        );
    }

    #[test]
    fn factory_restarts() {
        let calls = Rc::new(Cell::new(0));
        let seq = counting_factory(calls.clone());
        assert_eq!(calls.get(), 0);
        assert_eq!(seq.collect_pairs().unwrap().len(), 3);
        assert_eq!(seq.collect_pairs().unwrap().len(), 3);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn handle_is_single_pass() {
        let seq = Enumerable::wrap_iter((0..4i64).map(|i| (Key::Int(i), Value::Int(i))));
        let mut first = seq.iter();
        assert!(first.next().is_some());
        drop(first);
        assert_eq!(seq.collect_pairs().unwrap().len(), 3);
        assert!(seq.collect_pairs().unwrap().is_empty());
    }

    #[test]
    fn collect_from_values() {
        let seq: Enumerable = vec![Value::from("x"), Value::from("y")].into_iter().collect();
        let keys: Vec<Key> = seq
            .collect_pairs()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![Key::Int(0), Key::Int(1)]);
        assert!(seq.snapshot().is_some());
    }

    #[test]
    fn clones_share_source() {
        let seq = Enumerable::from_pairs([(0, 1)]);
        assert!(seq.ptr_eq(&seq.clone()));
        assert!(!seq.ptr_eq(&Enumerable::from_pairs([(0, 1)])));
    }
}
