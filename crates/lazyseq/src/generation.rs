//! Root sequence factories.
//!
//! Every factory here builds a sequence with no parent. Generated sequences
//! use sequential integer keys starting at `0`, except [`generate_keyed`],
//! which computes its own keys. Parameters are validated when the factory is
//! called; the sequence itself is produced lazily on each pass.

use std::rc::Rc;

use crate::enumerable::{Enumerable, Pairs};
use crate::error::{LinqError, Result};
use crate::key::Key;
use crate::traits::IntoEnumerable;
use crate::value::{Array, Value};

/// Returns an empty sequence.
pub fn empty() -> Enumerable {
    Enumerable::from_array(Array::new())
}

/// Returns a sequence with the single element `element`.
pub fn return_value(element: impl Into<Value>) -> Enumerable {
    Enumerable::from_values(vec![element.into()])
}

/// Returns `count` integers starting at `start`, each `step` apart.
///
/// A non-positive `count` yields an empty sequence.
///
/// ```
/// use lazyseq::{range, Value};
///
/// let odd = range(3, 4, 2).to_list().unwrap();
/// let expected: Vec<Value> = vec![3.into(), 5.into(), 7.into(), 9.into()];
/// assert_eq!(odd, expected);
/// ```
pub fn range(start: i64, count: i64, step: i64) -> Enumerable {
    if count <= 0 {
        return empty();
    }
    Enumerable::from_factory(move || {
        Box::new((0..count).map(move |i| {
            let value = start.wrapping_add(i.wrapping_mul(step));
            Ok((Key::Int(i), Value::Int(value)))
        }))
    })
}

/// Returns `count` integers counting down from `start`, each `step` apart.
pub fn range_down(start: i64, count: i64, step: i64) -> Enumerable {
    range(start, count, step.wrapping_neg())
}

/// Returns the integers from `start` towards `end` (exclusive), each `step`
/// apart. Counts down when `end` is below `start`.
///
/// Fails with [`LinqError::InvalidArgument`] if `step` is not positive.
pub fn range_to(start: i64, end: i64, step: i64) -> Result<Enumerable> {
    if step <= 0 {
        return Err(LinqError::InvalidArgument(
            "step must be a positive value.".to_string(),
        ));
    }
    Ok(Enumerable::from_factory(move || {
        let values: Box<dyn Iterator<Item = i64>> = if start <= end {
            Box::new(
                std::iter::successors(Some(start), move |&i| i.checked_add(step))
                    .take_while(move |&i| i < end),
            )
        } else {
            Box::new(
                std::iter::successors(Some(start), move |&i| i.checked_sub(step))
                    .take_while(move |&i| i > end),
            )
        };
        sequential(values.map(Value::Int))
    }))
}

/// Repeats `element` `count` times, or forever when `count` is `None`.
///
/// Fails with [`LinqError::InvalidArgument`] if `count` is negative.
pub fn repeat(element: impl Into<Value>, count: Option<i64>) -> Result<Enumerable> {
    if matches!(count, Some(n) if n < 0) {
        return Err(LinqError::InvalidArgument(
            "count must be a non-negative value.".to_string(),
        ));
    }
    let element = element.into();
    Ok(Enumerable::from_factory(move || {
        let values = std::iter::repeat(element.clone());
        match count {
            Some(n) => sequential(values.take(n as usize)),
            None => sequential(values),
        }
    }))
}

/// Repeats the values of `source` forever, re-enumerating it on each round.
///
/// An empty source yields [`LinqError::NoElements`] when enumerated. A source
/// that runs dry after producing values (an exhausted iterator handle) ends
/// the sequence.
pub fn cycle(source: impl IntoEnumerable) -> Result<Enumerable> {
    let source = source.into_enumerable()?;
    Ok(Enumerable::from_factory(move || {
        let source = source.clone();
        let mut round = source.iter();
        let mut produced_any = false;
        let mut produced_this_round = false;
        let mut index = 0i64;
        let mut failed = false;
        Box::new(std::iter::from_fn(move || loop {
            if failed {
                return None;
            }
            match round.next() {
                Some(Ok((_, value))) => {
                    produced_any = true;
                    produced_this_round = true;
                    let key = Key::Int(index);
                    index += 1;
                    return Some(Ok((key, value)));
                }
                Some(Err(err)) => {
                    failed = true;
                    return Some(Err(err));
                }
                None if !produced_any => {
                    failed = true;
                    return Some(Err(LinqError::NoElements));
                }
                None if !produced_this_round => return None,
                None => {
                    produced_this_round = false;
                    round = source.iter();
                }
            }
        }))
    }))
}

/// Generates an infinite sequence: the first value is `seed` (or
/// `value_fn(Null, 0)` without one), each further value is `value_fn` of the
/// previous value and key.
///
/// ```
/// use lazyseq::{generate, Value};
///
/// let powers = generate(|v, _| Value::from(v.to_int() * 2), Some(Value::from(1)));
/// let first = powers.take(5).to_list().unwrap();
/// let expected: Vec<Value> = [1, 2, 4, 8, 16].into_iter().map(Value::from).collect();
/// assert_eq!(first, expected);
/// ```
pub fn generate<F>(value_fn: F, seed: Option<Value>) -> Enumerable
where
    F: Fn(&Value, &Key) -> Value + 'static,
{
    let value_fn = Rc::new(value_fn);
    Enumerable::from_factory(move || {
        let value_fn = Rc::clone(&value_fn);
        let first_key = Key::Int(0);
        let first = seed
            .clone()
            .unwrap_or_else(|| value_fn(&Value::Null, &first_key));
        let pairs = std::iter::successors(Some((first_key, first)), move |(k, v)| {
            let next_key = Key::Int(k.as_int().unwrap_or(0).wrapping_add(1));
            Some((next_key, value_fn(v, k)))
        });
        Box::new(pairs.map(Ok))
    })
}

/// Generates an infinite sequence with computed keys.
///
/// The first pair is `(seed_key, seed_value)`; a missing seed key is
/// `key_fn(seed_value, "")` and a missing seed value is `value_fn(Null, key)`.
/// Each further pair is computed from the previous one by both functions.
/// Keys returned by `key_fn` are coerced like any derived key; an illegal key
/// ends the sequence with an error.
pub fn generate_keyed<F, G>(
    value_fn: F,
    seed_value: Option<Value>,
    key_fn: G,
    seed_key: Option<Key>,
) -> Enumerable
where
    F: Fn(&Value, &Key) -> Value + 'static,
    G: Fn(&Value, &Key) -> Value + 'static,
{
    let value_fn = Rc::new(value_fn);
    let key_fn = Rc::new(key_fn);
    Enumerable::from_factory(move || {
        let value_fn = Rc::clone(&value_fn);
        let key_fn = Rc::clone(&key_fn);
        let first_key = match &seed_key {
            Some(key) => Ok(key.clone()),
            None => Key::from_value(&key_fn(
                seed_value.as_ref().unwrap_or(&Value::Null),
                &Key::default(),
            )),
        };
        let first = first_key.map(|key| {
            let value = seed_value
                .clone()
                .unwrap_or_else(|| value_fn(&Value::Null, &key));
            (key, value)
        });
        let pairs = std::iter::successors(Some(first), move |prev| {
            let (k, v) = prev.as_ref().ok()?;
            let next_value = value_fn(v, k);
            Some(Key::from_value(&key_fn(v, k)).map(|key| (key, next_value)))
        });
        Box::new(pairs)
    })
}

/// Counts up from `start` forever, `step` at a time.
pub fn to_infinity(start: i64, step: i64) -> Enumerable {
    Enumerable::from_factory(move || {
        sequential(
            std::iter::successors(Some(start), move |&i| Some(i.wrapping_add(step)))
                .map(Value::Int),
        )
    })
}

/// Counts down from `start` forever, `step` at a time.
pub fn to_negative_infinity(start: i64, step: i64) -> Enumerable {
    to_infinity(start, step.wrapping_neg())
}

/// Pairs values with sequential integer keys.
pub(crate) fn sequential<I>(values: I) -> Pairs
where
    I: Iterator<Item = Value> + 'static,
{
    Box::new(
        values
            .enumerate()
            .map(|(i, v)| Ok((Key::Int(i as i64), v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(seq: &Enumerable) -> Vec<i64> {
        seq.to_list()
            .unwrap()
            .into_iter()
            .map(|v| v.to_int())
            .collect()
    }

    #[test]
    fn range_yields_stepped_values_with_sequential_keys() {
        let seq = range(3, 4, 2);
        assert_eq!(values(&seq), vec![3, 5, 7, 9]);
        let keys: Vec<Key> = seq
            .collect_pairs()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![Key::Int(0), Key::Int(1), Key::Int(2), Key::Int(3)]);
    }

    #[test]
    fn range_with_non_positive_count_is_empty() {
        assert!(values(&range(1, 0, 1)).is_empty());
        assert!(values(&range(1, -5, 1)).is_empty());
    }

    #[test]
    fn range_down_counts_down() {
        assert_eq!(values(&range_down(10, 3, 5)), vec![10, 5, 0]);
    }

    #[test]
    fn range_to_is_end_exclusive_both_ways() {
        assert_eq!(values(&range_to(1, 7, 2).unwrap()), vec![1, 3, 5]);
        assert_eq!(values(&range_to(5, 1, 1).unwrap()), vec![5, 4, 3, 2]);
        assert!(values(&range_to(3, 3, 1).unwrap()).is_empty());
    }

    #[test]
    fn range_to_rejects_non_positive_step() {
        assert!(matches!(range_to(0, 5, 0), Err(LinqError::InvalidArgument(_))));
        assert!(matches!(range_to(0, 5, -1), Err(LinqError::InvalidArgument(_))));
    }

    #[test]
    fn repeat_counts() {
        assert_eq!(values(&repeat(7, Some(3)).unwrap()), vec![7, 7, 7]);
        assert!(values(&repeat(7, Some(0)).unwrap()).is_empty());
        assert_eq!(values(&repeat(1, None).unwrap().take(4)), vec![1, 1, 1, 1]);
        assert!(matches!(repeat(1, Some(-1)), Err(LinqError::InvalidArgument(_))));
    }

    #[test]
    fn return_value_is_single() {
        assert_eq!(return_value("x").to_list().unwrap(), vec![Value::from("x")]);
        assert!(empty().to_list().unwrap().is_empty());
    }

    #[test]
    fn cycle_repeats_source() {
        let seq = cycle(vec![1, 2]).unwrap();
        assert_eq!(values(&seq.take(5)), vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn cycle_over_empty_fails_on_enumeration() {
        let seq = cycle(Vec::<Value>::new()).unwrap();
        assert!(matches!(seq.to_list(), Err(LinqError::NoElements)));
    }

    #[test]
    fn cycle_over_exhausted_handle_stops() {
        let handle = Enumerable::wrap_iter((0..2i64).map(|i| (Key::Int(i), Value::Int(i))));
        let seq = cycle(handle).unwrap();
        assert_eq!(values(&seq), vec![0, 1]);
    }

    #[test]
    fn generate_from_seed() {
        let seq = generate(|v, _| Value::Int(v.to_int() + 3), Some(Value::Int(1)));
        assert_eq!(values(&seq.take(4)), vec![1, 4, 7, 10]);
    }

    #[test]
    fn generate_without_seed_calls_value_fn_first() {
        let seq = generate(|v, k| Value::Int(v.to_int() + k.as_int().unwrap_or(0) + 1), None);
        // 0+0+1, then 1+0+1, then 2+1+1
        assert_eq!(values(&seq.take(3)), vec![1, 2, 4]);
    }

    #[test]
    fn generate_keyed_fibonacci_pairs() {
        // Key holds the previous value, value holds the current one.
        let seq = generate_keyed(
            |v, k| Value::Int(v.to_int() + k.as_int().unwrap_or(0)),
            Some(Value::Int(1)),
            |v, _| v.clone(),
            Some(Key::Int(0)),
        );
        assert_eq!(values(&seq.take(6)), vec![1, 1, 2, 3, 5, 8]);
    }

    #[test]
    fn generate_keyed_stops_on_illegal_key() {
        let seq = generate_keyed(
            |v, _| v.clone(),
            Some(Value::Int(1)),
            |_, _| Value::list(Vec::new()),
            Some(Key::Int(0)),
        );
        let items: Vec<_> = seq.iter().take(5).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn infinities() {
        assert_eq!(values(&to_infinity(0, 1).take(3)), vec![0, 1, 2]);
        assert_eq!(values(&to_negative_infinity(5, 2).take(3)), vec![5, 3, 1]);
    }
}
