//! Terminal aggregation operators.
//!
//! Every operator here drives one full pass over the sequence and stops at the
//! first error it pulls.

use std::cmp::Ordering;

use crate::compare::loose_cmp;
use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};
use crate::functions::Selector;
use crate::key::Key;
use crate::ordering::SortComparer;
use crate::value::{Number, Value};

impl Enumerable {
    /// Folds the sequence with `func(accumulator, value, key)`.
    ///
    /// With a seed, `func` runs for every element. Without one, the first
    /// value becomes the accumulator and `func` starts from the second. An
    /// unseeded fold over an empty sequence fails with
    /// [`NoElements`](LinqError::NoElements).
    ///
    /// ```
    /// use lazyseq::{Enumerable, Value};
    ///
    /// let seq: Enumerable = [1, 2, 3].into_iter().map(Value::from).collect();
    /// let product = seq
    ///     .aggregate(|acc, v, _| Value::from(acc.to_int() * v.to_int()), None)
    ///     .unwrap();
    /// assert_eq!(product, Value::from(6));
    /// ```
    pub fn aggregate<F>(&self, func: F, seed: Option<Value>) -> Result<Value>
    where
        F: Fn(&Value, &Value, &Key) -> Value,
    {
        self.fold(func, seed)?.ok_or(LinqError::NoElements)
    }

    /// Like [`aggregate`](Self::aggregate), but returns `default` instead of
    /// failing on an empty unseeded fold. `func` is never invoked then.
    pub fn aggregate_or_default<F>(&self, func: F, seed: Option<Value>, default: Value) -> Result<Value>
    where
        F: Fn(&Value, &Value, &Key) -> Value,
    {
        Ok(self.fold(func, seed)?.unwrap_or(default))
    }

    fn fold<F>(&self, func: F, seed: Option<Value>) -> Result<Option<Value>>
    where
        F: Fn(&Value, &Value, &Key) -> Value,
    {
        let mut acc = seed;
        for item in self.iter() {
            let (k, v) = item?;
            acc = Some(match acc {
                Some(current) => func(&current, &v, &k),
                None => v,
            });
        }
        Ok(acc)
    }

    /// Pairwise reduction without a seed; `None` when empty.
    fn reduce<F>(&self, pick: F) -> Result<Option<Value>>
    where
        F: Fn(Value, Value) -> Value,
    {
        let mut acc: Option<Value> = None;
        for value in self.values() {
            let value = value?;
            acc = Some(match acc {
                Some(current) => pick(current, value),
                None => value,
            });
        }
        Ok(acc)
    }

    /// Counts every element.
    pub fn count(&self) -> Result<usize> {
        self.iter().try_fold(0, |n, item| item.map(|_| n + 1))
    }

    /// Counts the elements that satisfy `predicate`.
    pub fn count_where<P>(&self, predicate: P) -> Result<usize>
    where
        P: Fn(&Value, &Key) -> bool,
    {
        self.iter().try_fold(0, |n, item| {
            let (k, v) = item?;
            Ok(if predicate(&v, &k) { n + 1 } else { n })
        })
    }

    /// Sums the values. Zero on an empty sequence.
    ///
    /// The result stays an integer while every term is one and the total
    /// fits; otherwise it is a float. Non-numeric terms are rejected with
    /// [`InvalidArgument`](LinqError::InvalidArgument).
    pub fn sum(&self) -> Result<Value> {
        self.values()
            .try_fold(Number::Int(0), |total, value| {
                let value = value?;
                let term = value.to_number().ok_or_else(|| {
                    LinqError::InvalidArgument(format!(
                        "cannot sum non-numeric {} value",
                        value.type_name()
                    ))
                })?;
                Ok(total.add(term))
            })
            .map(Value::from)
    }

    /// Sums the projected values.
    pub fn sum_by(&self, selector: impl Into<Selector>) -> Result<Value> {
        self.project(selector).sum()
    }

    /// Returns the smallest value by loose comparison. The first of several
    /// equal values wins.
    pub fn min(&self) -> Result<Value> {
        self.reduce(|best, v| match loose_cmp(&v, &best) {
            Ordering::Less => v,
            _ => best,
        })?
        .ok_or(LinqError::NoElements)
    }

    /// Returns the smallest projected value.
    pub fn min_by_selector(&self, selector: impl Into<Selector>) -> Result<Value> {
        self.project(selector).min()
    }

    /// Returns the largest value by loose comparison. The first of several
    /// equal values wins.
    pub fn max(&self) -> Result<Value> {
        self.reduce(|best, v| match loose_cmp(&v, &best) {
            Ordering::Greater => v,
            _ => best,
        })?
        .ok_or(LinqError::NoElements)
    }

    /// Returns the largest projected value.
    pub fn max_by_selector(&self, selector: impl Into<Selector>) -> Result<Value> {
        self.project(selector).max()
    }

    /// Arithmetic mean of the values.
    pub fn average(&self) -> Result<f64> {
        let mut count = 0usize;
        let mut total = Number::Int(0);
        for value in self.values() {
            let value = value?;
            let term = value.to_number().ok_or_else(|| {
                LinqError::InvalidArgument(format!(
                    "cannot average non-numeric {} value",
                    value.type_name()
                ))
            })?;
            total = total.add(term);
            count += 1;
        }
        if count == 0 {
            return Err(LinqError::NoElements);
        }
        Ok(total.to_f64() / count as f64)
    }

    /// Mean of the projected values.
    pub fn average_by(&self, selector: impl Into<Selector>) -> Result<f64> {
        self.project(selector).average()
    }

    /// Smallest value under `comparer`. Among equal values the last one wins.
    pub fn min_by(&self, comparer: impl Into<SortComparer>) -> Result<Value> {
        let comparer = comparer.into();
        self.reduce(|a, b| match comparer.compare(&a, &b) {
            Ordering::Less => a,
            _ => b,
        })?
        .ok_or(LinqError::NoElements)
    }

    /// Largest value under `comparer`. Among equal values the last one wins.
    pub fn max_by(&self, comparer: impl Into<SortComparer>) -> Result<Value> {
        let comparer = comparer.into();
        self.reduce(|a, b| match comparer.compare(&a, &b) {
            Ordering::Greater => a,
            _ => b,
        })?
        .ok_or(LinqError::NoElements)
    }

    /// Smallest projected value under `comparer`.
    pub fn min_by_with(&self, comparer: impl Into<SortComparer>, selector: impl Into<Selector>) -> Result<Value> {
        self.project(selector).min_by(comparer)
    }

    /// Largest projected value under `comparer`.
    pub fn max_by_with(&self, comparer: impl Into<SortComparer>, selector: impl Into<Selector>) -> Result<Value> {
        self.project(selector).max_by(comparer)
    }

    fn project(&self, selector: impl Into<Selector>) -> Enumerable {
        let selector = selector.into();
        self.select(move |v, k| selector.apply(v, k))
    }
}
