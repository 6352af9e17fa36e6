//! Projection and filtering operators.

use std::rc::Rc;

use crate::cast::{CastType, TypeFilter};
use crate::enumerable::{Enumerable, Pairs};
use crate::error::Result;
use crate::key::Key;
use crate::traits::IntoEnumerable;
use crate::value::Value;

impl Enumerable {
    /// Maps every pair through `f` on each pass. Errors already in the stream
    /// pass through untouched.
    pub(crate) fn map_pairs<F>(&self, f: F) -> Enumerable
    where
        F: Fn(Key, Value) -> Result<(Key, Value)> + 'static,
    {
        let source = self.clone();
        let f = Rc::new(f);
        Enumerable::from_factory(move || {
            let f = Rc::clone(&f);
            Box::new(source.iter().map(move |item| {
                let (k, v) = item?;
                f(k, v)
            }))
        })
    }

    /// Projects each value, keeping its key.
    pub fn select<F>(&self, value: F) -> Enumerable
    where
        F: Fn(&Value, &Key) -> Value + 'static,
    {
        self.map_pairs(move |k, v| {
            let projected = value(&v, &k);
            Ok((k, projected))
        })
    }

    /// Projects each pair into a new value and a new key.
    ///
    /// The key is coerced like any derived key; an illegal key is yielded as
    /// an error.
    pub fn select_keyed<F, G>(&self, value: F, key: G) -> Enumerable
    where
        F: Fn(&Value, &Key) -> Value + 'static,
        G: Fn(&Value, &Key) -> Value + 'static,
    {
        self.map_pairs(move |k, v| {
            let new_key = Key::from_value(&key(&v, &k))?;
            Ok((new_key, value(&v, &k)))
        })
    }

    /// Flattens the collection returned for each element. Inner keys are
    /// replaced by an increasing integer.
    ///
    /// A collection that is not an array or sequence is yielded as an
    /// [`UnsupportedSourceType`](crate::LinqError::UnsupportedSourceType)
    /// error.
    pub fn select_many<F>(&self, collection: F) -> Enumerable
    where
        F: Fn(&Value, &Key) -> Value + 'static,
    {
        let source = self.clone();
        let collection = Rc::new(collection);
        Enumerable::from_factory(move || {
            let collection = Rc::clone(&collection);
            let mut next_key = 0i64;
            Box::new(
                source
                    .iter()
                    .flat_map(move |item| -> Pairs {
                        match item.and_then(|(k, v)| collection(&v, &k).into_enumerable()) {
                            Ok(inner) => inner.iter(),
                            Err(err) => Box::new(std::iter::once(Err(err))),
                        }
                    })
                    .map(move |item| {
                        let (_, v) = item?;
                        let key = Key::Int(next_key);
                        next_key += 1;
                        Ok((key, v))
                    }),
            )
        })
    }

    /// Flattens the collection returned for each element, building each result
    /// pair from the inner value, the outer key and the inner key.
    pub fn select_many_with<F, V, K>(&self, collection: F, result_value: V, result_key: K) -> Enumerable
    where
        F: Fn(&Value, &Key) -> Value + 'static,
        V: Fn(&Value, &Key, &Key) -> Value + 'static,
        K: Fn(&Value, &Key, &Key) -> Value + 'static,
    {
        let source = self.clone();
        let collection = Rc::new(collection);
        let result_value = Rc::new(result_value);
        let result_key = Rc::new(result_key);
        Enumerable::from_factory(move || {
            let collection = Rc::clone(&collection);
            let result_value = Rc::clone(&result_value);
            let result_key = Rc::clone(&result_key);
            Box::new(source.iter().flat_map(move |item| -> Pairs {
                let expanded = item.and_then(|(k, v)| {
                    let inner = collection(&v, &k).into_enumerable()?;
                    Ok((k, inner))
                });
                let (outer_key, inner) = match expanded {
                    Ok(found) => found,
                    Err(err) => return Box::new(std::iter::once(Err(err))),
                };
                let result_value = Rc::clone(&result_value);
                let result_key = Rc::clone(&result_key);
                Box::new(inner.iter().map(move |item| {
                    let (ik, iv) = item?;
                    let key = Key::from_value(&result_key(&iv, &outer_key, &ik))?;
                    Ok((key, result_value(&iv, &outer_key, &ik)))
                }))
            }))
        })
    }

    /// Keeps the pairs that satisfy `predicate`.
    pub fn filter<P>(&self, predicate: P) -> Enumerable
    where
        P: Fn(&Value, &Key) -> bool + 'static,
    {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Enumerable::from_factory(move || {
            let predicate = Rc::clone(&predicate);
            Box::new(source.iter().filter(move |item| match item {
                Ok((k, v)) => predicate(v, k),
                Err(_) => true,
            }))
        })
    }

    /// Converts every value to `target`.
    pub fn cast(&self, target: CastType) -> Enumerable {
        self.map_pairs(move |k, v| Ok((k, target.apply(&v)?)))
    }

    /// Keeps the values that pass `filter`.
    pub fn of_type(&self, filter: TypeFilter) -> Enumerable {
        self.filter(move |v, _| filter.matches(v))
    }
}
