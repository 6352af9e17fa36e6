//! Join and grouping operators.
//!
//! All three operators build a lookup table (derived key → values) when their
//! result is first pulled. `join` and `group_join` build it from the inner
//! sequence and then stream the outer one; `group_by` builds it from the
//! source and emits one group per distinct key, in first-occurrence order.

use std::fmt;
use std::rc::Rc;

use crate::enumerable::{deferred, lazily, Enumerable, Pairs};
use crate::error::Result;
use crate::functions::Selector;
use crate::key::Key;
use crate::traits::IntoEnumerable;
use crate::value::{Lookup, Value};

type ResultFn = Rc<dyn Fn(&Value, &Value, &Key) -> Value>;

/// Key selectors and result builders for [`Enumerable::join`] and
/// [`Enumerable::group_join`].
///
/// Both key selectors default to the pair key. Result functions receive the
/// outer value, the inner value (or the group of matches) and the matched
/// key. The default result value is `[outer, inner]` and the default result
/// key is the matched key.
#[derive(Clone)]
pub struct JoinSpec {
    outer_key: Selector,
    inner_key: Selector,
    result_value: Option<ResultFn>,
    result_key: Option<ResultFn>,
}

impl JoinSpec {
    /// Creates a spec that joins on pair keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key selector applied to outer elements.
    pub fn outer_key(mut self, selector: impl Into<Selector>) -> Self {
        self.outer_key = selector.into();
        self
    }

    /// Sets the key selector applied to inner elements.
    pub fn inner_key(mut self, selector: impl Into<Selector>) -> Self {
        self.inner_key = selector.into();
        self
    }

    /// Sets the result value builder.
    pub fn result_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value, &Key) -> Value + 'static,
    {
        self.result_value = Some(Rc::new(f));
        self
    }

    /// Sets the result key builder.
    pub fn result_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value, &Key) -> Value + 'static,
    {
        self.result_key = Some(Rc::new(f));
        self
    }

    fn result(&self, outer: &Value, inner: Value, key: &Key) -> Result<(Key, Value)> {
        let result_key = match &self.result_key {
            Some(f) => Key::from_value(&f(outer, &inner, key))?,
            None => key.clone(),
        };
        let result_value = match &self.result_value {
            Some(f) => f(outer, &inner, key),
            None => Value::list(vec![outer.clone(), inner]),
        };
        Ok((result_key, result_value))
    }
}

impl Default for JoinSpec {
    fn default() -> Self {
        JoinSpec {
            outer_key: Selector::Key,
            inner_key: Selector::Key,
            result_value: None,
            result_key: None,
        }
    }
}

impl fmt::Debug for JoinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinSpec")
            .field("outer_key", &self.outer_key)
            .field("inner_key", &self.inner_key)
            .field("result_value", &self.result_value.is_some())
            .field("result_key", &self.result_key.is_some())
            .finish()
    }
}

/// Selectors for [`Enumerable::group_by_with`].
///
/// `key` and `value` pick the group key and the member value of each element
/// (defaults: pair key and value). `result_value` and `result_key` then map
/// each `(group, group key)` pair (defaults: the group sequence and its key).
#[derive(Debug, Clone)]
pub struct GroupSpec {
    key: Selector,
    value: Selector,
    result_value: Selector,
    result_key: Selector,
}

impl GroupSpec {
    /// Creates a spec that groups values by pair key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group key selector.
    pub fn key(mut self, selector: impl Into<Selector>) -> Self {
        self.key = selector.into();
        self
    }

    /// Sets the member value selector.
    pub fn value(mut self, selector: impl Into<Selector>) -> Self {
        self.value = selector.into();
        self
    }

    /// Sets the selector applied to each finished group.
    pub fn result_value(mut self, selector: impl Into<Selector>) -> Self {
        self.result_value = selector.into();
        self
    }

    /// Sets the key selector applied to each finished group.
    pub fn result_key(mut self, selector: impl Into<Selector>) -> Self {
        self.result_key = selector.into();
        self
    }
}

impl Default for GroupSpec {
    fn default() -> Self {
        GroupSpec {
            key: Selector::Key,
            value: Selector::Value,
            result_value: Selector::Value,
            result_key: Selector::Key,
        }
    }
}

impl Enumerable {
    /// Inner equi-join.
    ///
    /// Emits one pair per matching `(outer, inner)` combination, in outer
    /// order and, within one outer element, in inner arrival order.
    ///
    /// ```
    /// use lazyseq::{Enumerable, JoinSpec, Value};
    ///
    /// let outer = Enumerable::from_pairs([("a", 1), ("b", 2)]);
    /// let joined = outer
    ///     .join(Enumerable::from_pairs([("a", 10), ("b", 20)]), JoinSpec::new())
    ///     .unwrap()
    ///     .to_list()
    ///     .unwrap();
    /// assert_eq!(joined[1], Value::list(vec![2.into(), 20.into()]));
    /// ```
    pub fn join(&self, inner: impl IntoEnumerable, spec: JoinSpec) -> Result<Enumerable> {
        let inner = inner.into_enumerable()?;
        let outer = self.clone();
        let spec = Rc::new(spec);
        Ok(Enumerable::from_factory(move || {
            let (outer, inner, spec) = (outer.clone(), inner.clone(), Rc::clone(&spec));
            with_lookup(inner, spec.inner_key.clone(), move |lookup| {
                Box::new(outer.iter().flat_map(move |item| -> Pairs {
                    let (ok, ov) = match item {
                        Ok(pair) => pair,
                        Err(err) => return Box::new(std::iter::once(Err(err))),
                    };
                    let key = match spec.outer_key.key(&ov, &ok) {
                        Ok(key) => key,
                        Err(err) => return Box::new(std::iter::once(Err(err))),
                    };
                    let matches = lookup.get(&key).cloned().unwrap_or_default();
                    let spec = Rc::clone(&spec);
                    Box::new(
                        matches
                            .into_iter()
                            .map(move |iv| spec.result(&ov, iv, &key)),
                    )
                }))
            })
        }))
    }

    /// Correlates each outer element with the group of its inner matches.
    ///
    /// Emits exactly one pair per outer element. The matches are passed to the
    /// result builders as a nested sequence, empty when nothing matched.
    pub fn group_join(&self, inner: impl IntoEnumerable, spec: JoinSpec) -> Result<Enumerable> {
        let inner = inner.into_enumerable()?;
        let outer = self.clone();
        let spec = Rc::new(spec);
        Ok(Enumerable::from_factory(move || {
            let (outer, inner, spec) = (outer.clone(), inner.clone(), Rc::clone(&spec));
            with_lookup(inner, spec.inner_key.clone(), move |lookup| {
                Box::new(outer.iter().map(move |item| {
                    let (ok, ov) = item?;
                    let key = spec.outer_key.key(&ov, &ok)?;
                    let matches = lookup.get(&key).cloned().unwrap_or_default();
                    spec.result(&ov, Value::Seq(Enumerable::from_values(matches)), &key)
                }))
            })
        }))
    }

    /// Groups values by a derived key.
    ///
    /// Each group is a nested sequence of its members, keyed `0, 1, ...` in
    /// arrival order.
    pub fn group_by(&self, key: impl Into<Selector>) -> Enumerable {
        self.group_by_with(GroupSpec::new().key(key))
    }

    /// Groups with full control over keys, members and results.
    pub fn group_by_with(&self, spec: GroupSpec) -> Enumerable {
        let source = self.clone();
        let spec = Rc::new(spec);
        Enumerable::from_factory(move || {
            let (source, spec) = (source.clone(), Rc::clone(&spec));
            deferred(move || {
                let lookup = source.to_lookup_by(spec.key.clone(), spec.value.clone())?;
                #[cfg(feature = "tracing")]
                tracing::trace!(groups = lookup.len(), "group lookup built");
                lookup
                    .into_iter()
                    .map(|(key, members)| {
                        let group = Value::Seq(Enumerable::from_values(members));
                        let result_key = spec.result_key.key(&group, &key)?;
                        Ok((result_key, spec.result_value.apply(&group, &key)))
                    })
                    .collect()
            })
        })
    }
}

// Builds the inner lookup on the first pull, then hands it to `stream`.
fn with_lookup<F>(inner: Enumerable, inner_key: Selector, stream: F) -> Pairs
where
    F: FnOnce(Rc<Lookup>) -> Pairs + 'static,
{
    lazily(move || {
        let lookup = inner.to_lookup_by(inner_key, Selector::Value)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(keys = lookup.len(), "join lookup built");
        Ok(stream(Rc::new(lookup)))
    })
}
