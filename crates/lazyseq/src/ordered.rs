//! Multi-criteria ordering.
//!
//! An [`OrderedEnumerable`] keeps its unsorted source and a chain of sort
//! criteria. Each criterion points at the coarser one established before it,
//! so `then_by` only has to push a new head. Sorting happens on the first pull
//! of the ordered sequence:
//!
//! 1. walk the chain and reverse it, coarsest criterion first;
//! 2. if every criterion uses a primitive [`SortFlags`] mode, extract one key
//!    column per criterion and run a single stable multi-column sort over row
//!    indices (the bulk path);
//! 3. otherwise build `(key, value, sort keys)` rows and run one stable
//!    comparison sort that tries criteria coarsest to finest (the fallback
//!    path).
//!
//! A single criterion that sorts an array-backed source by its keys or values
//! skips column extraction and sorts the pairs directly.
//!
//! Both paths compare with the same function for the same mode and both are
//! stable, so they produce identical output whenever both apply.

use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use crate::enumerable::{deferred, Enumerable};
use crate::error::Result;
use crate::functions::Selector;
use crate::key::Key;
use crate::ordering::{compare_rows, Dir, SortComparer, SortFlags};
use crate::traits::IntoEnumerable;
use crate::value::Value;

struct Criterion {
    selector: Selector,
    dir: Dir,
    comparer: SortComparer,
    parent: Option<Rc<Criterion>>,
}

/// A sequence sorted by one or more criteria.
///
/// Dereferences to the sorted [`Enumerable`], so every operator is available.
/// Calling `order_by*` on it starts a new primary ordering; `then_by*` refines
/// the current one.
///
/// # Example
///
/// ```
/// use lazyseq::{from, Selector, Value};
///
/// let people = from(vec![
///     Value::list(vec![Value::from("bob"), Value::from(30)]),
///     Value::list(vec![Value::from("amy"), Value::from(30)]),
///     Value::list(vec![Value::from("cat"), Value::from(25)]),
/// ])
/// .unwrap();
///
/// let age = |v: &Value| v.as_array().and_then(|a| a.get_index(1)).map(|(_, x)| x.clone());
/// let name = |v: &Value| v.as_array().and_then(|a| a.get_index(0)).map(|(_, x)| x.clone());
///
/// let sorted = people
///     .order_by_descending(Selector::func(move |v, _| age(v).unwrap_or(Value::Null)))
///     .then_by(Selector::func(move |v, _| name(v).unwrap_or(Value::Null)))
///     .select(|v, _| v.as_array().and_then(|a| a.get_index(0)).map(|(_, x)| x.clone()).unwrap_or(Value::Null))
///     .to_list()
///     .unwrap();
///
/// assert_eq!(sorted, vec![Value::from("amy"), Value::from("bob"), Value::from("cat")]);
/// ```
#[derive(Clone)]
pub struct OrderedEnumerable {
    source: Enumerable,
    criterion: Rc<Criterion>,
    sorted: Enumerable,
}

impl OrderedEnumerable {
    fn new(source: Enumerable, criterion: Rc<Criterion>) -> Self {
        let sorted = {
            let source = source.clone();
            let criterion = Rc::clone(&criterion);
            Enumerable::from_factory(move || {
                let source = source.clone();
                let criterion = Rc::clone(&criterion);
                deferred(move || sort(&source, &criterion))
            })
        };
        OrderedEnumerable {
            source,
            criterion,
            sorted,
        }
    }

    /// Adds an ascending tie-breaker.
    pub fn then_by(&self, selector: impl Into<Selector>) -> OrderedEnumerable {
        self.then_by_dir(Dir::Asc, selector, SortComparer::default())
    }

    /// Adds a descending tie-breaker.
    pub fn then_by_descending(&self, selector: impl Into<Selector>) -> OrderedEnumerable {
        self.then_by_dir(Dir::Desc, selector, SortComparer::default())
    }

    /// Adds a tie-breaker with an explicit direction and comparer.
    pub fn then_by_dir(
        &self,
        dir: impl Into<Dir>,
        selector: impl Into<Selector>,
        comparer: impl Into<SortComparer>,
    ) -> OrderedEnumerable {
        let criterion = Criterion {
            selector: selector.into(),
            dir: dir.into(),
            comparer: comparer.into(),
            parent: Some(Rc::clone(&self.criterion)),
        };
        OrderedEnumerable::new(self.source.clone(), Rc::new(criterion))
    }

    /// Returns the sorted sequence.
    pub fn as_enumerable(&self) -> &Enumerable {
        &self.sorted
    }

    /// Returns the number of criteria in the chain.
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(&*self.criterion), |c| c.parent.as_deref()).count()
    }
}

impl Deref for OrderedEnumerable {
    type Target = Enumerable;

    fn deref(&self) -> &Enumerable {
        &self.sorted
    }
}

impl IntoEnumerable for OrderedEnumerable {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self.sorted)
    }
}

impl IntoEnumerable for &OrderedEnumerable {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self.sorted.clone())
    }
}

impl Enumerable {
    /// Sorts ascending by `selector`, discarding any previous ordering.
    pub fn order_by(&self, selector: impl Into<Selector>) -> OrderedEnumerable {
        self.order_by_dir(Dir::Asc, selector, SortComparer::default())
    }

    /// Sorts descending by `selector`, discarding any previous ordering.
    pub fn order_by_descending(&self, selector: impl Into<Selector>) -> OrderedEnumerable {
        self.order_by_dir(Dir::Desc, selector, SortComparer::default())
    }

    /// Sorts by `selector` with an explicit direction and comparer.
    pub fn order_by_dir(
        &self,
        dir: impl Into<Dir>,
        selector: impl Into<Selector>,
        comparer: impl Into<SortComparer>,
    ) -> OrderedEnumerable {
        let criterion = Criterion {
            selector: selector.into(),
            dir: dir.into(),
            comparer: comparer.into(),
            parent: None,
        };
        OrderedEnumerable::new(self.clone(), Rc::new(criterion))
    }
}

fn sort(source: &Enumerable, last: &Criterion) -> Result<Vec<(Key, Value)>> {
    let mut chain: Vec<&Criterion> =
        std::iter::successors(Some(last), |c| c.parent.as_deref()).collect();
    chain.reverse();

    if let [only] = chain.as_slice() {
        if let Some(array) = source.snapshot() {
            if matches!(only.selector, Selector::Key | Selector::Value) {
                #[cfg(feature = "tracing")]
                tracing::trace!(rows = array.len(), "sorting pairs directly");
                let pairs = array.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                return Ok(sort_pairs(pairs, only));
            }
        }
    }

    let pairs = match source.snapshot() {
        Some(array) => array.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        None => source.collect_pairs()?,
    };

    let flags: Option<Vec<(Dir, SortFlags)>> = chain
        .iter()
        .map(|c| c.comparer.flags().map(|f| (c.dir, f)))
        .collect();

    #[cfg(feature = "tracing")]
    tracing::trace!(
        rows = pairs.len(),
        criteria = chain.len(),
        bulk = flags.is_some(),
        "sorting sequence"
    );

    Ok(match flags {
        Some(flags) => bulk_sort(pairs, &chain, &flags),
        None => fallback_sort(pairs, &chain),
    })
}

fn sort_pairs(mut pairs: Vec<(Key, Value)>, criterion: &Criterion) -> Vec<(Key, Value)> {
    let Criterion { dir, comparer, .. } = criterion;
    match criterion.selector {
        Selector::Key => {
            pairs.sort_by(|(a, _), (b, _)| dir.apply(comparer.compare(&a.to_value(), &b.to_value())))
        }
        _ => pairs.sort_by(|(_, a), (_, b)| dir.apply(comparer.compare(a, b))),
    }
    pairs
}

// One column of sort keys per criterion, then one sort over row indices.
fn bulk_sort(
    pairs: Vec<(Key, Value)>,
    chain: &[&Criterion],
    flags: &[(Dir, SortFlags)],
) -> Vec<(Key, Value)> {
    let columns: Vec<Vec<Value>> = chain
        .iter()
        .map(|c| pairs.iter().map(|(k, v)| c.selector.apply(v, k)).collect())
        .collect();

    let mut indices: Vec<usize> = (0..pairs.len()).collect();
    indices.sort_by(|&a, &b| {
        for (column, (dir, mode)) in columns.iter().zip(flags) {
            let ordering = dir.apply(mode.compare(&column[a], &column[b]));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    let mut slots: Vec<Option<(Key, Value)>> = pairs.into_iter().map(Some).collect();
    indices
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

fn fallback_sort(pairs: Vec<(Key, Value)>, chain: &[&Criterion]) -> Vec<(Key, Value)> {
    let columns: Vec<(Dir, SortComparer)> =
        chain.iter().map(|c| (c.dir, c.comparer.clone())).collect();

    let mut rows: Vec<(Key, Value, Vec<Value>)> = pairs
        .into_iter()
        .map(|(k, v)| {
            let sort_keys = chain.iter().map(|c| c.selector.apply(&v, &k)).collect();
            (k, v, sort_keys)
        })
        .collect();
    rows.sort_by(|a, b| compare_rows(&a.2, &b.2, &columns));

    rows.into_iter().map(|(k, v, _)| (k, v)).collect()
}
