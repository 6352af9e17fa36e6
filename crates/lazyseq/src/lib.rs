//! lazyseq - Deferred-execution queries over keyed sequences.
//!
//! lazyseq provides a fluent, LINQ-style API over ordered streams of
//! `(Key, Value)` pairs. It supports:
//!
//! - Lazy operator chains: nothing runs until a terminal operation pulls
//! - Projection, filtering, joins, grouping and set operations
//! - Multi-criteria ordering with ascending/descending tie-breakers
//! - Aggregation, element access and paging
//! - Generators: ranges, repetition, cycles, regex matches
//!
//! # Quick Start
//!
//! ```rust
//! use lazyseq::{from, Selector, Value};
//!
//! let scores = from(vec![70, 95, 42, 88]).unwrap();
//!
//! let passed = scores
//!     .filter(|v, _| v.to_int() >= 60)
//!     .order_by_descending(Selector::Value)
//!     .select(|v, k| Value::from(format!("#{}: {}", k, v)))
//!     .to_list()
//!     .unwrap();
//!
//! assert_eq!(
//!     passed,
//!     vec![Value::from("#1: 95"), Value::from("#3: 88"), Value::from("#0: 70")]
//! );
//! ```
//!
//! # Evaluation Model
//!
//! A sequence is produced by one of three rules:
//!
//! ```text
//! array    replays a shared snapshot on every pass
//! factory  builds a fresh pull iterator on every pass
//! handle   shares one external iterator; later passes resume it
//! ```
//!
//! Operators wrap their parent in a new factory and never touch it at
//! construction time. Operators that need the whole input (ordering, joins,
//! grouping, `except`/`intersect`) materialize it when their result is first
//! pulled.
//!
//! # Keys and Values
//!
//! [`Key`] is an integer or a string; strings spelling a canonical integer are
//! stored as integers. [`Value`] covers scalars, keyed arrays, nested
//! sequences, property bags and opaque host values. Derived keys (lookups,
//! set operators, `select_keyed`) are coerced from values and reject
//! compound values with [`LinqError::InvalidArgument`].
//!
//! # Errors
//!
//! Bad parameters, unsupported sources and invalid patterns are reported by
//! the call that receives them. Failures found while pulling are yielded as
//! `Err` items and returned by the terminal operation that drives the pass.

mod actions;
mod aggregate;
mod cast;
mod compare;
mod convert;
mod enumerable;
mod error;
mod functions;
mod generation;
mod join;
mod key;
mod ordered;
mod ordering;
mod pagination;
mod pattern;
mod projection;
mod sets;
mod traits;
mod value;

// Re-export public API
pub use cast::{CastType, TypeFilter};
pub use compare::{compare_numeric, compare_strict, compare_text, compare_text_ci, loose_cmp, natural_cmp};
pub use convert::JsonOptions;
pub use enumerable::{Enumerable, Pairs};
pub use error::{LinqError, Result};
pub use functions::{functions, increment, Functions, Selector};
pub use generation::{
    cycle, empty, generate, generate_keyed, range, range_down, range_to, repeat, return_value,
    to_infinity, to_negative_infinity,
};
pub use join::{GroupSpec, JoinSpec};
pub use key::Key;
pub use ordered::OrderedEnumerable;
pub use ordering::{CompareFn, Dir, SortComparer, SortFlags};
pub use pattern::{matches, split, MatchFlags, MatchOrder, SplitFlags};
pub use traits::IntoEnumerable;
pub use value::{parse_numeric, Array, HostValue, Lookup, Number, Object, Value};

/// Adapts a source into a sequence.
///
/// Accepts sequences (passed through), ordered sequences, arrays, vectors and
/// fixed-size arrays of anything convertible into [`Value`], and values that
/// hold an array or a sequence. Other values fail with
/// [`LinqError::UnsupportedSourceType`].
pub fn from(source: impl IntoEnumerable) -> Result<Enumerable> {
    source.into_enumerable()
}
