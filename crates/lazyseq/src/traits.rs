//! The sequence-source capability.
//!
//! This module provides the [`IntoEnumerable`] trait, implemented by every
//! type that [`from`](crate::from) accepts as a sequence source.

use crate::enumerable::Enumerable;
use crate::error::{LinqError, Result};
use crate::value::{Array, Value};

/// Types that can act as the source of a sequence.
///
/// Arrays, vectors, fixed-size arrays, sequences and [`Value`]s holding an
/// array or sequence are supported out of the box. Any other [`Value`] fails
/// with [`LinqError::UnsupportedSourceType`].
///
/// # Manual Implementation
///
/// Host types opt in by providing their own sequence:
///
/// ```
/// use lazyseq::{from, Enumerable, IntoEnumerable, Key, Result, Value};
///
/// struct Inventory {
///     items: Vec<(&'static str, i64)>,
/// }
///
/// impl IntoEnumerable for Inventory {
///     fn into_enumerable(self) -> Result<Enumerable> {
///         Ok(Enumerable::from_pairs(self.items))
///     }
/// }
///
/// let inventory = Inventory { items: vec![("apples", 3), ("pears", 5)] };
/// let total = from(inventory).unwrap().sum().unwrap();
/// assert_eq!(total, Value::from(8));
/// ```
pub trait IntoEnumerable {
    /// Converts the source into a sequence.
    ///
    /// Called once, when the sequence is adapted; the conversion may validate
    /// the source and fail eagerly.
    fn into_enumerable(self) -> Result<Enumerable>;
}

impl IntoEnumerable for Enumerable {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self)
    }
}

impl IntoEnumerable for &Enumerable {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self.clone())
    }
}

impl IntoEnumerable for Array {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(Enumerable::from_array(self))
    }
}

impl<T: Into<Value>> IntoEnumerable for Vec<T> {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> IntoEnumerable for [T; N] {
    fn into_enumerable(self) -> Result<Enumerable> {
        Ok(self.into_iter().map(Into::into).collect())
    }
}

impl IntoEnumerable for Value {
    fn into_enumerable(self) -> Result<Enumerable> {
        match self {
            Value::Array(array) => Ok(Enumerable::from_array(array)),
            Value::Seq(seq) => Ok(seq),
            other => Err(LinqError::UnsupportedSourceType(other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::value::HostValue;

    #[test]
    fn sequence_passes_through() {
        let seq = Enumerable::from_pairs([(0, 1)]);
        assert!(seq.clone().into_enumerable().unwrap().ptr_eq(&seq));
        assert!((&seq).into_enumerable().unwrap().ptr_eq(&seq));
    }

    #[test]
    fn collections_adapt() {
        let from_vec = vec![1, 2, 3].into_enumerable().unwrap();
        assert_eq!(from_vec.to_list().unwrap().len(), 3);

        let from_fixed = ["a", "b"].into_enumerable().unwrap();
        assert_eq!(from_fixed.to_list().unwrap(), vec![Value::from("a"), Value::from("b")]);

        let mut array = Array::new();
        array.insert(Key::from("x"), Value::Int(1));
        let from_array = array.into_enumerable().unwrap();
        assert!(from_array.snapshot().is_some());
    }

    #[test]
    fn values_adapt_only_when_sequence_like() {
        assert!(Value::list(vec![Value::Int(1)]).into_enumerable().is_ok());
        let seq = Enumerable::from_pairs([(0, 1)]);
        assert!(Value::Seq(seq.clone()).into_enumerable().unwrap().ptr_eq(&seq));

        for bad in [
            Value::Null,
            Value::Bool(true),
            Value::Int(3),
            Value::from("abc"),
            Value::Object(Default::default()),
            Value::Host(HostValue::new(5u8)),
        ] {
            assert!(matches!(
                bad.into_enumerable(),
                Err(LinqError::UnsupportedSourceType(_))
            ));
        }
    }
}
