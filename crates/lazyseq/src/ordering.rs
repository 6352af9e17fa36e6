//! Ordering types for sequence sorting.
//!
//! Provides [`Dir`] for sort direction, [`SortFlags`] for the primitive
//! comparison modes and [`SortComparer`], which is either a primitive mode or
//! a caller-supplied comparison function.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::compare;
use crate::error::LinqError;
use crate::value::Value;

/// Caller-supplied three-way comparison.
pub type CompareFn = Rc<dyn Fn(&Value, &Value) -> Ordering>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

/// `true` means descending.
impl From<bool> for Dir {
    fn from(descending: bool) -> Self {
        if descending {
            Dir::Desc
        } else {
            Dir::Asc
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Primitive comparison modes.
///
/// A chain of criteria that only uses these modes is sorted with the bulk
/// multi-column path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortFlags {
    /// Strict three-way comparison.
    #[default]
    Regular,
    /// Numeric comparison.
    Numeric,
    /// Byte-wise string comparison.
    String,
    /// ASCII case-insensitive string comparison.
    StringCaseInsensitive,
    /// Locale-aware string comparison. Only the "C" locale is supported, so
    /// this is byte-wise.
    LocaleString,
    /// Natural-order string comparison.
    Natural,
    /// Case-insensitive natural-order string comparison.
    NaturalCaseInsensitive,
}

impl SortFlags {
    /// Compares two values in this mode.
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortFlags::Regular => compare::compare_strict(a, b),
            SortFlags::Numeric => compare::compare_numeric(a, b),
            SortFlags::String | SortFlags::LocaleString => compare::compare_text(a, b),
            SortFlags::StringCaseInsensitive => compare::compare_text_ci(a, b),
            SortFlags::Natural => compare::natural_cmp(&a.to_text(), &b.to_text(), false),
            SortFlags::NaturalCaseInsensitive => {
                compare::natural_cmp(&a.to_text(), &b.to_text(), true)
            }
        }
    }

    /// Returns the numeric flag constant of this mode.
    pub fn bits(self) -> i32 {
        match self {
            SortFlags::Regular => 0,
            SortFlags::Numeric => 1,
            SortFlags::String => 2,
            SortFlags::LocaleString => 5,
            SortFlags::Natural => 6,
            SortFlags::StringCaseInsensitive => 10,
            SortFlags::NaturalCaseInsensitive => 14,
        }
    }

    /// Returns the canonical name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            SortFlags::Regular => "regular",
            SortFlags::Numeric => "numeric",
            SortFlags::String => "string",
            SortFlags::StringCaseInsensitive => "string-ci",
            SortFlags::LocaleString => "locale",
            SortFlags::Natural => "natural",
            SortFlags::NaturalCaseInsensitive => "natural-ci",
        }
    }
}

impl fmt::Display for SortFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortFlags {
    type Err = LinqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(SortFlags::Regular),
            "numeric" => Ok(SortFlags::Numeric),
            "string" | "plain" | "strcmp" => Ok(SortFlags::String),
            "string-ci" | "case-insensitive" | "strcasecmp" => {
                Ok(SortFlags::StringCaseInsensitive)
            }
            "locale" | "strcoll" => Ok(SortFlags::LocaleString),
            "natural" | "strnatcmp" => Ok(SortFlags::Natural),
            "natural-ci" | "natural-case-insensitive" | "strnatcasecmp" => {
                Ok(SortFlags::NaturalCaseInsensitive)
            }
            other => Err(LinqError::InvalidArgument(format!(
                "unknown sort mode: {}",
                other
            ))),
        }
    }
}

impl TryFrom<i32> for SortFlags {
    type Error = LinqError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(SortFlags::Regular),
            1 => Ok(SortFlags::Numeric),
            2 => Ok(SortFlags::String),
            5 => Ok(SortFlags::LocaleString),
            6 => Ok(SortFlags::Natural),
            10 => Ok(SortFlags::StringCaseInsensitive),
            14 => Ok(SortFlags::NaturalCaseInsensitive),
            other => Err(LinqError::InvalidArgument(format!(
                "unsupported sort flags: {}",
                other
            ))),
        }
    }
}

/// How a sort criterion compares its keys.
#[derive(Clone)]
pub enum SortComparer {
    /// Primitive mode, eligible for the bulk sort path.
    Flags(SortFlags),
    /// Custom comparison, sorted with the fallback path.
    Func(CompareFn),
}

impl SortComparer {
    /// Wraps a comparison closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + 'static,
    {
        SortComparer::Func(Rc::new(f))
    }

    /// Compares two keys.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortComparer::Flags(flags) => flags.compare(a, b),
            SortComparer::Func(f) => f(a, b),
        }
    }

    /// Returns the primitive mode, if this comparer has one.
    pub fn flags(&self) -> Option<SortFlags> {
        match self {
            SortComparer::Flags(flags) => Some(*flags),
            SortComparer::Func(_) => None,
        }
    }
}

impl Default for SortComparer {
    fn default() -> Self {
        SortComparer::Flags(SortFlags::Regular)
    }
}

impl From<SortFlags> for SortComparer {
    fn from(flags: SortFlags) -> Self {
        SortComparer::Flags(flags)
    }
}

impl<F> From<F> for SortComparer
where
    F: Fn(&Value, &Value) -> Ordering + 'static,
{
    fn from(f: F) -> Self {
        SortComparer::func(f)
    }
}

impl fmt::Debug for SortComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortComparer::Flags(flags) => write!(f, "SortComparer::Flags({:?})", flags),
            SortComparer::Func(_) => f.write_str("SortComparer::Func(..)"),
        }
    }
}

/// Compares two rows of sort keys column by column.
///
/// Uses the first column as the primary sort key, the second to break ties,
/// and so on. If all columns compare equal, returns `Equal`.
pub(crate) fn compare_rows(
    a: &[Value],
    b: &[Value],
    columns: &[(Dir, SortComparer)],
) -> Ordering {
    for ((dir, comparer), (x, y)) in columns.iter().zip(a.iter().zip(b.iter())) {
        let ordering = dir.apply(comparer.compare(x, y));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Asc.apply(Ordering::Greater), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Greater), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn dir_from_bool() {
        assert_eq!(Dir::from(true), Dir::Desc);
        assert_eq!(Dir::from(false), Dir::Asc);
        assert!(Dir::default().is_asc());
        assert_eq!(Dir::Desc.to_string(), "desc");
    }

    #[test]
    fn flags_from_names() {
        assert_eq!("strcmp".parse::<SortFlags>().unwrap(), SortFlags::String);
        assert_eq!(
            "strnatcasecmp".parse::<SortFlags>().unwrap(),
            SortFlags::NaturalCaseInsensitive
        );
        assert_eq!("locale".parse::<SortFlags>().unwrap(), SortFlags::LocaleString);
        assert!(matches!(
            "bogus".parse::<SortFlags>(),
            Err(LinqError::InvalidArgument(_))
        ));
    }

    #[test]
    fn flags_from_bits() {
        for flags in [
            SortFlags::Regular,
            SortFlags::Numeric,
            SortFlags::String,
            SortFlags::StringCaseInsensitive,
            SortFlags::LocaleString,
            SortFlags::Natural,
            SortFlags::NaturalCaseInsensitive,
        ] {
            assert_eq!(SortFlags::try_from(flags.bits()).unwrap(), flags);
        }
        assert!(SortFlags::try_from(3).is_err());
    }

    #[test]
    fn flag_modes_compare() {
        let (ten, nine) = (Value::from("10"), Value::from("9"));
        assert_eq!(SortFlags::Regular.compare(&ten, &nine), Ordering::Greater);
        assert_eq!(SortFlags::Numeric.compare(&ten, &nine), Ordering::Greater);
        assert_eq!(SortFlags::String.compare(&ten, &nine), Ordering::Less);
        assert_eq!(
            SortFlags::Natural.compare(&Value::from("a10"), &Value::from("a9")),
            Ordering::Greater
        );
    }

    #[test]
    fn rows_compare_lexicographically() {
        let columns = vec![
            (Dir::Asc, SortComparer::default()),
            (Dir::Desc, SortComparer::from(SortFlags::Numeric)),
        ];
        let a = [Value::Int(1), Value::Int(5)];
        let b = [Value::Int(1), Value::Int(7)];
        let c = [Value::Int(0), Value::Int(9)];
        assert_eq!(compare_rows(&a, &b, &columns), Ordering::Greater);
        assert_eq!(compare_rows(&c, &a, &columns), Ordering::Less);
        assert_eq!(compare_rows(&a, &a, &columns), Ordering::Equal);
    }

    #[test]
    fn custom_comparer() {
        let by_len = SortComparer::func(|a, b| a.to_text().len().cmp(&b.to_text().len()));
        assert!(by_len.flags().is_none());
        assert_eq!(
            by_len.compare(&Value::from("aaa"), &Value::from("b")),
            Ordering::Greater
        );
    }
}
