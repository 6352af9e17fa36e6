//! Runtime value types carried by keyed sequences.
//!
//! The [`Value`] enum is the dynamic element type of every sequence. It covers
//! scalars, ordered arrays, nested sequences, property objects and opaque host
//! values. Conversions between variants (truthiness, numeric coercion, text)
//! follow loose scripting-language rules so that mixed data can be queried
//! without a schema.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::enumerable::Enumerable;
use crate::key::Key;

/// Insertion-ordered key/value array. Assigning an existing key overwrites the
/// value in place.
pub type Array = IndexMap<Key, Value>;

/// Insertion-ordered property bag.
pub type Object = IndexMap<String, Value>;

/// One-to-many map from a derived key to every value that produced it.
pub type Lookup = IndexMap<Key, Vec<Value>>;

/// Runtime value of a sequence element.
///
/// Equality (`==`) is strict: variants must match and payloads must be equal.
/// `Seq` and `Host` values are equal only when they share the same allocation.
///
/// # Example
///
/// ```
/// use lazyseq::Value;
///
/// assert_eq!(Value::from(3), Value::Int(3));
/// assert_ne!(Value::from(3), Value::from(3.0));
/// assert_eq!(Value::from("5").to_int(), 5);
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Owned string.
    Str(String),
    /// Ordered key/value array.
    Array(Array),
    /// Nested lazy sequence (groups, join matches).
    Seq(Enumerable),
    /// Property object.
    Object(Object),
    /// Opaque host value.
    Host(HostValue),
}

impl Value {
    /// Builds a list array with sequential integer keys.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Int(i as i64), v))
                .collect(),
        )
    }

    /// Returns a short name for the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Seq(_) => "sequence",
            Value::Object(_) => "object",
            Value::Host(h) => h.type_name(),
        }
    }

    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for integers and floats.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns `true` for booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    /// Returns `true` for numbers and numeric strings.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) | Value::Float(_) => true,
            Value::Str(s) => parse_numeric(s).is_some(),
            _ => false,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the integer value, if present.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the float value, if present.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the array, if present.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Extracts the nested sequence, if present.
    pub fn as_seq(&self) -> Option<&Enumerable> {
        match self {
            Value::Seq(e) => Some(e),
            _ => None,
        }
    }

    /// Extracts the object, if present.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Truthiness: `false`, `0`, `0.0`, `""`, `"0"`, `null` and empty arrays
    /// are false; everything else is true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !(s.is_empty() || s == "0"),
            Value::Array(a) => !a.is_empty(),
            Value::Seq(_) | Value::Object(_) | Value::Host(_) => true,
        }
    }

    /// Returns the numeric reading of this value for arithmetic: numbers as
    /// they are, numeric strings parsed, booleans and null as `0`/`1`.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Null => Some(Number::Int(0)),
            Value::Bool(b) => Some(Number::Int(*b as i64)),
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Integer cast. Strings contribute their leading numeric prefix, floats
    /// are truncated, non-empty arrays and opaque values are `1`.
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => *b as i64,
            Value::Int(n) => *n,
            Value::Float(f) if f.is_finite() => f.trunc() as i64,
            Value::Float(_) => 0,
            Value::Str(s) => match leading_numeric(s) {
                Number::Int(n) => n,
                Number::Float(f) if f.is_finite() => f.trunc() as i64,
                Number::Float(_) => 0,
            },
            Value::Array(a) => !a.is_empty() as i64,
            Value::Seq(_) | Value::Object(_) | Value::Host(_) => 1,
        }
    }

    /// Float cast, with the same rules as [`Value::to_int`].
    pub fn to_float(&self) -> f64 {
        match self {
            Value::Float(f) => *f,
            Value::Str(s) => leading_numeric(s).to_f64(),
            other => other.to_int() as f64,
        }
    }

    /// Text conversion used by string casts and joined output.
    ///
    /// `true` is `"1"`, `false` and null are `""`, arrays are `"Array"`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => s.clone(),
            Value::Array(_) => "Array".to_string(),
            Value::Seq(_) => "Sequence".to_string(),
            Value::Object(_) => "Object".to_string(),
            Value::Host(h) => h.type_name().to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Seq(a), Value::Seq(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Opaque host value with its Rust type name.
///
/// Host values flow through sequences untouched; `of_type` can select them by
/// type name.
#[derive(Clone)]
pub struct HostValue {
    type_name: &'static str,
    inner: Rc<dyn Any>,
}

impl HostValue {
    /// Wraps a host value.
    pub fn new<T: Any>(value: T) -> Self {
        HostValue {
            type_name: std::any::type_name::<T>(),
            inner: Rc::new(value),
        }
    }

    /// Returns the full Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the wrapped value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Returns `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &HostValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostValue({})", self.type_name)
    }
}

/// Numeric value used for arithmetic and numeric comparison.
///
/// Integer arithmetic stays in `Int` until a float is involved or the result
/// overflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    /// Adds two numbers, widening to float on overflow or mixed operands.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(n) => Number::Int(n),
                None => Number::Float(a as f64 + b as f64),
            },
            _ => Number::Float(self.to_f64() + other.to_f64()),
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(n) => Value::Int(n),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// Parses a numeric string: optional surrounding whitespace, optional sign,
/// digits with an optional fraction and exponent.
pub fn parse_numeric(s: &str) -> Option<Number> {
    let t = s.trim_matches(|c: char| c.is_ascii_whitespace());
    let (len, is_int) = scan_number(t);
    if len == 0 || len != t.len() {
        return None;
    }
    if is_int {
        if let Ok(n) = t.parse::<i64>() {
            return Some(Number::Int(n));
        }
    }
    t.parse::<f64>().ok().map(Number::Float)
}

/// Reads the longest numeric prefix of `s` (after leading whitespace);
/// strings without one read as `0`.
fn leading_numeric(s: &str) -> Number {
    let t = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (len, is_int) = scan_number(t);
    let prefix = &t[..len];
    if len == 0 {
        return Number::Int(0);
    }
    if is_int {
        if let Ok(n) = prefix.parse::<i64>() {
            return Number::Int(n);
        }
    }
    prefix.parse::<f64>().map(Number::Float).unwrap_or(Number::Int(0))
}

/// Returns the byte length of the numeric prefix of `s` and whether it is a
/// plain integer (no fraction, no exponent).
fn scan_number(s: &str) -> (usize, bool) {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    let mut is_int = true;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if mantissa_digits > 0 || j > frac_start {
            mantissa_digits += j - frac_start;
            i = j;
            is_int = false;
        }
    }
    if mantissa_digits == 0 {
        return (0, false);
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
            is_int = false;
        }
    }
    (i, is_int)
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        f.to_string()
    }
}

/// Returns `true` if the array keys are exactly `0..len` in order.
pub(crate) fn is_list(array: &Array) -> bool {
    array
        .keys()
        .enumerate()
        .all(|(i, k)| *k == Key::Int(i as i64))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => Err(S::Error::custom("Inf and NaN cannot be JSON encoded")),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(a) => serialize_array(a, serializer),
            Value::Seq(e) => {
                let array = e.to_array().map_err(S::Error::custom)?;
                serialize_array(&array, serializer)
            }
            Value::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (name, value) in o {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Host(h) => Err(S::Error::custom(format!(
                "host value of type {} cannot be serialized",
                h.type_name()
            ))),
        }
    }
}

fn serialize_array<S: Serializer>(array: &Array, serializer: S) -> Result<S::Ok, S::Error> {
    if is_list(array) {
        let mut seq = serializer.serialize_seq(Some(array.len()))?;
        for value in array.values() {
            seq.serialize_element(value)?;
        }
        seq.end()
    } else {
        let mut map = serializer.serialize_map(Some(array.len()))?;
        for (key, value) in array {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

// Conversions from primitive types
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::list(values)
    }
}

impl From<Enumerable> for Value {
    fn from(e: Enumerable) -> Self {
        Value::Seq(e)
    }
}

impl From<HostValue> for Value {
    fn from(h: HostValue) -> Self {
        Value::Host(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_eq!(
            Value::list(vec![Value::Int(1), Value::from("a")]),
            Value::list(vec![Value::Int(1), Value::from("a")])
        );
    }

    #[test]
    fn scalar_kinds() {
        assert!(Value::Bool(false).is_scalar());
        assert!(Value::Float(1.5).is_scalar());
        assert!(Value::from("").is_scalar());
        assert!(!Value::Null.is_scalar());
        assert!(!Value::list(Vec::new()).is_scalar());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::from("0").truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("0.0").truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Float(0.5).truthy());
        assert!(!Value::list(Vec::new()).truthy());
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(parse_numeric("42"), Some(Number::Int(42)));
        assert_eq!(parse_numeric(" -3.5 "), Some(Number::Float(-3.5)));
        assert_eq!(parse_numeric("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_numeric(".5"), Some(Number::Float(0.5)));
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("12abc"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("."), None);
    }

    #[test]
    fn casts() {
        assert_eq!(Value::from("12abc").to_int(), 12);
        assert_eq!(Value::from("abc").to_int(), 0);
        assert_eq!(Value::Float(3.9).to_int(), 3);
        assert_eq!(Value::Bool(true).to_int(), 1);
        assert_eq!(Value::from("2.5x").to_float(), 2.5);
        assert_eq!(Value::from("1e2").to_int(), 100);
    }

    #[test]
    fn text_conversion() {
        assert_eq!(Value::Bool(true).to_text(), "1");
        assert_eq!(Value::Bool(false).to_text(), "");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Float(1.0).to_text(), "1");
        assert_eq!(Value::Float(1.5).to_text(), "1.5");
        assert_eq!(Value::Float(f64::INFINITY).to_text(), "INF");
        assert_eq!(Value::list(Vec::new()).to_text(), "Array");
    }

    #[test]
    fn number_comparisons_mixed_types() {
        use std::cmp::Ordering;
        assert_eq!(
            Number::Int(5).compare(Number::Float(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::Int(10).compare(Number::Float(5.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(Number::Float(f64::NAN).compare(Number::Int(1)), None);
    }

    #[test]
    fn number_add_widens_on_overflow() {
        assert_eq!(Number::Int(2).add(Number::Int(3)), Number::Int(5));
        assert_eq!(Number::Int(2).add(Number::Float(0.5)), Number::Float(2.5));
        assert!(matches!(
            Number::Int(i64::MAX).add(Number::Int(1)),
            Number::Float(_)
        ));
    }

    #[test]
    fn host_values() {
        struct Widget(u8);
        let h = HostValue::new(Widget(7));
        assert!(h.type_name().ends_with("Widget"));
        assert_eq!(h.downcast_ref::<Widget>().map(|w| w.0), Some(7));
        let same = Value::Host(h.clone());
        assert_eq!(same, Value::Host(h));
    }

    #[test]
    fn list_detection() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert!(is_list(list.as_array().unwrap()));

        let mut keyed = Array::new();
        keyed.insert(Key::from("a"), Value::Int(1));
        assert!(!is_list(&keyed));
    }

    #[test]
    fn serialize_json() {
        let list = Value::list(vec![Value::Int(1), Value::from("x"), Value::Null]);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"[1,"x",null]"#);

        let mut keyed = Array::new();
        keyed.insert(Key::from("a"), Value::Bool(true));
        keyed.insert(Key::from(3), Value::Float(1.5));
        assert_eq!(
            serde_json::to_string(&Value::Array(keyed)).unwrap(),
            r#"{"a":true,"3":1.5}"#
        );

        assert!(serde_json::to_string(&Value::Float(f64::NAN)).is_err());
    }
}
