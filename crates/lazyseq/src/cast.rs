//! Target kinds for `cast` and `of_type`.

use std::fmt;
use std::str::FromStr;

use crate::error::{LinqError, Result};
use crate::key::Key;
use crate::value::{Array, Object, Value};

/// Conversion target of [`Enumerable::cast`](crate::Enumerable::cast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    /// Wrap scalars in a one-element array; objects become keyed arrays.
    Array,
    /// Integer cast.
    Int,
    /// Float cast.
    Float,
    /// Replace every value with null.
    Null,
    /// Wrap scalars as `{"scalar": v}`; arrays become objects.
    Object,
    /// Text conversion.
    String,
}

impl CastType {
    /// Converts one value. Nested sequences are materialized, which is the
    /// only way this can fail.
    pub fn apply(self, value: &Value) -> Result<Value> {
        Ok(match self {
            CastType::Array => Value::Array(to_array(value)?),
            CastType::Int => Value::Int(value.to_int()),
            CastType::Float => Value::Float(value.to_float()),
            CastType::Null => Value::Null,
            CastType::Object => Value::Object(to_object(value)?),
            CastType::String => Value::Str(value.to_text()),
        })
    }

    /// Returns the canonical name of this target.
    pub fn as_str(self) -> &'static str {
        match self {
            CastType::Array => "array",
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::Null => "null",
            CastType::Object => "object",
            CastType::String => "string",
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CastType {
    type Err = LinqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "array" => Ok(CastType::Array),
            "int" | "integer" | "long" => Ok(CastType::Int),
            "float" | "real" | "double" => Ok(CastType::Float),
            "null" | "unset" => Ok(CastType::Null),
            "object" => Ok(CastType::Object),
            "string" => Ok(CastType::String),
            _ => Err(LinqError::InvalidArgument(
                "type must be one of built-in types.".to_string(),
            )),
        }
    }
}

/// Type test of [`Enumerable::of_type`](crate::Enumerable::of_type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    /// Arrays.
    Array,
    /// Integers.
    Int,
    /// Floats.
    Float,
    /// Null.
    Null,
    /// Numbers and numeric strings.
    Numeric,
    /// Objects (property bags and host values).
    Object,
    /// Booleans, numbers and strings.
    Scalar,
    /// Strings.
    String,
    /// Nested sequences.
    Sequence,
    /// Host values of the named type. Matches the full Rust type path or its
    /// trailing segments (`"Point"` matches `my_crate::geo::Point`).
    Host(String),
}

impl TypeFilter {
    /// Returns `true` if `value` passes this test.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeFilter::Array => matches!(value, Value::Array(_)),
            TypeFilter::Int => matches!(value, Value::Int(_)),
            TypeFilter::Float => matches!(value, Value::Float(_)),
            TypeFilter::Null => value.is_null(),
            TypeFilter::Numeric => value.is_numeric(),
            TypeFilter::Object => matches!(value, Value::Object(_) | Value::Host(_)),
            TypeFilter::Scalar => value.is_scalar(),
            TypeFilter::String => matches!(value, Value::Str(_)),
            TypeFilter::Sequence => matches!(value, Value::Seq(_)),
            TypeFilter::Host(name) => match value {
                Value::Host(host) => {
                    let full = host.type_name();
                    full == name.as_str()
                        || full
                            .strip_suffix(name.as_str())
                            .is_some_and(|prefix| prefix.ends_with("::"))
                }
                _ => false,
            },
        }
    }
}

/// Known names map to built-in kinds; anything else names a host type.
impl FromStr for TypeFilter {
    type Err = LinqError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "array" => TypeFilter::Array,
            "int" | "integer" | "long" => TypeFilter::Int,
            "float" | "real" | "double" => TypeFilter::Float,
            "null" => TypeFilter::Null,
            "numeric" => TypeFilter::Numeric,
            "object" => TypeFilter::Object,
            "scalar" => TypeFilter::Scalar,
            "string" => TypeFilter::String,
            "sequence" => TypeFilter::Sequence,
            other => TypeFilter::Host(other.to_string()),
        })
    }
}

fn to_array(value: &Value) -> Result<Array> {
    Ok(match value {
        Value::Null => Array::new(),
        Value::Array(array) => array.clone(),
        Value::Seq(seq) => seq.to_array()?,
        Value::Object(object) => object
            .iter()
            .map(|(name, v)| (Key::string(name.as_str()), v.clone()))
            .collect(),
        other => std::iter::once((Key::Int(0), other.clone())).collect(),
    })
}

fn to_object(value: &Value) -> Result<Object> {
    Ok(match value {
        Value::Null => Object::new(),
        Value::Object(object) => object.clone(),
        Value::Array(array) => array
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        Value::Seq(seq) => seq
            .to_array()?
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        other => std::iter::once(("scalar".to_string(), other.clone())).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::HostValue;

    #[test]
    fn cast_names() {
        assert_eq!("integer".parse::<CastType>().unwrap(), CastType::Int);
        assert_eq!("double".parse::<CastType>().unwrap(), CastType::Float);
        assert_eq!("unset".parse::<CastType>().unwrap(), CastType::Null);
        assert!(matches!(
            "callable".parse::<CastType>(),
            Err(LinqError::InvalidArgument(_))
        ));
    }

    #[test]
    fn scalar_casts() {
        assert_eq!(CastType::Int.apply(&Value::from("42abc")).unwrap(), Value::Int(42));
        assert_eq!(CastType::Float.apply(&Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(CastType::String.apply(&Value::Bool(true)).unwrap(), Value::from("1"));
        assert_eq!(CastType::Null.apply(&Value::Int(2)).unwrap(), Value::Null);
    }

    #[test]
    fn compound_casts() {
        assert_eq!(
            CastType::Array.apply(&Value::Int(5)).unwrap(),
            Value::list(vec![Value::Int(5)])
        );
        assert_eq!(
            CastType::Array.apply(&Value::Null).unwrap(),
            Value::Array(Array::new())
        );
        let object = CastType::Object.apply(&Value::from("x")).unwrap();
        assert_eq!(
            object.as_object().and_then(|o| o.get("scalar")),
            Some(&Value::from("x"))
        );
        let from_list = CastType::Object
            .apply(&Value::list(vec![Value::Int(7)]))
            .unwrap();
        assert_eq!(
            from_list.as_object().and_then(|o| o.get("0")),
            Some(&Value::Int(7))
        );
    }

    #[test]
    fn type_filters() {
        assert!(TypeFilter::Numeric.matches(&Value::from("1.5")));
        assert!(!TypeFilter::Numeric.matches(&Value::from("x")));
        assert!(TypeFilter::Scalar.matches(&Value::Bool(false)));
        assert!(!TypeFilter::Scalar.matches(&Value::Null));
        assert!(TypeFilter::Int.matches(&Value::Int(1)));
        assert!(!TypeFilter::Int.matches(&Value::Float(1.0)));
    }

    #[test]
    fn host_type_filter() {
        struct Point;
        let host = Value::Host(HostValue::new(Point));
        assert!(TypeFilter::Object.matches(&host));
        assert!(TypeFilter::Host("Point".into()).matches(&host));
        assert!(!TypeFilter::Host("oint".into()).matches(&host));
        assert_eq!("Point".parse::<TypeFilter>().unwrap(), TypeFilter::Host("Point".into()));
    }
}
