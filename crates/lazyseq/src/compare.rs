//! Three-way comparisons between runtime values.
//!
//! Two families live here. Loose comparison ([`loose_cmp`]) coerces across
//! types the way scripting languages do: numeric strings compare as numbers,
//! booleans compare by truthiness, arrays compare by size first. It is not
//! transitive across mixed numeric and non-numeric strings, so it only backs
//! `min`/`max`. Strict comparison ([`compare_strict`]) and the numeric mode
//! ([`compare_numeric`]) are total orders and back the sort modes.
//!
//! The string modes ([`compare_text`], [`compare_text_ci`], [`natural_cmp`])
//! compare the text conversion of each value.

use std::cmp::Ordering;

use crate::value::{parse_numeric, Array, Number, Object, Value};

/// Strict three-way comparison.
///
/// Values fall into ordered classes: null, booleans, numbers together with
/// numeric strings, other strings, arrays, objects, sequences, host values.
/// Numbers and numeric strings compare by value with NaN last, other strings
/// compare byte-wise, arrays and objects compare by size and then entry by
/// entry. Ties inside a class break on type and then on text.
pub fn compare_strict(a: &Value, b: &Value) -> Ordering {
    strict_class(a)
        .cmp(&strict_class(b))
        .then_with(|| match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Array(x), Value::Array(y)) => {
                x.len().cmp(&y.len()).then_with(|| {
                    entries_cmp(x.iter().zip(y.iter()).map(|((kx, vx), (ky, vy))| {
                        kx.cmp(ky).then_with(|| compare_strict(vx, vy))
                    }))
                })
            }
            (Value::Object(x), Value::Object(y)) => {
                x.len().cmp(&y.len()).then_with(|| {
                    entries_cmp(x.iter().zip(y.iter()).map(|((nx, vx), (ny, vy))| {
                        nx.cmp(ny).then_with(|| compare_strict(vx, vy))
                    }))
                })
            }
            _ => match (strict_number(a), strict_number(b)) {
                (Some(m), Some(n)) => total_number_cmp(m, n),
                _ => Ordering::Equal,
            },
        })
        .then_with(|| type_rank(a).cmp(&type_rank(b)))
        .then_with(|| a.to_text().cmp(&b.to_text()))
}

/// Loose three-way comparison with cross-type coercion.
pub fn loose_cmp(a: &Value, b: &Value) -> Ordering {
    use Value::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Bool(_), _) | (_, Bool(_)) => a.truthy().cmp(&b.truthy()),
        (Null, Str(s)) => "".cmp(s.as_str()),
        (Str(s), Null) => s.as_str().cmp(""),
        (Null, _) => false.cmp(&b.truthy()),
        (_, Null) => a.truthy().cmp(&false),
        (Int(_) | Float(_), Int(_) | Float(_)) => number_cmp(a, b),
        (Str(x), Str(y)) => match (parse_numeric(x), parse_numeric(y)) {
            (Some(m), Some(n)) => m.compare(n).unwrap_or(Ordering::Equal),
            _ => x.cmp(y),
        },
        (Int(_) | Float(_), Str(s)) => match parse_numeric(s) {
            Some(n) => number_of(a).compare(n).unwrap_or(Ordering::Equal),
            None => a.to_text().as_str().cmp(s.as_str()),
        },
        (Str(s), Int(_) | Float(_)) => match parse_numeric(s) {
            Some(n) => n.compare(number_of(b)).unwrap_or(Ordering::Equal),
            None => s.as_str().cmp(b.to_text().as_str()),
        },
        (Array(x), Array(y)) => array_cmp(x, y),
        (Object(x), Object(y)) => object_cmp(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Numeric comparison of the float readings of both values. NaN sorts after
/// every number.
pub fn compare_numeric(a: &Value, b: &Value) -> Ordering {
    float_cmp(a.to_float(), b.to_float())
}

/// Byte-wise comparison of the text conversions.
pub fn compare_text(a: &Value, b: &Value) -> Ordering {
    a.to_text().cmp(&b.to_text())
}

/// ASCII case-insensitive comparison of the text conversions.
pub fn compare_text_ci(a: &Value, b: &Value) -> Ordering {
    let (x, y) = (a.to_text(), b.to_text());
    x.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(y.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Natural-order string comparison: runs of digits compare by numeric value,
/// so `"img12"` sorts after `"img2"`. Whitespace is skipped. Digit runs with a
/// leading zero compare as fractional parts.
pub fn natural_cmp(a: &str, b: &str, fold_case: bool) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    loop {
        while i < a.len() && a[i].is_ascii_whitespace() {
            i += 1;
        }
        while j < b.len() && b[j].is_ascii_whitespace() {
            j += 1;
        }
        let (ca, cb) = match (a.get(i), b.get(j)) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ca), Some(&cb)) => (ca, cb),
        };
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let ei = digit_run_end(a, i);
            let ej = digit_run_end(b, j);
            let (x, y) = (&a[i..ei], &b[j..ej]);
            let ord = if ca == b'0' || cb == b'0' {
                x.cmp(y)
            } else {
                x.len().cmp(&y.len()).then_with(|| x.cmp(y))
            };
            if ord != Ordering::Equal {
                return ord;
            }
            i = ei;
            j = ej;
        } else {
            let (x, y) = if fold_case {
                (ca.to_ascii_lowercase(), cb.to_ascii_lowercase())
            } else {
                (ca, cb)
            };
            if x != y {
                return x.cmp(&y);
            }
            i += 1;
            j += 1;
        }
    }
}

fn digit_run_end(s: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn number_of(v: &Value) -> Number {
    match v {
        Value::Int(n) => Number::Int(*n),
        other => Number::Float(other.to_float()),
    }
}

fn number_cmp(a: &Value, b: &Value) -> Ordering {
    number_of(a)
        .compare(number_of(b))
        .unwrap_or(Ordering::Equal)
}

// Smaller arrays are less; equal-sized arrays compare element by element on
// the left operand's keys. A key missing on the right makes the left greater.
fn array_cmp(x: &Array, y: &Array) -> Ordering {
    x.len().cmp(&y.len()).then_with(|| {
        for (key, left) in x {
            match y.get(key) {
                Some(right) => match loose_cmp(left, right) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
                None => return Ordering::Greater,
            }
        }
        Ordering::Equal
    })
}

fn object_cmp(x: &Object, y: &Object) -> Ordering {
    x.len().cmp(&y.len()).then_with(|| {
        for (name, left) in x {
            match y.get(name) {
                Some(right) => match loose_cmp(left, right) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
                None => return Ordering::Greater,
            }
        }
        Ordering::Equal
    })
}

fn strict_class(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::Str(s) if parse_numeric(s).is_some() => 2,
        Value::Str(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
        Value::Seq(_) => 6,
        Value::Host(_) => 7,
    }
}

fn strict_number(v: &Value) -> Option<Number> {
    match v {
        Value::Int(n) => Some(Number::Int(*n)),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::Str(s) => parse_numeric(s),
        _ => None,
    }
}

fn entries_cmp(mut pairs: impl Iterator<Item = Ordering>) -> Ordering {
    pairs
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn total_number_cmp(m: Number, n: Number) -> Ordering {
    match (m, n) {
        (Number::Int(x), Number::Int(y)) => x.cmp(&y),
        (Number::Int(x), Number::Float(f)) => int_float_cmp(x, f),
        (Number::Float(f), Number::Int(x)) => int_float_cmp(x, f).reverse(),
        (Number::Float(f), Number::Float(g)) => float_cmp(f, g),
    }
}

// NaN is greater than every number and equal to itself; -0.0 equals 0.0.
fn float_cmp(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

// Exact: the integer is never rounded through f64.
fn int_float_cmp(x: i64, f: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    x.cmp(&(whole as i64))
        .then_with(|| float_cmp(0.0, f - whole))
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Float(_) => 3,
        Value::Str(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
        Value::Seq(_) => 7,
        Value::Host(_) => 8,
    }
}
