//! Regex-backed sequence factories.
//!
//! [`matches`] yields one element per match (or per capture group), [`split`]
//! yields the pieces of a string between matches. Patterns use the syntax of
//! the `regex` crate and are compiled when the factory is called, so a bad
//! pattern fails immediately with [`LinqError::InvalidRegex`].
//!
//! [`LinqError::InvalidRegex`]: crate::LinqError::InvalidRegex

use regex::{Captures, Regex};

use crate::enumerable::Enumerable;
use crate::error::Result;
use crate::key::Key;
use crate::value::{Array, Value};

/// How [`matches`] arranges capture groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchOrder {
    /// One element per match, holding that match's groups.
    #[default]
    SetOrder,
    /// One element per group, holding that group's text in every match.
    PatternOrder,
}

/// Options for [`matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFlags {
    /// Arrangement of capture groups.
    pub order: MatchOrder,
    /// Report each capture as `[text, byte offset]`.
    pub offset_capture: bool,
}

impl MatchFlags {
    /// Creates the default flags: set order, no offsets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group arrangement.
    pub fn order(mut self, order: MatchOrder) -> Self {
        self.order = order;
        self
    }

    /// Enables or disables offset capture.
    pub fn offset_capture(mut self, enabled: bool) -> Self {
        self.offset_capture = enabled;
        self
    }
}

/// Options for [`split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitFlags {
    /// Drop empty pieces.
    pub no_empty: bool,
    /// Include the text of capture groups in the delimiters.
    pub delim_capture: bool,
    /// Report each piece as `[text, byte offset]`.
    pub offset_capture: bool,
}

impl SplitFlags {
    /// Creates the default flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables dropping empty pieces.
    pub fn no_empty(mut self, enabled: bool) -> Self {
        self.no_empty = enabled;
        self
    }

    /// Enables or disables capturing delimiter groups.
    pub fn delim_capture(mut self, enabled: bool) -> Self {
        self.delim_capture = enabled;
        self
    }

    /// Enables or disables offset capture.
    pub fn offset_capture(mut self, enabled: bool) -> Self {
        self.offset_capture = enabled;
        self
    }
}

/// Returns the matches of `pattern` in `subject`.
///
/// In set order every element is an array of the groups of one match, keyed
/// by group index and, for named groups, also by name. Trailing groups that
/// did not participate are omitted; inner ones are empty strings. In pattern
/// order the sequence is keyed by group and every element lists that group's
/// text across all matches.
///
/// The matching itself runs when the sequence is enumerated.
///
/// ```
/// use lazyseq::{matches, MatchFlags, Value};
///
/// let words = matches("one two", r"(\w)\w*", MatchFlags::new())
///     .unwrap()
///     .select(|m, _| m.as_array().and_then(|a| a.get_index(1)).map(|(_, v)| v.clone()).unwrap_or(Value::Null))
///     .to_list()
///     .unwrap();
/// assert_eq!(words, vec![Value::from("o"), Value::from("t")]);
/// ```
pub fn matches(subject: impl Into<String>, pattern: &str, flags: MatchFlags) -> Result<Enumerable> {
    let regex = Regex::new(pattern)?;
    let subject = subject.into();
    Ok(Enumerable::from_factory(move || {
        let pairs = match flags.order {
            MatchOrder::SetOrder => set_order(&regex, &subject, flags.offset_capture),
            MatchOrder::PatternOrder => pattern_order(&regex, &subject, flags.offset_capture),
        };
        Box::new(pairs.into_iter().map(Ok))
    }))
}

/// Splits `subject` around matches of `pattern`.
///
/// ```
/// use lazyseq::{split, SplitFlags, Value};
///
/// let parts = split("a, b,,c", r",\s*", SplitFlags::new().no_empty(true)).unwrap();
/// assert_eq!(
///     parts.to_list().unwrap(),
///     vec![Value::from("a"), Value::from("b"), Value::from("c")]
/// );
/// ```
pub fn split(subject: &str, pattern: &str, flags: SplitFlags) -> Result<Enumerable> {
    let regex = Regex::new(pattern)?;
    let mut pieces = Vec::new();
    let mut push = |text: &str, offset: usize| {
        if !(flags.no_empty && text.is_empty()) {
            pieces.push(capture_value(text, offset as i64, flags.offset_capture));
        }
    };

    let mut last = 0;
    for caps in regex.captures_iter(subject) {
        let Some(whole) = caps.get(0) else { continue };
        push(&subject[last..whole.start()], last);
        if flags.delim_capture {
            for i in 1..participating_len(&caps) {
                match caps.get(i) {
                    Some(group) => push(group.as_str(), group.start()),
                    None => push("", whole.start()),
                }
            }
        }
        last = whole.end();
    }
    push(&subject[last..], last);

    Ok(Enumerable::from_values(pieces))
}

fn set_order(regex: &Regex, subject: &str, offsets: bool) -> Vec<(Key, Value)> {
    let names: Vec<Option<&str>> = regex.capture_names().collect();
    regex
        .captures_iter(subject)
        .enumerate()
        .map(|(n, caps)| {
            let mut groups = Array::new();
            for i in 0..participating_len(&caps) {
                let value = match caps.get(i) {
                    Some(group) => capture_value(group.as_str(), group.start() as i64, offsets),
                    None => capture_value("", -1, offsets),
                };
                if let Some(Some(name)) = names.get(i) {
                    groups.insert(Key::string(*name), value.clone());
                }
                groups.insert(Key::Int(i as i64), value);
            }
            (Key::Int(n as i64), Value::Array(groups))
        })
        .collect()
}

fn pattern_order(regex: &Regex, subject: &str, offsets: bool) -> Vec<(Key, Value)> {
    let all: Vec<Captures<'_>> = regex.captures_iter(subject).collect();
    let mut pairs = Vec::new();
    for (i, name) in regex.capture_names().enumerate() {
        let texts: Vec<Value> = all
            .iter()
            .map(|caps| match caps.get(i) {
                Some(group) => capture_value(group.as_str(), group.start() as i64, offsets),
                None => capture_value("", -1, offsets),
            })
            .collect();
        let column = Value::list(texts);
        if let Some(name) = name {
            pairs.push((Key::string(name), column.clone()));
        }
        pairs.push((Key::Int(i as i64), column));
    }
    pairs
}

// Number of groups up to and including the last one that participated.
fn participating_len(caps: &Captures<'_>) -> usize {
    (0..caps.len())
        .rev()
        .find(|&i| caps.get(i).is_some())
        .map_or(0, |i| i + 1)
}

fn capture_value(text: &str, offset: i64, offsets: bool) -> Value {
    if offsets {
        Value::list(vec![Value::from(text), Value::Int(offset)])
    } else {
        Value::from(text)
    }
}
