//! Materialization into arrays, lists, lookups, objects, strings and JSON.

use crate::enumerable::{Enumerable, Pairs};
use crate::error::Result;
use crate::functions::Selector;
use crate::key::Key;
use crate::value::{Array, Lookup, Object, Value};

/// Output options for [`Enumerable::to_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Indent the output.
    pub pretty: bool,
}

impl JsonOptions {
    /// Creates compact output options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables indentation.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }
}

impl Enumerable {
    /// Collects the pairs into an array. A repeated key keeps its first
    /// position and takes the last value.
    pub fn to_array(&self) -> Result<Array> {
        if let Some(array) = self.snapshot() {
            return Ok(Array::clone(array));
        }
        self.iter().collect()
    }

    /// Like [`to_array`](Self::to_array), also materializing nested arrays
    /// and sequences.
    pub fn to_array_deep(&self) -> Result<Array> {
        deep_array(self.iter(), false)
    }

    /// Collects the values in order, discarding keys.
    pub fn to_list(&self) -> Result<Vec<Value>> {
        self.values().collect()
    }

    /// Like [`to_list`](Self::to_list), also turning nested arrays and
    /// sequences into lists.
    pub fn to_list_deep(&self) -> Result<Vec<Value>> {
        self.values().map(|value| deep(value?, true)).collect()
    }

    /// Collects projected `(key, value)` pairs into an array. Later pairs
    /// overwrite earlier ones with the same key.
    pub fn to_dictionary(&self, key: impl Into<Selector>, value: impl Into<Selector>) -> Result<Array> {
        let (key, value) = (key.into(), value.into());
        let mut dictionary = Array::new();
        for item in self.iter() {
            let (k, v) = item?;
            dictionary.insert(key.key(&v, &k)?, value.apply(&v, &k));
        }
        Ok(dictionary)
    }

    /// Groups values by their pair key.
    pub fn to_lookup(&self) -> Result<Lookup> {
        self.to_lookup_by(Selector::Key, Selector::Value)
    }

    /// Groups projected values by a derived key. Groups appear in
    /// first-occurrence order and keep their members in arrival order.
    pub fn to_lookup_by(&self, key: impl Into<Selector>, value: impl Into<Selector>) -> Result<Lookup> {
        let (key, value) = (key.into(), value.into());
        let mut lookup = Lookup::new();
        for item in self.iter() {
            let (k, v) = item?;
            lookup
                .entry(key.key(&v, &k)?)
                .or_default()
                .push(value.apply(&v, &k));
        }
        Ok(lookup)
    }

    /// Yields the keys as values, under sequential keys.
    pub fn to_keys(&self) -> Enumerable {
        let source = self.clone();
        Enumerable::from_factory(move || restamp(source.iter().map(|item| item.map(|(k, _)| k.to_value()))))
    }

    /// Yields the values under sequential keys.
    pub fn to_values(&self) -> Enumerable {
        let source = self.clone();
        Enumerable::from_factory(move || restamp(source.values()))
    }

    /// Collects projected pairs into an object. Property names are the text
    /// of the projected names.
    pub fn to_object(&self, name: impl Into<Selector>, value: impl Into<Selector>) -> Result<Object> {
        let (name, value) = (name.into(), value.into());
        let mut object = Object::new();
        for item in self.iter() {
            let (k, v) = item?;
            object.insert(name.apply(&v, &k).to_text(), value.apply(&v, &k));
        }
        Ok(object)
    }

    /// Joins the text of every value with `separator`.
    ///
    /// ```
    /// use lazyseq::range;
    ///
    /// assert_eq!(range(1, 3, 1).to_joined_string(", ").unwrap(), "1, 2, 3");
    /// ```
    pub fn to_joined_string(&self, separator: &str) -> Result<String> {
        self.to_joined_string_by(separator, Selector::Value)
    }

    /// Joins the text of every projected value with `separator`.
    pub fn to_joined_string_by(&self, separator: &str, selector: impl Into<Selector>) -> Result<String> {
        let selector = selector.into();
        let parts = self
            .iter()
            .map(|item| item.map(|(k, v)| selector.apply(&v, &k).to_text()))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(separator))
    }

    /// Serializes the materialized array as JSON. Arrays with sequential
    /// keys become JSON arrays, everything else JSON objects.
    pub fn to_json(&self, options: JsonOptions) -> Result<String> {
        let array = Value::Array(self.to_array()?);
        let json = if options.pretty {
            serde_json::to_string_pretty(&array)?
        } else {
            serde_json::to_string(&array)?
        };
        Ok(json)
    }

    /// Converts the materialized array into a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(Value::Array(self.to_array()?))?)
    }
}

fn restamp<I>(values: I) -> Pairs
where
    I: Iterator<Item = Result<Value>> + 'static,
{
    let mut next = 0i64;
    Box::new(values.map(move |value| {
        let key = Key::Int(next);
        next += 1;
        value.map(|v| (key, v))
    }))
}

fn deep(value: Value, list: bool) -> Result<Value> {
    Ok(match value {
        Value::Array(array) => Value::Array(deep_array(array.into_iter().map(Ok), list)?),
        Value::Seq(seq) => Value::Array(deep_array(seq.iter(), list)?),
        other => other,
    })
}

fn deep_array<I>(pairs: I, list: bool) -> Result<Array>
where
    I: Iterator<Item = Result<(Key, Value)>>,
{
    let mut array = Array::new();
    for (i, item) in pairs.enumerate() {
        let (k, v) = item?;
        let key = if list { Key::from(i) } else { k };
        array.insert(key, deep(v, list)?);
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinqError;

    fn nested() -> Enumerable {
        let inner: Enumerable = vec![Value::Int(1), Value::Int(2)].into_iter().collect();
        Enumerable::from_pairs([
            ("seq", Value::Seq(inner.filter(|_, k| k.as_int() == Some(1)))),
            ("arr", Value::Array(Enumerable::from_pairs([("x", 3)]).to_array().unwrap())),
        ])
    }

    #[test]
    fn arrays_and_lists() {
        let seq = Enumerable::from_factory(|| {
            Box::new(
                [("a", 1), ("b", 2), ("a", 3)]
                    .into_iter()
                    .map(|(k, v)| Ok((Key::from(k), Value::from(v)))),
            )
        });
        let array = seq.to_array().unwrap();
        let keys: Vec<Key> = array.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
        assert_eq!(array[&Key::from("a")], Value::Int(3));
        assert_eq!(
            seq.to_list().unwrap(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn deep_conversions() {
        let deep = nested().to_array_deep().unwrap();
        let seq_part = deep[&Key::from("seq")].as_array().unwrap();
        assert_eq!(seq_part.get(&Key::Int(1)), Some(&Value::Int(2)));
        let arr_part = deep[&Key::from("arr")].as_array().unwrap();
        assert_eq!(arr_part.get(&Key::from("x")), Some(&Value::Int(3)));

        let listed = nested().to_list_deep().unwrap();
        assert_eq!(listed[0], Value::list(vec![Value::Int(2)]));
        assert_eq!(listed[1], Value::list(vec![Value::Int(3)]));
    }

    #[test]
    fn dictionary_last_write_wins() {
        let seq: Enumerable = ["ab", "ac", "b"].iter().map(|&s| Value::from(s)).collect();
        let first_letter = || Selector::func(|v, _| Value::from(&v.to_text()[..1]));
        let dict = seq.to_dictionary(first_letter(), Selector::Value).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict[&Key::from("a")], Value::from("ac"));
        let lookup = seq.to_lookup_by(first_letter(), Selector::Key).unwrap();
        assert_eq!(lookup[&Key::from("a")], vec![Value::Int(0), Value::Int(1)]);
        assert_eq!(lookup[&Key::from("b")], vec![Value::Int(2)]);
    }

    #[test]
    fn lookup_by_pair_key() {
        let seq = Enumerable::from_pairs([("a", 1)]).concat(Enumerable::from_pairs([("a", 2)])).unwrap();
        let lookup = seq.to_lookup().unwrap();
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup[&Key::from("a")], vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn keys_and_values_restamp() {
        let seq = Enumerable::from_pairs([("a", 1), ("b", 2)]);
        let keys = seq.to_keys().collect_pairs().unwrap();
        assert_eq!(
            keys,
            vec![(Key::Int(0), Value::from("a")), (Key::Int(1), Value::from("b"))]
        );
        let values = seq.to_values().collect_pairs().unwrap();
        assert_eq!(values[1], (Key::Int(1), Value::Int(2)));
    }

    #[test]
    fn objects_and_strings() {
        let seq = Enumerable::from_pairs([(0, "x"), (1, "y")]);
        let object = seq.to_object(Selector::Key, Selector::Value).unwrap();
        assert_eq!(object.get("1"), Some(&Value::from("y")));
        assert_eq!(seq.to_joined_string("-").unwrap(), "x-y");
        assert_eq!(seq.to_joined_string_by("", Selector::Key).unwrap(), "01");
        let mixed: Enumerable = vec![Value::Bool(true), Value::Null, Value::Float(1.5)]
            .into_iter()
            .collect();
        assert_eq!(mixed.to_joined_string(",").unwrap(), "1,,1.5");
    }

    #[test]
    fn json_output() {
        let list: Enumerable = vec![Value::Int(1), Value::from("a")].into_iter().collect();
        assert_eq!(list.to_json(JsonOptions::new()).unwrap(), r#"[1,"a"]"#);
        let map = Enumerable::from_pairs([("k", 1)]);
        assert_eq!(map.to_json(JsonOptions::new()).unwrap(), r#"{"k":1}"#);
        assert_eq!(map.to_json_value().unwrap(), serde_json::json!({"k": 1}));
        assert!(map.to_json(JsonOptions::new().pretty(true)).unwrap().contains('\n'));
        let bad: Enumerable = vec![Value::Float(f64::NAN)].into_iter().collect();
        assert!(matches!(bad.to_json(JsonOptions::new()), Err(LinqError::Serialization(_))));
    }
}
