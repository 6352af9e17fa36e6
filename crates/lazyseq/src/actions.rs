//! Side-effecting operators.

use std::io::Write;
use std::rc::Rc;

use crate::enumerable::Enumerable;
use crate::error::Result;
use crate::functions::Selector;
use crate::key::Key;
use crate::value::Value;

impl Enumerable {
    /// Runs `action` on every pair as it flows past. Nothing happens until
    /// the result is enumerated, and then once per pass.
    pub fn call<F>(&self, action: F) -> Enumerable
    where
        F: Fn(&Value, &Key) + 'static,
    {
        let source = self.clone();
        let action = Rc::new(action);
        Enumerable::from_factory(move || {
            let action = Rc::clone(&action);
            Box::new(source.iter().inspect(move |item| {
                if let Ok((k, v)) = item {
                    action(v, k);
                }
            }))
        })
    }

    /// Enumerates the sequence, running `action` on every pair.
    pub fn each<F>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(&Value, &Key),
    {
        for item in self.iter() {
            let (k, v) = item?;
            action(&v, &k);
        }
        Ok(())
    }

    /// Writes the text of every value to `out`, separated by `separator`.
    pub fn write<W: Write>(&self, out: &mut W, separator: &str) -> Result<()> {
        self.write_by(out, separator, Selector::Value)
    }

    /// Writes the text of every projected value to `out`, separated by
    /// `separator`.
    pub fn write_by<W: Write>(&self, out: &mut W, separator: &str, selector: impl Into<Selector>) -> Result<()> {
        let text = self.to_joined_string_by(separator, selector)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Writes every value to `out`, each followed by a newline.
    pub fn write_line<W: Write>(&self, out: &mut W) -> Result<()> {
        self.write_line_by(out, Selector::Value)
    }

    /// Writes every projected value to `out`, each followed by a newline.
    /// Lines are written as they are pulled.
    pub fn write_line_by<W: Write>(&self, out: &mut W, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        for item in self.iter() {
            let (k, v) = item?;
            writeln!(out, "{}", selector.apply(&v, &k).to_text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinqError;
    use std::cell::RefCell;

    fn words() -> Enumerable {
        ["a", "b", "c"].iter().map(|&s| Value::from(s)).collect()
    }

    #[test]
    fn call_is_lazy_and_runs_per_pass() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let tapped = words().call(move |v, _| log.borrow_mut().push(v.to_text()));
        assert!(seen.borrow().is_empty());
        assert_eq!(tapped.take(2).count().unwrap(), 2);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
        tapped.count().unwrap();
        assert_eq!(seen.borrow().len(), 5);
    }

    #[test]
    fn each_visits_every_pair() {
        let mut keys = Vec::new();
        words().each(|_, k| keys.push(k.clone())).unwrap();
        assert_eq!(keys, vec![Key::Int(0), Key::Int(1), Key::Int(2)]);
    }

    #[test]
    fn write_joins_values() {
        let mut out = Vec::new();
        words().write(&mut out, ", ").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a, b, c");
        let mut keys = Vec::new();
        words().write_by(&mut keys, "", Selector::Key).unwrap();
        assert_eq!(keys, b"012");
    }

    #[test]
    fn write_line_terminates_each_value() {
        let mut out = Vec::new();
        words().write_line(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\nc\n");
        let mut upper = Vec::new();
        words()
            .write_line_by(&mut upper, Selector::func(|v, _| Value::from(v.to_text().to_uppercase())))
            .unwrap();
        assert_eq!(String::from_utf8(upper).unwrap(), "A\nB\nC\n");
    }

    #[test]
    fn write_reports_io_failures() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(matches!(words().write_line(&mut Broken), Err(LinqError::Io(_))));
    }
}
