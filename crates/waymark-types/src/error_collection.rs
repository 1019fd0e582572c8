//! Ordered, nestable accumulator for guard and action diagnostics.
//!
//! Every guard evaluation and every transition handler threads an
//! [`ErrorCollection`] through its calls. Composite guards attach the errors
//! of their children as a nested collection on a single aggregate entry, so
//! a collection forms a tree that can be flattened with
//! [`ErrorCollection::to_array`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ErrorIndexOutOfRange;

/// One recorded error: a message template, its parameters and an optional
/// collection of child errors that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Message template or translation key (e.g. `transition.condition.failed`).
    pub message: String,
    /// Positional template parameters.
    #[serde(default)]
    pub params: Vec<Value>,
    /// Errors which led to this one.
    #[serde(default)]
    pub nested: Option<ErrorCollection>,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>, params: Vec<Value>, nested: Option<ErrorCollection>) -> Self {
        Self {
            message: message.into(),
            params,
            nested,
        }
    }

    /// Plain representation: `[message, params, nested]`.
    pub fn to_array(&self) -> Value {
        let nested = match &self.nested {
            Some(collection) => Value::Array(collection.to_array()),
            None => Value::Null,
        };
        json!([self.message, self.params, nested])
    }
}

impl<M: Into<String>> From<(M, Vec<Value>, Option<ErrorCollection>)> for ErrorEntry {
    fn from((message, params, nested): (M, Vec<Value>, Option<ErrorCollection>)) -> Self {
        Self::new(message, params, nested)
    }
}

impl<M: Into<String>> From<(M, Vec<Value>)> for ErrorEntry {
    fn from((message, params): (M, Vec<Value>)) -> Self {
        Self::new(message, params, None)
    }
}

/// Renders the template with `%s` placeholders filled from the params.
impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params = self.params.iter();
        let mut parts = self.message.split("%s").peekable();

        while let Some(part) = parts.next() {
            f.write_str(part)?;
            if parts.peek().is_some() {
                match params.next() {
                    Some(Value::String(s)) => f.write_str(s)?,
                    Some(other) => write!(f, "{other}")?,
                    None => f.write_str("%s")?,
                }
            }
        }

        if let Some(nested) = &self.nested {
            if nested.has_errors() {
                write!(f, " ({} nested)", nested.count_errors())?;
            }
        }

        Ok(())
    }
}

/// Ordered collection of [`ErrorEntry`] values.
///
/// Entries are append-only; the only way to remove them is [`reset`](Self::reset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCollection {
    errors: Vec<ErrorEntry>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one error.
    pub fn add_error(
        &mut self,
        message: impl Into<String>,
        params: Vec<Value>,
        nested: Option<ErrorCollection>,
    ) -> &mut Self {
        self.errors.push(ErrorEntry::new(message, params, nested));
        self
    }

    /// Append many errors, keeping their relative order and every entry added before.
    pub fn add_errors<I, E>(&mut self, errors: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ErrorEntry>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    /// Get the error at `index`.
    pub fn get_error(&self, index: usize) -> Result<&ErrorEntry, ErrorIndexOutOfRange> {
        self.errors.get(index).ok_or(ErrorIndexOutOfRange {
            index,
            len: self.errors.len(),
        })
    }

    pub fn get_errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn count_errors(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        self.count_errors() > 0
    }

    /// Remove every entry.
    pub fn reset(&mut self) -> &mut Self {
        self.errors.clear();
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.errors.iter()
    }

    /// Flatten into plain JSON arrays, recursing into nested collections.
    pub fn to_array(&self) -> Vec<Value> {
        self.errors.iter().map(ErrorEntry::to_array).collect()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for ErrorCollection {
    type Item = ErrorEntry;
    type IntoIter = std::vec::IntoIter<ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<E: Into<ErrorEntry>> FromIterator<E> for ErrorCollection {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        let mut collection = Self::new();
        collection.add_errors(iter);
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = "test %s %s";

    fn params() -> Vec<Value> {
        vec![json!("foo"), json!("baar")]
    }

    #[test]
    fn test_add_error_is_fluent() {
        let mut errors = ErrorCollection::new();
        errors
            .add_error(MESSAGE, params(), None)
            .add_error("second", vec![], None);

        assert_eq!(errors.count_errors(), 2);
        assert_eq!(
            errors.get_errors()[0],
            ErrorEntry::new(MESSAGE, params(), None)
        );
    }

    #[test]
    fn test_counts_errors() {
        let mut errors = ErrorCollection::new();
        assert_eq!(errors.count_errors(), 0);
        errors.add_error(MESSAGE, params(), None);
        assert_eq!(errors.count_errors(), 1);
        errors.add_error(MESSAGE, params(), None);
        assert_eq!(errors.count_errors(), 2);
    }

    #[test]
    fn test_get_error_by_index() {
        let mut errors = ErrorCollection::new();
        errors.add_error(MESSAGE, params(), None);

        let entry = errors.get_error(0).unwrap();
        assert_eq!(entry.message, MESSAGE);
        assert_eq!(entry.params, params());
        assert!(entry.nested.is_none());
    }

    #[test]
    fn test_get_error_out_of_range() {
        let mut errors = ErrorCollection::new();
        assert_eq!(
            errors.get_error(0),
            Err(ErrorIndexOutOfRange { index: 0, len: 0 })
        );

        errors.add_error(MESSAGE, params(), None);
        assert!(errors.get_error(1).is_err());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut errors = ErrorCollection::new();
        errors.add_error(MESSAGE, params(), None);
        assert!(errors.has_errors());

        errors.reset();
        assert!(!errors.has_errors());
        assert_eq!(errors.count_errors(), 0);
    }

    #[test]
    fn test_add_errors_does_not_override() {
        let mut child = ErrorCollection::new();
        child.add_error("child", vec![], None);

        let mut errors = ErrorCollection::new();
        errors.add_error(MESSAGE, params(), None);
        errors.add_errors(vec![
            (MESSAGE, params(), None),
            (MESSAGE, params(), Some(child.clone())),
        ]);

        assert_eq!(errors.count_errors(), 3);
        assert!(errors.get_error(0).unwrap().nested.is_none());
        assert!(errors.get_error(1).unwrap().nested.is_none());
        assert_eq!(errors.get_error(2).unwrap().nested.as_ref(), Some(&child));
    }

    #[test]
    fn test_iterates_in_insertion_order() {
        let errors: ErrorCollection = vec![
            ("a", Vec::<Value>::new()),
            ("b", Vec::new()),
            ("c", Vec::new()),
        ]
            .into_iter()
            .collect();

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);

        let mut count = 0;
        for _ in &errors {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_to_array_flattens_nested_collections() {
        let mut grandchild = ErrorCollection::new();
        grandchild.add_error("deep", vec![json!(1)], None);

        let mut child = ErrorCollection::new();
        child.add_error(MESSAGE, params(), None);
        child.add_error("inner", vec![], Some(grandchild));

        let mut errors = ErrorCollection::new();
        errors.add_error(MESSAGE, params(), None);
        errors.add_error(MESSAGE, params(), Some(child));

        assert_eq!(
            errors.to_array(),
            vec![
                json!([MESSAGE, ["foo", "baar"], null]),
                json!([
                    MESSAGE,
                    ["foo", "baar"],
                    [
                        [MESSAGE, ["foo", "baar"], null],
                        ["inner", [], [["deep", [1], null]]]
                    ]
                ]),
            ]
        );
    }

    #[test]
    fn test_display_fills_placeholders() {
        let entry = ErrorEntry::new(MESSAGE, vec![json!("foo"), json!(42)], None);
        assert_eq!(entry.to_string(), "test foo 42");

        let missing = ErrorEntry::new(MESSAGE, vec![json!("only")], None);
        assert_eq!(missing.to_string(), "test only %s");
    }

    #[test]
    fn test_serde_roundtrip_keeps_nesting() {
        let mut child = ErrorCollection::new();
        child.add_error("child", vec![json!("x")], None);
        let mut errors = ErrorCollection::new();
        errors.add_error("parent", vec![], Some(child));

        let json = serde_json::to_string(&errors).unwrap();
        let parsed: ErrorCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, errors);
    }
}
