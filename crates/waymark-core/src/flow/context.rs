//! Request-scoped transition context.
//!
//! `Context` carries data which only lives for one use case: properties set by
//! actions (snapshotted into the resulting `State`) and the raw user input
//! collected by a form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mutable data bag threaded through guards and actions of one transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Properties recorded during the transition.
    #[serde(default)]
    properties: Map<String, Value>,
    /// User input submitted with the transition.
    #[serde(default)]
    input: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-filled with user input.
    pub fn with_input(input: Map<String, Value>) -> Self {
        Self {
            properties: Map::new(),
            input,
        }
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn get_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn set_input(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.input.insert(name.into(), value);
        self
    }

    pub fn get_input(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_properties_and_input_are_separate() {
        let mut input = Map::new();
        input.insert("comment".to_string(), json!("ok"));

        let mut context = Context::with_input(input);
        context.set_property("reviewed", json!(true));

        assert_eq!(context.get_input("comment"), Some(&json!("ok")));
        assert!(context.get_property("comment").is_none());
        assert!(context.has_property("reviewed"));
        assert_eq!(context.properties().len(), 1);
    }
}
