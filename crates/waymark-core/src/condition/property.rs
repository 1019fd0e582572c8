//! Leaf condition comparing an entity property against a fixed value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use waymark_types::error_collection::ErrorCollection;

use super::Condition;
use crate::flow::context::Context;
use crate::flow::item::Item;
use crate::flow::transition::Transition;

/// Message key appended when a [`PropertyCondition`] fails.
pub const PROPERTY_FAILED: &str = "transition.condition.property.failed";

/// Comparison operator of a [`PropertyCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
        };
        f.write_str(s)
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" | "==" => Ok(Operator::Eq),
            "neq" | "!=" => Ok(Operator::Neq),
            "lt" | "<" => Ok(Operator::Lt),
            "lte" | "<=" => Ok(Operator::Lte),
            "gt" | ">" => Ok(Operator::Gt),
            "gte" | ">=" => Ok(Operator::Gte),
            other => Err(format!("invalid operator: '{other}'")),
        }
    }
}

/// Compares `entity.properties[property]` with `value`.
///
/// A missing property compares as `null`. Ordering operators work on numbers
/// and on strings; comparing anything else with them fails the condition.
#[derive(Debug, Clone)]
pub struct PropertyCondition {
    property: String,
    operator: Operator,
    value: Value,
}

impl PropertyCondition {
    pub fn new(property: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn compare(&self, actual: &Value) -> bool {
        match self.operator {
            Operator::Eq => actual == &self.value,
            Operator::Neq => actual != &self.value,
            Operator::Lt => order(actual, &self.value) == Some(Ordering::Less),
            Operator::Lte => matches!(
                order(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => order(actual, &self.value) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                order(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

static NULL: Value = Value::Null;

fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl Condition for PropertyCondition {
    fn matches(
        &self,
        _transition: &Transition,
        item: &Item,
        _context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        let actual = item
            .entity()
            .get_property(&self.property)
            .unwrap_or(&NULL);

        if self.compare(actual) {
            return true;
        }

        errors.add_error(
            PROPERTY_FAILED,
            vec![
                json!(self.property),
                json!(self.operator.to_string()),
                self.value.clone(),
                actual.clone(),
            ],
            None,
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_types::entity::{Entity, EntityId};

    fn item_with(name: &str, value: Value) -> Item {
        let mut entity = Entity::new(EntityId::new("article", 1));
        entity.set_property(name, value);
        Item::initialize(entity)
    }

    fn check(condition: &PropertyCondition, item: &Item) -> (bool, ErrorCollection) {
        let mut errors = ErrorCollection::new();
        let result = condition.matches(
            &Transition::new("publish"),
            item,
            &Context::new(),
            &mut errors,
        );
        (result, errors)
    }

    #[test]
    fn test_equality() {
        let item = item_with("status", json!("ready"));

        let eq = PropertyCondition::new("status", Operator::Eq, json!("ready"));
        assert!(check(&eq, &item).0);

        let neq = PropertyCondition::new("status", Operator::Neq, json!("ready"));
        assert!(!check(&neq, &item).0);
    }

    #[test]
    fn test_numeric_ordering() {
        let item = item_with("words", json!(120));

        assert!(check(&PropertyCondition::new("words", Operator::Gt, json!(100)), &item).0);
        assert!(check(&PropertyCondition::new("words", Operator::Gte, json!(120)), &item).0);
        assert!(check(&PropertyCondition::new("words", Operator::Lte, json!(120.0)), &item).0);
        assert!(!check(&PropertyCondition::new("words", Operator::Lt, json!(50)), &item).0);
    }

    #[test]
    fn test_incomparable_values_fail() {
        let item = item_with("words", json!("many"));
        let condition = PropertyCondition::new("words", Operator::Gt, json!(100));
        assert!(!check(&condition, &item).0);
    }

    #[test]
    fn test_missing_property_is_null() {
        let item = item_with("other", json!(1));
        assert!(check(&PropertyCondition::new("title", Operator::Eq, Value::Null), &item).0);
    }

    #[test]
    fn test_failure_records_details() {
        let item = item_with("status", json!("draft"));
        let condition = PropertyCondition::new("status", Operator::Eq, json!("ready"));

        let (result, errors) = check(&condition, &item);
        assert!(!result);
        let error = errors.get_error(0).unwrap();
        assert_eq!(error.message, PROPERTY_FAILED);
        assert_eq!(
            error.params,
            vec![json!("status"), json!("eq"), json!("ready"), json!("draft")]
        );
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("gte".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Neq);
        assert!("like".parse::<Operator>().is_err());
    }
}
