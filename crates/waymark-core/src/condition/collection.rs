//! AND / OR composition of transition conditions.

use std::fmt;

use waymark_types::error_collection::ErrorCollection;

use super::{AND_FAILED, Condition, OR_FAILED};
use crate::flow::context::Context;
use crate::flow::item::Item;
use crate::flow::transition::Transition;

/// Shared API of the composite conditions.
pub trait ConditionCollection: Condition {
    fn conditions(&self) -> &[Box<dyn Condition>];

    fn conditions_mut(&mut self) -> &mut Vec<Box<dyn Condition>>;

    fn add_condition(&mut self, condition: impl Condition + 'static) -> &mut Self
    where
        Self: Sized,
    {
        self.conditions_mut().push(Box::new(condition));
        self
    }

    fn add_boxed_condition(&mut self, condition: Box<dyn Condition>) -> &mut Self
    where
        Self: Sized,
    {
        self.conditions_mut().push(condition);
        self
    }

    fn add_conditions<I>(&mut self, conditions: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = Box<dyn Condition>>,
    {
        self.conditions_mut().extend(conditions);
        self
    }

    /// Remove the condition at `index`, if present.
    fn remove_condition(&mut self, index: usize) -> Option<Box<dyn Condition>> {
        let conditions = self.conditions_mut();
        (index < conditions.len()).then(|| conditions.remove(index))
    }

    fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }

    fn len(&self) -> usize {
        self.conditions().len()
    }
}

// ---------------------------------------------------------------------------
// AndCondition
// ---------------------------------------------------------------------------

/// Matches if every child matches. Children are evaluated in order and
/// evaluation stops at the first failing child.
///
/// Child diagnostics are collected into a fresh collection which is attached
/// to one `transition.condition.and.failed` error on failure.
#[derive(Default)]
pub struct AndCondition {
    conditions: Vec<Box<dyn Condition>>,
}

impl AndCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Condition for AndCondition {
    fn matches(
        &self,
        transition: &Transition,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        let mut child_errors = ErrorCollection::new();

        for condition in &self.conditions {
            if !condition.matches(transition, item, context, &mut child_errors) {
                errors.add_error(AND_FAILED, vec![], Some(child_errors));
                return false;
            }
        }

        true
    }
}

impl ConditionCollection for AndCondition {
    fn conditions(&self) -> &[Box<dyn Condition>] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Box<dyn Condition>> {
        &mut self.conditions
    }
}

impl fmt::Debug for AndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndCondition")
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// OrCondition
// ---------------------------------------------------------------------------

/// Matches if at least one child matches, stopping at the first success.
///
/// An empty `OrCondition` matches as well, mirroring [`AndCondition`].
#[derive(Default)]
pub struct OrCondition {
    conditions: Vec<Box<dyn Condition>>,
}

impl OrCondition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Condition for OrCondition {
    fn matches(
        &self,
        transition: &Transition,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        let mut child_errors = ErrorCollection::new();

        for condition in &self.conditions {
            if condition.matches(transition, item, context, &mut child_errors) {
                return true;
            }
        }

        errors.add_error(OR_FAILED, vec![], Some(child_errors));
        false
    }
}

impl ConditionCollection for OrCondition {
    fn conditions(&self) -> &[Box<dyn Condition>] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Box<dyn Condition>> {
        &mut self.conditions
    }
}

impl fmt::Debug for OrCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrCondition")
            .field("conditions", &self.conditions.len())
            .finish()
    }
}
