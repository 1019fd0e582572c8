//! Business actions executed by a transition.

use thiserror::Error;

use super::context::Context;
use super::item::Item;
use super::transition::Transition;
use crate::form::Form;

/// Outcome of a failing action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Recorded into the transition's error collection; remaining actions
    /// still run and the transition reports failure.
    #[error("action failed: {reason}")]
    Failed { reason: String },

    /// Aborts the transition. The handler rolls back the transaction.
    #[error("action aborted: {reason}")]
    Fatal { reason: String },
}

impl ActionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Failed { reason } | Self::Fatal { reason } => reason,
        }
    }
}

/// A unit of business logic attached to a transition.
pub trait Action: Send + Sync {
    /// Name used in logs and in `transition.action.failed` diagnostics.
    fn name(&self) -> &str;

    /// Whether the action needs user input to run.
    fn is_input_required(&self, _item: &Item) -> bool {
        false
    }

    /// Describe the fields this action needs.
    fn build_form(&self, _form: &mut dyn Form, _item: &Item) {}

    fn transit(
        &self,
        transition: &Transition,
        item: &mut Item,
        context: &mut Context,
    ) -> Result<(), ActionError>;
}

/// Adapter turning a closure into an [`Action`] without input.
pub struct FnAction<F> {
    name: String,
    f: F,
}

impl<F> FnAction<F>
where
    F: Fn(&Transition, &mut Item, &mut Context) -> Result<(), ActionError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: Fn(&Transition, &mut Item, &mut Context) -> Result<(), ActionError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transit(
        &self,
        transition: &Transition,
        item: &mut Item,
        context: &mut Context,
    ) -> Result<(), ActionError> {
        (self.f)(transition, item, context)
    }
}
