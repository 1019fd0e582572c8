//! Hooks around transition handling.

use waymark_types::error::WorkflowError;
use waymark_types::state::State;

use crate::flow::{Context, Item, Workflow};
use crate::form::Form;

/// Observer of a [`TransitionHandler`](super::TransitionHandler).
///
/// Every method has a no-op default. Errors returned from the transit hooks
/// roll back the surrounding transaction.
pub trait Listener: Send + Sync {
    /// Called after the transition's actions contributed to the form.
    fn on_build_form(
        &self,
        _form: &mut dyn Form,
        _workflow: &Workflow,
        _item: &Item,
        _context: &Context,
        _transition_name: &str,
    ) {
    }

    /// Final say on validity. `valid` is the handler's own verdict.
    fn on_validate(
        &self,
        _form: &dyn Form,
        valid: bool,
        _workflow: &Workflow,
        _item: &Item,
        _context: &Context,
        _transition_name: &str,
    ) -> bool {
        valid
    }

    /// Called inside the transaction before the transition executes.
    fn on_pre_transit(
        &self,
        _workflow: &Workflow,
        _item: &Item,
        _context: &mut Context,
        _transition_name: &str,
    ) -> Result<(), WorkflowError> {
        Ok(())
    }

    /// Called inside the transaction before the state is persisted.
    fn on_post_transit(
        &self,
        _workflow: &Workflow,
        _item: &Item,
        _context: &Context,
        _state: &State,
    ) -> Result<(), WorkflowError> {
        Ok(())
    }
}

/// Listener which does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl Listener for NoopListener {}

/// Fans every hook out to a list of listeners, in registration order.
///
/// The validation verdict is the conjunction of all verdicts; every listener
/// is asked even after one said no. Transit hooks stop at the first error.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Box<dyn Listener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: impl Listener + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Listener for Listeners {
    fn on_build_form(
        &self,
        form: &mut dyn Form,
        workflow: &Workflow,
        item: &Item,
        context: &Context,
        transition_name: &str,
    ) {
        for listener in &self.listeners {
            listener.on_build_form(form, workflow, item, context, transition_name);
        }
    }

    fn on_validate(
        &self,
        form: &dyn Form,
        valid: bool,
        workflow: &Workflow,
        item: &Item,
        context: &Context,
        transition_name: &str,
    ) -> bool {
        self.listeners.iter().fold(valid, |verdict, listener| {
            listener.on_validate(form, valid, workflow, item, context, transition_name) && verdict
        })
    }

    fn on_pre_transit(
        &self,
        workflow: &Workflow,
        item: &Item,
        context: &mut Context,
        transition_name: &str,
    ) -> Result<(), WorkflowError> {
        for listener in &self.listeners {
            listener.on_pre_transit(workflow, item, context, transition_name)?;
        }
        Ok(())
    }

    fn on_post_transit(
        &self,
        workflow: &Workflow,
        item: &Item,
        context: &Context,
        state: &State,
    ) -> Result<(), WorkflowError> {
        for listener in &self.listeners {
            listener.on_post_transit(workflow, item, context, state)?;
        }
        Ok(())
    }
}
