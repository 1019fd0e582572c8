//! Transaction-bounded handling of one transition request.
//!
//! A handler is built per request for one item and one transition name. The
//! caller validates the user input through [`TransitionHandler::validate`]
//! and then executes the transition with [`TransitionHandler::transit`],
//! which persists the produced state and the entity in one transaction.

use waymark_types::error::WorkflowError;
use waymark_types::error_collection::ErrorCollection;
use waymark_types::state::State;

use super::listener::Listener;
use crate::flow::{Context, Item, Step, Transition, Workflow};
use crate::form::Form;
use crate::repository::{EntityRepository, StateRepository, TransactionHandler};

/// Message key appended when the form rejects the submitted input.
pub const FORM_FAILED: &str = "transition.validate.form.failed";

/// Handles one transition of one item.
///
/// Generic over the repository ports so the core never depends on a storage
/// backend. Collaborators and the workflow are borrowed; the item is owned
/// and handed back through [`into_item`](Self::into_item).
pub struct TransitionHandler<'a, E, S, T, L>
where
    E: EntityRepository,
    S: StateRepository,
    T: TransactionHandler,
    L: Listener + ?Sized,
{
    item: Item,
    workflow: &'a Workflow,
    transition: &'a Transition,
    entity_repository: &'a E,
    state_repository: &'a S,
    transaction_handler: &'a T,
    listener: &'a L,
    context: Context,
    errors: ErrorCollection,
    /// `None` until validated; cleared again after every transit attempt.
    validated: Option<bool>,
}

impl<'a, E, S, T, L> TransitionHandler<'a, E, S, T, L>
where
    E: EntityRepository,
    S: StateRepository,
    T: TransactionHandler,
    L: Listener + ?Sized,
{
    /// Create a handler, guarding that `transition_name` may be processed.
    ///
    /// For an unstarted item the name must be empty or name the start
    /// transition. For a started item the current step must allow it.
    pub fn new(
        item: Item,
        workflow: &'a Workflow,
        transition_name: &str,
        entity_repository: &'a E,
        state_repository: &'a S,
        transaction_handler: &'a T,
        listener: &'a L,
    ) -> Result<Self, WorkflowError> {
        let transition = Self::guard_allowed_transition(&item, workflow, transition_name)?;

        Ok(Self {
            item,
            workflow,
            transition,
            entity_repository,
            state_repository,
            transaction_handler,
            listener,
            context: Context::new(),
            errors: ErrorCollection::new(),
            validated: None,
        })
    }

    fn guard_allowed_transition(
        item: &Item,
        workflow: &'a Workflow,
        transition_name: &str,
    ) -> Result<&'a Transition, WorkflowError> {
        let Some(step_name) = item.current_step_name() else {
            let start = workflow.start_transition()?;
            if transition_name.is_empty() || transition_name == start.name() {
                return Ok(start);
            }

            return Err(WorkflowError::WorkflowNotStarted {
                transition: transition_name.to_string(),
                workflow: workflow.name().to_string(),
                entity_id: item.entity_id().to_string(),
            });
        };

        let step = workflow.step(step_name)?;
        if !step.is_transition_allowed(transition_name) {
            return Err(WorkflowError::TransitionNotAllowed {
                transition: transition_name.to_string(),
                step: step.name().to_string(),
            });
        }

        workflow.transition(transition_name)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn workflow(&self) -> &'a Workflow {
        self.workflow
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn into_item(self) -> Item {
        self.item
    }

    /// The transition being handled: the start transition for a new item.
    pub fn transition(&self) -> &'a Transition {
        self.transition
    }

    /// `None` while the workflow is not started.
    pub fn current_step(&self) -> Option<&'a Step> {
        self.item
            .current_step_name()
            .and_then(|name| self.workflow.step(name).ok())
    }

    pub fn is_workflow_started(&self) -> bool {
        self.item.is_workflow_started()
    }

    pub fn is_input_required(&self) -> bool {
        self.transition.is_input_required(&self.item)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn error_collection(&self) -> &ErrorCollection {
        &self.errors
    }

    // -----------------------------------------------------------------------
    // Use case
    // -----------------------------------------------------------------------

    /// Build the form and validate the submitted input.
    ///
    /// Validity is computed once; later calls only rebuild the form and ask
    /// the listener again. Returns the listener's verdict.
    pub fn validate(&mut self, form: &mut dyn Form) -> bool {
        let transition_name = self.transition.name();

        self.transition.build_form(form, &self.item);
        self.listener.on_build_form(
            form,
            self.workflow,
            &self.item,
            &self.context,
            transition_name,
        );

        let valid = match self.validated {
            Some(valid) => valid,
            None => {
                let valid = if self.is_input_required() {
                    let valid = form.validate(&mut self.context);
                    if !valid {
                        self.errors
                            .add_error(FORM_FAILED, vec![], Some(form.errors().clone()));
                    }
                    valid
                } else {
                    true
                };
                self.validated = Some(valid);
                valid
            }
        };

        tracing::debug!(
            workflow = self.workflow.name(),
            transition = transition_name,
            entity_id = %self.item.entity_id(),
            valid,
            "transition validated"
        );

        self.listener.on_validate(
            form,
            valid,
            self.workflow,
            &self.item,
            &self.context,
            transition_name,
        )
    }

    /// Execute the transition inside a transaction and persist the outcome.
    ///
    /// Any error inside the transaction rolls it back and is returned. If
    /// the rollback fails too, the rollback error is returned instead. The
    /// item only keeps the changes of a committed transition.
    pub fn transit(&mut self) -> Result<State, WorkflowError> {
        match self.validated.take() {
            None => return Err(WorkflowError::NotValidated),
            Some(false) => return Err(WorkflowError::InvalidState),
            Some(true) => {}
        }

        // The item may have moved since the handler was built.
        Self::guard_allowed_transition(&self.item, self.workflow, self.transition.name())?;

        let snapshot = self.item.clone();
        self.transaction_handler.begin()?;

        let state = match self.execute() {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(
                    workflow = self.workflow.name(),
                    transition = self.transition.name(),
                    entity_id = %self.item.entity_id(),
                    error = %err,
                    "transition failed, rolling back"
                );
                self.item = snapshot;
                self.transaction_handler.rollback()?;
                return Err(err);
            }
        };

        if let Err(err) = self.transaction_handler.commit() {
            self.item = snapshot;
            return Err(err.into());
        }

        tracing::info!(
            workflow = self.workflow.name(),
            transition = self.transition.name(),
            entity_id = %self.item.entity_id(),
            step = state.step_name().unwrap_or_default(),
            success = state.is_successful(),
            "transition committed"
        );

        Ok(state)
    }

    fn execute(&mut self) -> Result<State, WorkflowError> {
        let transition = self.transition;

        self.listener.on_pre_transit(
            self.workflow,
            &self.item,
            &mut self.context,
            transition.name(),
        )?;

        let state = if self.item.is_workflow_started() {
            transition.transit(&mut self.item, &mut self.context, &mut self.errors)?
        } else {
            transition.start(&mut self.item, &mut self.context, &mut self.errors)?
        };

        self.listener
            .on_post_transit(self.workflow, &self.item, &self.context, &state)?;

        self.state_repository.add(&state)?;
        self.entity_repository.add(self.item.entity())?;

        Ok(state)
    }
}
