//! Registry of workflows and entry point for handling transitions.

use std::sync::Arc;

use waymark_types::entity::Entity;
use waymark_types::error::WorkflowError;

use crate::flow::{Item, Workflow};
use crate::handler::{Listener, TransitionHandler};
use crate::repository::{EntityRepository, StateRepository, TransactionHandler};

/// Owns the registered workflows and the collaborators handed to every
/// [`TransitionHandler`] it creates.
pub struct WorkflowManager<E, S, T, L>
where
    E: EntityRepository,
    S: StateRepository,
    T: TransactionHandler,
    L: Listener,
{
    workflows: Vec<Arc<Workflow>>,
    entity_repository: E,
    state_repository: S,
    transaction_handler: T,
    listener: L,
}

impl<E, S, T, L> WorkflowManager<E, S, T, L>
where
    E: EntityRepository,
    S: StateRepository,
    T: TransactionHandler,
    L: Listener,
{
    pub fn new(
        entity_repository: E,
        state_repository: S,
        transaction_handler: T,
        listener: L,
    ) -> Self {
        Self {
            workflows: Vec::new(),
            entity_repository,
            state_repository,
            transaction_handler,
            listener,
        }
    }

    pub fn add_workflow(&mut self, workflow: impl Into<Arc<Workflow>>) -> &mut Self {
        let workflow = workflow.into();
        tracing::debug!(workflow = workflow.name(), "workflow registered");
        self.workflows.push(workflow);
        self
    }

    pub fn workflows(&self) -> &[Arc<Workflow>] {
        &self.workflows
    }

    /// First registered workflow supporting `entity`.
    pub fn workflow(&self, entity: &Entity) -> Option<&Arc<Workflow>> {
        self.workflows.iter().find(|w| w.supports(entity))
    }

    pub fn workflow_by_name(&self, name: &str) -> Option<&Arc<Workflow>> {
        self.workflows.iter().find(|w| w.name() == name)
    }

    pub fn has_workflow(&self, entity: &Entity) -> bool {
        self.workflow(entity).is_some()
    }

    /// Restore the item of `entity` from its persisted state history.
    pub fn create_item(&self, entity: Entity) -> Result<Item, WorkflowError> {
        let history = self.state_repository.find(&entity.id)?;
        Ok(Item::restore(entity, history))
    }

    /// Build a handler for `transition_name` on `item`.
    ///
    /// A started item stays with the workflow it was started in; a new item
    /// goes to the first workflow supporting its entity. Returns `Ok(None)`
    /// when there is no such workflow.
    pub fn handle(
        &self,
        item: Item,
        transition_name: &str,
    ) -> Result<Option<TransitionHandler<'_, E, S, T, L>>, WorkflowError> {
        let workflow = match item.workflow_name() {
            Some(name) => self.workflow_by_name(name),
            None => self.workflow(item.entity()),
        };

        let Some(workflow) = workflow else {
            tracing::debug!(entity_id = %item.entity_id(), "no workflow supports entity");
            return Ok(None);
        };

        TransitionHandler::new(
            item,
            workflow,
            transition_name,
            &self.entity_repository,
            &self.state_repository,
            &self.transaction_handler,
            &self.listener,
        )
        .map(Some)
    }
}
