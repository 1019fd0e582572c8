//! Runtime handle tying one entity to its position in one workflow.

use waymark_types::entity::{Entity, EntityId};
use waymark_types::error::WorkflowError;
use waymark_types::state::State;

/// "This entity inside this workflow run."
///
/// The item knows the current step and keeps the state history. It only
/// changes by recording new states through [`start`](Item::start) and
/// [`transit`](Item::transit), or by actions mutating the entity.
#[derive(Debug, Clone)]
pub struct Item {
    entity: Entity,
    workflow_name: Option<String>,
    current_step: Option<String>,
    state_history: Vec<State>,
}

impl Item {
    /// Create an item for an entity which never entered a workflow.
    pub fn initialize(entity: Entity) -> Self {
        Self {
            entity,
            workflow_name: None,
            current_step: None,
            state_history: Vec::new(),
        }
    }

    /// Rebuild an item from its persisted state history (oldest first).
    pub fn restore(entity: Entity, state_history: Vec<State>) -> Self {
        let mut item = Self::initialize(entity);

        for state in &state_history {
            if let Some(step) = state.step_name() {
                item.current_step = Some(step.to_string());
                item.workflow_name = Some(state.workflow_name().to_string());
            }
        }

        item.state_history = state_history;
        item
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity.id
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow_name.as_deref()
    }

    pub fn current_step_name(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    pub fn is_workflow_started(&self) -> bool {
        self.current_step.is_some()
    }

    pub fn state_history(&self) -> &[State] {
        &self.state_history
    }

    pub fn latest_state(&self) -> Option<&State> {
        self.state_history.last()
    }

    /// Record the outcome of a start transition.
    ///
    /// A failed start is kept in the history but leaves the item unstarted.
    pub fn start(&mut self, state: State) -> Result<&State, WorkflowError> {
        if self.is_workflow_started() {
            return Err(WorkflowError::AlreadyStarted {
                workflow: self.workflow_name.clone().unwrap_or_default(),
                entity_id: self.entity.id.to_string(),
            });
        }

        if state.is_successful() {
            self.current_step = state.step_name().map(str::to_string);
            self.workflow_name = Some(state.workflow_name().to_string());
        }

        Ok(self.push_state(state))
    }

    /// Record the outcome of a transition of a started item.
    pub fn transit(&mut self, state: State) -> Result<&State, WorkflowError> {
        if !self.is_workflow_started() {
            return Err(WorkflowError::WorkflowNotStarted {
                transition: state.transition_name().to_string(),
                workflow: state.workflow_name().to_string(),
                entity_id: self.entity.id.to_string(),
            });
        }

        if state.is_successful() {
            self.current_step = state.step_name().map(str::to_string);
        }

        Ok(self.push_state(state))
    }

    fn push_state(&mut self, state: State) -> &State {
        self.state_history.push(state);
        // Just pushed, so the history is not empty.
        &self.state_history[self.state_history.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use waymark_types::error_collection::ErrorCollection;

    fn entity() -> Entity {
        Entity::new(EntityId::new("article", 5))
    }

    fn state(transition: &str, step: Option<&str>, success: bool) -> State {
        State::new(
            EntityId::new("article", 5),
            "publishing",
            transition,
            step.map(str::to_string),
            success,
            Map::new(),
            &ErrorCollection::new(),
        )
    }

    #[test]
    fn test_new_item_is_not_started() {
        let item = Item::initialize(entity());
        assert!(!item.is_workflow_started());
        assert!(item.current_step_name().is_none());
        assert!(item.latest_state().is_none());
    }

    #[test]
    fn test_start_moves_to_first_step() {
        let mut item = Item::initialize(entity());
        item.start(state("start", Some("draft"), true)).unwrap();

        assert!(item.is_workflow_started());
        assert_eq!(item.current_step_name(), Some("draft"));
        assert_eq!(item.workflow_name(), Some("publishing"));
        assert_eq!(item.state_history().len(), 1);
    }

    #[test]
    fn test_failed_start_keeps_item_unstarted() {
        let mut item = Item::initialize(entity());
        item.start(state("start", None, false)).unwrap();

        assert!(!item.is_workflow_started());
        assert_eq!(item.state_history().len(), 1);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut item = Item::initialize(entity());
        item.start(state("start", Some("draft"), true)).unwrap();

        let err = item.start(state("start", Some("draft"), true)).unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyStarted { .. }));
    }

    #[test]
    fn test_transit_requires_started_item() {
        let mut item = Item::initialize(entity());
        let err = item.transit(state("publish", Some("published"), true)).unwrap_err();
        assert!(matches!(err, WorkflowError::WorkflowNotStarted { .. }));
    }

    #[test]
    fn test_failed_transit_stays_in_step() {
        let mut item = Item::initialize(entity());
        item.start(state("start", Some("draft"), true)).unwrap();
        item.transit(state("publish", Some("draft"), false)).unwrap();

        assert_eq!(item.current_step_name(), Some("draft"));
        assert_eq!(item.latest_state().unwrap().transition_name(), "publish");
    }

    #[test]
    fn test_restore_uses_last_reached_step() {
        let history = vec![
            state("start", Some("draft"), true),
            state("publish", Some("published"), true),
            state("archive", Some("published"), false),
        ];

        let item = Item::restore(entity(), history);
        assert!(item.is_workflow_started());
        assert_eq!(item.current_step_name(), Some("published"));
        assert_eq!(item.state_history().len(), 3);
    }
}
