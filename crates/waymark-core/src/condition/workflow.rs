//! Workflow-level guards deciding whether a workflow handles an entity.

use waymark_types::entity::Entity;

use crate::flow::workflow::Workflow;

/// Guard over (workflow, entity), evaluated by [`Workflow::supports`].
pub trait WorkflowCondition: Send + Sync {
    fn matches(&self, workflow: &Workflow, entity: &Entity) -> bool;
}

/// Matches if every child matches. Empty matches.
#[derive(Default)]
pub struct WorkflowAndCondition {
    conditions: Vec<Box<dyn WorkflowCondition>>,
}

impl WorkflowAndCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_condition(&mut self, condition: impl WorkflowCondition + 'static) -> &mut Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn conditions(&self) -> &[Box<dyn WorkflowCondition>] {
        &self.conditions
    }
}

impl WorkflowCondition for WorkflowAndCondition {
    fn matches(&self, workflow: &Workflow, entity: &Entity) -> bool {
        self.conditions.iter().all(|c| c.matches(workflow, entity))
    }
}

/// Matches if any child matches. Empty matches too.
#[derive(Default)]
pub struct WorkflowOrCondition {
    conditions: Vec<Box<dyn WorkflowCondition>>,
}

impl WorkflowOrCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_condition(&mut self, condition: impl WorkflowCondition + 'static) -> &mut Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn conditions(&self) -> &[Box<dyn WorkflowCondition>] {
        &self.conditions
    }
}

impl WorkflowCondition for WorkflowOrCondition {
    fn matches(&self, workflow: &Workflow, entity: &Entity) -> bool {
        self.conditions.is_empty() || self.conditions.iter().any(|c| c.matches(workflow, entity))
    }
}

/// Matches entities of one provider (the type tag of their id).
#[derive(Debug, Clone)]
pub struct ProviderNameCondition {
    provider_name: String,
}

impl ProviderNameCondition {
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
        }
    }
}

impl WorkflowCondition for ProviderNameCondition {
    fn matches(&self, _workflow: &Workflow, entity: &Entity) -> bool {
        entity.id.provider_name() == self.provider_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_types::entity::EntityId;

    struct Fixed(bool);

    impl WorkflowCondition for Fixed {
        fn matches(&self, _workflow: &Workflow, _entity: &Entity) -> bool {
            self.0
        }
    }

    fn entity() -> Entity {
        Entity::new(EntityId::new("article", 4))
    }

    #[test]
    fn test_and_matches_if_all_children_match() {
        let workflow = Workflow::new("publishing");
        let mut condition = WorkflowAndCondition::new();
        condition.add_condition(Fixed(true)).add_condition(Fixed(true));
        assert!(condition.matches(&workflow, &entity()));

        condition.add_condition(Fixed(false));
        assert!(!condition.matches(&workflow, &entity()));
    }

    #[test]
    fn test_or_matches_if_one_child_matches() {
        let workflow = Workflow::new("publishing");
        let mut condition = WorkflowOrCondition::new();
        condition.add_condition(Fixed(false)).add_condition(Fixed(false));
        assert!(!condition.matches(&workflow, &entity()));

        condition.add_condition(Fixed(true));
        assert!(condition.matches(&workflow, &entity()));
    }

    #[test]
    fn test_empty_collections_match() {
        let workflow = Workflow::new("publishing");
        assert!(WorkflowAndCondition::new().matches(&workflow, &entity()));
        assert!(WorkflowOrCondition::new().matches(&workflow, &entity()));
    }

    #[test]
    fn test_provider_name_condition() {
        let workflow = Workflow::new("publishing");
        assert!(ProviderNameCondition::new("article").matches(&workflow, &entity()));
        assert!(!ProviderNameCondition::new("page").matches(&workflow, &entity()));
    }
}
