//! Workflow graph: steps, transitions and the start transition.

use std::fmt;

use waymark_types::entity::Entity;
use waymark_types::error::WorkflowError;
use waymark_types::error_collection::ErrorCollection;

use super::context::Context;
use super::item::Item;
use super::step::Step;
use super::transition::Transition;
use crate::condition::workflow::WorkflowCondition;

/// Named container of steps and transitions.
///
/// The workflow owns its transitions; each transition refers back to it by
/// name only. Assembled once, then queried.
pub struct Workflow {
    name: String,
    label: String,
    steps: Vec<Step>,
    transitions: Vec<Transition>,
    start_transition: Option<String>,
    condition: Option<Box<dyn WorkflowCondition>>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            steps: Vec::new(),
            transitions: Vec::new(),
            start_transition: None,
            condition: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Add a step. A step with the same name is replaced.
    pub fn add_step(&mut self, step: Step) -> &mut Self {
        match self.steps.iter_mut().find(|s| s.name() == step.name()) {
            Some(existing) => *existing = step,
            None => self.steps.push(step),
        }
        self
    }

    /// Add a transition and bind it to this workflow. A transition with the
    /// same name is replaced.
    pub fn add_transition(&mut self, mut transition: Transition, is_start: bool) -> &mut Self {
        transition.set_workflow_name(self.name.clone());

        if is_start {
            self.start_transition = Some(transition.name().to_string());
        }

        match self
            .transitions
            .iter_mut()
            .find(|t| t.name() == transition.name())
        {
            Some(existing) => *existing = transition,
            None => self.transitions.push(transition),
        }
        self
    }

    pub fn set_condition(&mut self, condition: impl WorkflowCondition + 'static) -> &mut Self {
        self.condition = Some(Box::new(condition));
        self
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    pub fn step(&self, name: &str) -> Result<&Step, WorkflowError> {
        self.steps
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| WorkflowError::StepNotFound {
                step: name.to_string(),
                workflow: self.name.clone(),
            })
    }

    pub fn transition(&self, name: &str) -> Result<&Transition, WorkflowError> {
        self.transitions
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| self.transition_not_found(name))
    }

    /// Mutable access, used to attach actions and conditions after a
    /// workflow was built from a definition.
    pub fn transition_mut(&mut self, name: &str) -> Result<&mut Transition, WorkflowError> {
        let err = self.transition_not_found(name);
        self.transitions
            .iter_mut()
            .find(|t| t.name() == name)
            .ok_or(err)
    }

    fn transition_not_found(&self, name: &str) -> WorkflowError {
        WorkflowError::TransitionNotFound {
            transition: name.to_string(),
            workflow: self.name.clone(),
        }
    }

    pub fn start_transition(&self) -> Result<&Transition, WorkflowError> {
        let name = self
            .start_transition
            .as_deref()
            .ok_or_else(|| WorkflowError::StartTransitionNotSet(self.name.clone()))?;
        self.transition(name)
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.steps.iter().any(|s| s.name() == name)
    }

    pub fn has_transition(&self, name: &str) -> bool {
        self.transitions.iter().any(|t| t.name() == name)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Whether `transition_name` may leave `step_name`. Unknown steps allow
    /// nothing.
    pub fn is_transition_allowed(&self, transition_name: &str, step_name: &str) -> bool {
        self.step(step_name)
            .is_ok_and(|step| step.is_transition_allowed(transition_name))
    }

    /// Transitions which can currently be offered for `item`.
    ///
    /// For an unstarted item this is the start transition, if available.
    /// Guard diagnostics are discarded.
    pub fn available_transitions(&self, item: &Item, context: &Context) -> Vec<&Transition> {
        let candidates: Vec<&Transition> = match item.current_step_name() {
            None => self.start_transition().into_iter().collect(),
            Some(step_name) => match self.step(step_name) {
                Ok(step) => step
                    .allowed_transitions()
                    .iter()
                    .filter_map(|name| self.transition(name).ok())
                    .collect(),
                Err(_) => Vec::new(),
            },
        };

        candidates
            .into_iter()
            .filter(|t| t.is_available(item, context, &mut ErrorCollection::new()))
            .collect()
    }

    /// Whether this workflow handles `entity`. Without a condition every
    /// entity is supported.
    pub fn supports(&self, entity: &Entity) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.matches(self, entity))
    }

    /// Check the graph invariants.
    ///
    /// The start transition must be designated and exist, every transition
    /// allowed in a step must exist, and every transition must target an
    /// existing step.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.start_transition()?;

        for step in &self.steps {
            if let Some(missing) = step
                .allowed_transitions()
                .iter()
                .find(|name| !self.has_transition(name))
            {
                return Err(WorkflowError::InvalidGraph(format!(
                    "step '{}' allows unknown transition '{missing}'",
                    step.name()
                )));
            }

            if step.is_final() && !step.allowed_transitions().is_empty() {
                return Err(WorkflowError::InvalidGraph(format!(
                    "final step '{}' must not allow transitions",
                    step.name()
                )));
            }
        }

        for transition in &self.transitions {
            match transition.step_to() {
                Some(target) if self.has_step(target) => {}
                Some(target) => {
                    return Err(WorkflowError::InvalidGraph(format!(
                        "transition '{}' targets unknown step '{target}'",
                        transition.name()
                    )));
                }
                None => {
                    return Err(WorkflowError::InvalidGraph(format!(
                        "transition '{}' has no target step",
                        transition.name()
                    )));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("transitions", &self.transitions)
            .field("start_transition", &self.start_transition)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FnCondition;
    use crate::condition::workflow::ProviderNameCondition;
    use waymark_types::entity::EntityId;

    /// draft --publish--> published --archive--> archived (final)
    fn publishing() -> Workflow {
        let mut workflow = Workflow::new("publishing");

        let mut draft = Step::new("draft");
        draft.add_allowed_transition("publish");
        let mut published = Step::new("published");
        published.add_allowed_transition("archive");
        let mut archived = Step::new("archived");
        archived.set_final(true);

        workflow.add_step(draft).add_step(published).add_step(archived);

        let mut start = Transition::new("start");
        start.set_step_to("draft");
        let mut publish = Transition::new("publish");
        publish.set_step_to("published");
        let mut archive = Transition::new("archive");
        archive.set_step_to("archived");

        workflow
            .add_transition(start, true)
            .add_transition(publish, false)
            .add_transition(archive, false);
        workflow
    }

    fn entity(provider: &str) -> Entity {
        Entity::new(EntityId::new(provider, 1))
    }

    #[test]
    fn test_add_transition_binds_workflow_name() {
        let workflow = publishing();
        assert_eq!(
            workflow.transition("publish").unwrap().workflow_name(),
            Some("publishing")
        );
        assert_eq!(workflow.start_transition().unwrap().name(), "start");
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let workflow = publishing();
        assert!(matches!(
            workflow.step("review"),
            Err(WorkflowError::StepNotFound { .. })
        ));
        assert!(matches!(
            workflow.transition("reject"),
            Err(WorkflowError::TransitionNotFound { .. })
        ));
        assert!(!workflow.has_step("review"));
        assert!(workflow.has_transition("archive"));
    }

    #[test]
    fn test_start_transition_must_be_set() {
        let workflow = Workflow::new("empty");
        assert!(matches!(
            workflow.start_transition(),
            Err(WorkflowError::StartTransitionNotSet(_))
        ));
    }

    #[test]
    fn test_transition_allowed_per_step() {
        let workflow = publishing();
        assert!(workflow.is_transition_allowed("publish", "draft"));
        assert!(!workflow.is_transition_allowed("archive", "draft"));
        assert!(!workflow.is_transition_allowed("publish", "unknown"));
    }

    #[test]
    fn test_available_transitions_follow_the_item() {
        let mut workflow = publishing();
        let mut item = Item::initialize(entity("article"));
        let context = Context::new();

        let names: Vec<&str> = workflow
            .available_transitions(&item, &context)
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(names, vec!["start"]);

        workflow
            .start_transition()
            .unwrap()
            .start(&mut item, &mut Context::new(), &mut ErrorCollection::new())
            .unwrap();

        let names: Vec<&str> = workflow
            .available_transitions(&item, &context)
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(names, vec!["publish"]);

        workflow
            .transition_mut("publish")
            .unwrap()
            .add_condition(FnCondition::new(
                |_: &Transition, _: &Item, _: &Context, _: &mut ErrorCollection| false,
            ));
        assert!(workflow.available_transitions(&item, &context).is_empty());
    }

    #[test]
    fn test_supports_uses_condition() {
        let mut workflow = publishing();
        assert!(workflow.supports(&entity("page")));

        workflow.set_condition(ProviderNameCondition::new("article"));
        assert!(workflow.supports(&entity("article")));
        assert!(!workflow.supports(&entity("page")));
    }

    #[test]
    fn test_valid_graph_passes() {
        publishing().validate().unwrap();
    }

    #[test]
    fn test_unknown_allowed_transition_is_invalid() {
        let mut workflow = publishing();
        let mut review = Step::new("review");
        review.add_allowed_transition("reject");
        workflow.add_step(review);

        let err = workflow.validate().unwrap_err();
        assert!(err.to_string().contains("unknown transition 'reject'"));
    }

    #[test]
    fn test_unknown_target_step_is_invalid() {
        let mut workflow = publishing();
        let mut reject = Transition::new("reject");
        reject.set_step_to("rejected");
        workflow.add_transition(reject, false);

        let err = workflow.validate().unwrap_err();
        assert!(err.to_string().contains("unknown step 'rejected'"));
    }

    #[test]
    fn test_missing_start_transition_is_invalid() {
        let mut workflow = Workflow::new("publishing");
        workflow.add_step(Step::new("draft"));
        assert!(matches!(
            workflow.validate(),
            Err(WorkflowError::StartTransitionNotSet(_))
        ));
    }
}
