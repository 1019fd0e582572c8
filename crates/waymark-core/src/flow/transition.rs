//! Guarded workflow edge.
//!
//! A transition checks its precondition and condition, runs its actions and
//! records the outcome as a [`State`] on the item. Guard failures and
//! recoverable action failures end up in the caller's [`ErrorCollection`];
//! only configuration errors and fatal action errors are returned as `Err`.

use std::fmt;

use serde_json::{Map, Value, json};
use waymark_types::error::WorkflowError;
use waymark_types::error_collection::ErrorCollection;
use waymark_types::permission::Permission;
use waymark_types::state::State;

use super::action::{Action, ActionError};
use super::context::Context;
use super::item::Item;
use crate::condition::{AndCondition, Condition, ConditionCollection};
use crate::form::Form;

pub const PRECONDITION_FAILED: &str = "transition.precondition.failed";
pub const CONDITION_FAILED: &str = "transition.condition.failed";
pub const ACTION_FAILED: &str = "transition.action.failed";
pub const POST_ACTION_FAILED: &str = "transition.post_action.failed";

pub struct Transition {
    name: String,
    label: String,
    /// Name of the owning workflow, bound by `Workflow::add_transition`.
    workflow_name: Option<String>,
    actions: Vec<Box<dyn Action>>,
    post_actions: Vec<Box<dyn Action>>,
    condition: Option<AndCondition>,
    pre_condition: Option<AndCondition>,
    permission: Option<Permission>,
    step_to: Option<String>,
    config: Map<String, Value>,
}

impl Transition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            workflow_name: None,
            actions: Vec::new(),
            post_actions: Vec::new(),
            condition: None,
            pre_condition: None,
            permission: None,
            step_to: None,
            config: Map::new(),
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

    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow_name.as_deref()
    }

    pub(crate) fn set_workflow_name(&mut self, workflow_name: impl Into<String>) {
        self.workflow_name = Some(workflow_name.into());
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    pub fn add_action(&mut self, action: impl Action + 'static) -> &mut Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    pub fn add_post_action(&mut self, action: impl Action + 'static) -> &mut Self {
        self.post_actions.push(Box::new(action));
        self
    }

    pub fn post_actions(&self) -> &[Box<dyn Action>] {
        &self.post_actions
    }

    /// Add a condition, creating the AND composite on first use.
    pub fn add_condition(&mut self, condition: impl Condition + 'static) -> &mut Self {
        self.condition
            .get_or_insert_with(AndCondition::new)
            .add_condition(condition);
        self
    }

    pub fn condition(&self) -> Option<&AndCondition> {
        self.condition.as_ref()
    }

    /// Add a precondition, creating the AND composite on first use.
    pub fn add_pre_condition(&mut self, condition: impl Condition + 'static) -> &mut Self {
        self.pre_condition
            .get_or_insert_with(AndCondition::new)
            .add_condition(condition);
        self
    }

    pub fn pre_condition(&self) -> Option<&AndCondition> {
        self.pre_condition.as_ref()
    }

    pub fn set_permission(&mut self, permission: Permission) -> &mut Self {
        self.permission = Some(permission);
        self
    }

    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }

    /// False when no permission is set.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permission
            .as_ref()
            .is_some_and(|own| own.equals(permission))
    }

    pub fn set_step_to(&mut self, step_name: impl Into<String>) -> &mut Self {
        self.step_to = Some(step_name.into());
        self
    }

    pub fn step_to(&self) -> Option<&str> {
        self.step_to.as_deref()
    }

    pub fn set_config_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.config.insert(name.into(), value);
        self
    }

    pub fn config_value(&self, name: &str) -> Option<&Value> {
        self.config.get(name)
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn is_input_required(&self, item: &Item) -> bool {
        self.actions.iter().any(|a| a.is_input_required(item))
    }

    pub fn build_form(&self, form: &mut dyn Form, item: &Item) {
        for action in &self.actions {
            action.build_form(form, item);
        }
    }

    // -----------------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------------

    pub fn check_pre_condition(
        &self,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        self.check(
            self.pre_condition.as_ref(),
            PRECONDITION_FAILED,
            item,
            context,
            errors,
        )
    }

    pub fn check_condition(
        &self,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        self.check(self.condition.as_ref(), CONDITION_FAILED, item, context, errors)
    }

    fn check(
        &self,
        condition: Option<&AndCondition>,
        message: &str,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        let Some(condition) = condition else {
            return true;
        };

        let mut child_errors = ErrorCollection::new();
        if condition.matches(self, item, context, &mut child_errors) {
            return true;
        }

        tracing::debug!(
            transition = %self.name,
            entity_id = %item.entity_id(),
            guard = message,
            "transition guard failed"
        );
        errors.add_error(message, vec![], Some(child_errors));
        false
    }

    /// Precondition, then condition. Stops at the first failure.
    pub fn is_allowed(&self, item: &Item, context: &Context, errors: &mut ErrorCollection) -> bool {
        self.check_pre_condition(item, context, errors)
            && self.check_condition(item, context, errors)
    }

    /// Whether the transition can be offered to the user.
    ///
    /// If input is required the main condition is ignored, as it usually
    /// depends on the input not yet given.
    pub fn is_available(
        &self,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        if !self.check_pre_condition(item, context, errors) {
            return false;
        }

        self.is_input_required(item) || self.check_condition(item, context, errors)
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Run every action in order. Returns `Ok(false)` if one of them failed.
    pub fn execute_actions(
        &self,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<bool, WorkflowError> {
        self.run(&self.actions, ACTION_FAILED, item, context, errors)
    }

    pub fn execute_post_actions(
        &self,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<bool, WorkflowError> {
        self.run(&self.post_actions, POST_ACTION_FAILED, item, context, errors)
    }

    fn run(
        &self,
        actions: &[Box<dyn Action>],
        message: &str,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<bool, WorkflowError> {
        let mut success = true;

        for action in actions {
            match action.transit(self, item, context) {
                Ok(()) => {
                    tracing::debug!(transition = %self.name, action = action.name(), "action executed");
                }
                Err(ActionError::Failed { reason }) => {
                    tracing::warn!(
                        transition = %self.name,
                        action = action.name(),
                        entity_id = %item.entity_id(),
                        reason = %reason,
                        "action failed"
                    );
                    errors.add_error(
                        message,
                        vec![
                            json!(action.name()),
                            json!(reason),
                            Value::Object(context.properties().clone()),
                        ],
                        None,
                    );
                    success = false;
                }
                Err(ActionError::Fatal { reason }) => {
                    return Err(WorkflowError::ActionAborted {
                        action: action.name().to_string(),
                        reason,
                    });
                }
            }
        }

        Ok(success)
    }

    /// Execute the transition for a started item.
    ///
    /// The produced state points to the target step on success and to the
    /// current step otherwise. Post-actions only run after a successful
    /// transition.
    pub fn transit(
        &self,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<State, WorkflowError> {
        let Some(current_step) = item.current_step_name().map(str::to_string) else {
            return Err(WorkflowError::WorkflowNotStarted {
                transition: self.name.clone(),
                workflow: self.workflow_name.clone().unwrap_or_default(),
                entity_id: item.entity_id().to_string(),
            });
        };

        let success = self.is_allowed(item, context, errors)
            && self.execute_actions(item, context, errors)?;

        let step_name = if success {
            self.step_to.clone().unwrap_or(current_step)
        } else {
            current_step
        };

        let state = self.state(item, context, errors, Some(step_name), success);
        item.transit(state.clone())?;
        self.finish(success, item, context, errors)?;

        Ok(state)
    }

    /// Execute the transition as start transition of a new item.
    ///
    /// Step membership is not checked. A failed start leaves the item
    /// unstarted. A start transition needs a target step; without one
    /// nothing runs.
    pub fn start(
        &self,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<State, WorkflowError> {
        if item.is_workflow_started() {
            return Err(WorkflowError::AlreadyStarted {
                workflow: item.workflow_name().unwrap_or_default().to_string(),
                entity_id: item.entity_id().to_string(),
            });
        }

        let Some(step_to) = self.step_to.clone() else {
            return Err(WorkflowError::StartTargetNotSet {
                transition: self.name.clone(),
                workflow: self.workflow_name.clone().unwrap_or_default(),
            });
        };

        let success = self.is_allowed(item, context, errors)
            && self.execute_actions(item, context, errors)?;

        let step_name = success.then_some(step_to);

        let state = self.state(item, context, errors, step_name, success);
        item.start(state.clone())?;
        self.finish(success, item, context, errors)?;

        Ok(state)
    }

    fn state(
        &self,
        item: &Item,
        context: &Context,
        errors: &ErrorCollection,
        step_name: Option<String>,
        success: bool,
    ) -> State {
        State::new(
            item.entity_id().clone(),
            self.workflow_name.clone().unwrap_or_default(),
            self.name.clone(),
            step_name,
            success,
            context.properties().clone(),
            errors,
        )
    }

    fn finish(
        &self,
        success: bool,
        item: &mut Item,
        context: &mut Context,
        errors: &mut ErrorCollection,
    ) -> Result<(), WorkflowError> {
        tracing::debug!(
            workflow = self.workflow_name.as_deref().unwrap_or_default(),
            transition = %self.name,
            entity_id = %item.entity_id(),
            step = item.current_step_name().unwrap_or_default(),
            success,
            "transition executed"
        );

        if success {
            self.execute_post_actions(item, context, errors)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("workflow_name", &self.workflow_name)
            .field("actions", &self.actions.len())
            .field("post_actions", &self.post_actions.len())
            .field("step_to", &self.step_to)
            .field("permission", &self.permission)
            .finish()
    }
}
