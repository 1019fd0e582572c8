use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::entity::EntityId;
use crate::error_collection::ErrorCollection;

/// Unique identifier for a state record, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub Uuid);

impl StateId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Immutable record of one completed transition attempt.
///
/// A state is appended to the entity's history and never edited. Following
/// transitions produce new states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    id: StateId,
    entity_id: EntityId,
    workflow_name: String,
    transition_name: String,
    /// `None` for a start attempt which failed before reaching a step.
    step_name: Option<String>,
    success: bool,
    /// Snapshot of the context properties at the time of the transition.
    data: Map<String, Value>,
    /// Flattened error collection (see `ErrorCollection::to_array`).
    errors: Vec<Value>,
    reached_at: DateTime<Utc>,
}

impl State {
    pub fn new(
        entity_id: EntityId,
        workflow_name: impl Into<String>,
        transition_name: impl Into<String>,
        step_name: Option<String>,
        success: bool,
        data: Map<String, Value>,
        errors: &ErrorCollection,
    ) -> Self {
        Self {
            id: StateId::new(),
            entity_id,
            workflow_name: workflow_name.into(),
            transition_name: transition_name.into(),
            step_name,
            success,
            data,
            errors: errors.to_array(),
            reached_at: Utc::now(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn transition_name(&self) -> &str {
        &self.transition_name
    }

    /// The step the item occupies after this transition attempt.
    pub fn step_name(&self) -> Option<&str> {
        self.step_name.as_deref()
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn errors(&self) -> &[Value] {
        &self.errors
    }

    pub fn reached_at(&self) -> DateTime<Utc> {
        self.reached_at
    }
}
