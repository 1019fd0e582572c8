//! State repository trait definition.

use std::sync::Arc;

use waymark_types::entity::EntityId;
use waymark_types::error::RepositoryError;
use waymark_types::state::State;

/// Repository trait for the append-only state history.
pub trait StateRepository: Send + Sync {
    /// Append a state. States are never updated.
    fn add(&self, state: &State) -> Result<(), RepositoryError>;

    /// All states of an entity, oldest first.
    fn find(&self, entity_id: &EntityId) -> Result<Vec<State>, RepositoryError>;
}

impl<R: StateRepository + ?Sized> StateRepository for Arc<R> {
    fn add(&self, state: &State) -> Result<(), RepositoryError> {
        (**self).add(state)
    }

    fn find(&self, entity_id: &EntityId) -> Result<Vec<State>, RepositoryError> {
        (**self).find(entity_id)
    }
}
