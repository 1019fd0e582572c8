//! In-memory store implementing every persistence port of `waymark-core`.
//!
//! Backs the CLI simulator and tests. Entities and state histories live in
//! `DashMap`s; writes made inside a transaction are staged and applied on
//! commit.

use std::sync::{Mutex, MutexGuard};

use dashmap::DashMap;
use waymark_core::repository::{EntityRepository, StateRepository, TransactionHandler};
use waymark_types::entity::{Entity, EntityId};
use waymark_types::error::{RepositoryError, TransactionError};
use waymark_types::state::State;

/// A write waiting for commit.
#[derive(Debug)]
enum StagedWrite {
    Entity(Entity),
    State(State),
}

/// Thread-safe in-memory store.
///
/// Writes outside a transaction apply immediately. Inside a transaction they
/// stay invisible to readers until [`commit`](TransactionHandler::commit).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: DashMap<EntityId, Entity>,
    states: DashMap<EntityId, Vec<State>>,
    /// `Some` while a transaction is active.
    staged: Mutex<Option<Vec<StagedWrite>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of committed states across all entities.
    pub fn state_count(&self) -> usize {
        self.states.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn in_transaction(&self) -> bool {
        self.staged.lock().is_ok_and(|staged| staged.is_some())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Vec<StagedWrite>>>, TransactionError> {
        self.staged
            .lock()
            .map_err(|e| TransactionError::Backend(format!("staging lock poisoned: {e}")))
    }

    /// Stage the write if a transaction is active, otherwise apply it.
    fn write(&self, write: StagedWrite) -> Result<(), RepositoryError> {
        let mut staged = self
            .lock()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match staged.as_mut() {
            Some(pending) => pending.push(write),
            None => self.apply(write),
        }
        Ok(())
    }

    fn apply(&self, write: StagedWrite) {
        match write {
            StagedWrite::Entity(entity) => {
                self.entities.insert(entity.id.clone(), entity);
            }
            StagedWrite::State(state) => {
                self.states
                    .entry(state.entity_id().clone())
                    .or_default()
                    .push(state);
            }
        }
    }
}

impl EntityRepository for MemoryStore {
    fn add(&self, entity: &Entity) -> Result<(), RepositoryError> {
        self.write(StagedWrite::Entity(entity.clone()))
    }

    fn find(&self, id: &EntityId) -> Result<Option<Entity>, RepositoryError> {
        Ok(self.entities.get(id).map(|entry| entry.value().clone()))
    }
}

impl StateRepository for MemoryStore {
    fn add(&self, state: &State) -> Result<(), RepositoryError> {
        self.write(StagedWrite::State(state.clone()))
    }

    fn find(&self, entity_id: &EntityId) -> Result<Vec<State>, RepositoryError> {
        Ok(self
            .states
            .get(entity_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

impl TransactionHandler for MemoryStore {
    fn begin(&self) -> Result<(), TransactionError> {
        let mut staged = self.lock()?;
        if staged.is_some() {
            return Err(TransactionError::AlreadyActive);
        }
        *staged = Some(Vec::new());
        tracing::trace!("memory transaction started");
        Ok(())
    }

    fn commit(&self) -> Result<(), TransactionError> {
        let pending = self.lock()?.take().ok_or(TransactionError::NotActive)?;
        tracing::trace!(writes = pending.len(), "memory transaction committed");
        for write in pending {
            self.apply(write);
        }
        Ok(())
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        let pending = self.lock()?.take().ok_or(TransactionError::NotActive)?;
        tracing::trace!(writes = pending.len(), "memory transaction rolled back");
        Ok(())
    }
}
