//! Entity repository trait definition.

use std::sync::Arc;

use waymark_types::entity::{Entity, EntityId};
use waymark_types::error::RepositoryError;

/// Repository trait for entity persistence.
///
/// `add` stores the entity, inserting or replacing by id. The transition
/// handler calls it inside the transaction after every transition.
pub trait EntityRepository: Send + Sync {
    fn add(&self, entity: &Entity) -> Result<(), RepositoryError>;

    fn find(&self, id: &EntityId) -> Result<Option<Entity>, RepositoryError>;
}

impl<R: EntityRepository + ?Sized> EntityRepository for Arc<R> {
    fn add(&self, entity: &Entity) -> Result<(), RepositoryError> {
        (**self).add(entity)
    }

    fn find(&self, id: &EntityId) -> Result<Option<Entity>, RepositoryError> {
        (**self).find(id)
    }
}
