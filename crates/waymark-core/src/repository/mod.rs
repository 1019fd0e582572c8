//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (waymark-infra) implements. The core crate never depends on any specific
//! storage technology.
//!
//! All ports are synchronous: a transition runs to completion on the calling
//! thread.

pub mod entity;
pub mod state;
pub mod transaction;

pub use entity::EntityRepository;
pub use state::StateRepository;
pub use transaction::TransactionHandler;
