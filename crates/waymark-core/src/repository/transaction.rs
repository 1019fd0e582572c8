//! Transaction handler trait definition.

use std::sync::Arc;

use waymark_types::error::TransactionError;

/// Transaction boundary around one transition.
///
/// Exactly one transaction is open per `TransitionHandler::transit` call.
/// Nested transactions are not supported.
pub trait TransactionHandler: Send + Sync {
    fn begin(&self) -> Result<(), TransactionError>;

    fn commit(&self) -> Result<(), TransactionError>;

    fn rollback(&self) -> Result<(), TransactionError>;
}

impl<T: TransactionHandler + ?Sized> TransactionHandler for Arc<T> {
    fn begin(&self) -> Result<(), TransactionError> {
        (**self).begin()
    }

    fn commit(&self) -> Result<(), TransactionError> {
        (**self).commit()
    }

    fn rollback(&self) -> Result<(), TransactionError> {
        (**self).rollback()
    }
}
