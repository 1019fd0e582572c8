use thiserror::Error;

/// Errors raised by the workflow engine.
///
/// Guard and action failures never surface here; they are recorded into an
/// `ErrorCollection`. Everything in this enum aborts the use case.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("not allowed to process transition '{transition}': transition is not allowed in step '{step}'")]
    TransitionNotAllowed { transition: String, step: String },

    #[error(
        "not allowed to process transition '{transition}': workflow '{workflow}' not started for item '{entity_id}'"
    )]
    WorkflowNotStarted {
        transition: String,
        workflow: String,
        entity_id: String,
    },

    #[error("workflow '{workflow}' already started for item '{entity_id}'")]
    AlreadyStarted { workflow: String, entity_id: String },

    #[error("step '{step}' not found in workflow '{workflow}'")]
    StepNotFound { step: String, workflow: String },

    #[error("transition '{transition}' not found in workflow '{workflow}'")]
    TransitionNotFound { transition: String, workflow: String },

    #[error("workflow '{0}' has no start transition")]
    StartTransitionNotSet(String),

    #[error("start transition '{transition}' of workflow '{workflow}' has no target step")]
    StartTargetNotSet { transition: String, workflow: String },

    #[error("transition was not validated so far")]
    NotValidated,

    #[error("transition is in an invalid state and can't be processed")]
    InvalidState,

    #[error("invalid workflow graph: {0}")]
    InvalidGraph(String),

    #[error("action '{action}' aborted: {reason}")]
    ActionAborted { action: String, reason: String },

    #[error("listener error: {0}")]
    Listener(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

/// Errors from repository operations (used by trait definitions in waymark-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised by a transaction backend.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("a transaction is already active")]
    AlreadyActive,

    #[error("no active transaction")]
    NotActive,

    #[error("transaction backend error: {0}")]
    Backend(String),
}

/// Errors raised when constructing a [`Permission`](crate::permission::Permission).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("workflow name must not be blank")]
    BlankWorkflowName,

    #[error("permission id must not be blank")]
    BlankPermissionId,

    #[error("workflow name must not contain ':', got \"{0}\"")]
    ColonInWorkflowName(String),

    #[error("invalid permission string given, expected \"workflowName:permissionId\", got \"{0}\"")]
    InvalidFormat(String),
}

/// Raised by `ErrorCollection::get_error` for an absent index.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("error with index {index} not set (collection holds {len} errors)")]
pub struct ErrorIndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_not_allowed_display() {
        let err = WorkflowError::TransitionNotAllowed {
            transition: "publish".to_string(),
            step: "draft".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "not allowed to process transition 'publish': transition is not allowed in step 'draft'"
        );
    }

    #[test]
    fn test_repository_error_converts_into_workflow_error() {
        let err: WorkflowError = RepositoryError::Query("disk full".to_string()).into();
        assert!(matches!(err, WorkflowError::Repository(_)));
        assert_eq!(err.to_string(), "repository error: query error: disk full");
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = ErrorIndexOutOfRange { index: 3, len: 1 };
        assert!(err.to_string().contains("index 3"));
    }
}
