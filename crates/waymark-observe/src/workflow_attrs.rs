//! Span attribute names for workflow instrumentation.
//!
//! Usable as field names in `tracing::span!` and `tracing::info_span!`, so
//! every crate reports the same keys.
//!
//! Span naming convention: `"{operation} {workflow}"` (e.g., `"transit publishing"`)

// --- Identity attributes ---

/// Name of the workflow being processed.
pub const WORKFLOW_NAME: &str = "waymark.workflow.name";

/// Name of the transition being handled.
pub const WORKFLOW_TRANSITION: &str = "waymark.workflow.transition";

/// Entity id in its string form (`"<provider>::<identifier>"`).
pub const WORKFLOW_ENTITY_ID: &str = "waymark.workflow.entity_id";

// --- Outcome attributes ---

/// Step reached after the transition.
pub const WORKFLOW_STEP: &str = "waymark.workflow.step";

/// Whether the transition succeeded.
pub const WORKFLOW_SUCCESS: &str = "waymark.workflow.success";

/// Number of errors recorded while handling the transition.
pub const WORKFLOW_ERROR_COUNT: &str = "waymark.workflow.error_count";

// --- Operation name values ---

/// Validation of a transition's form input.
pub const OP_VALIDATE: &str = "validate";

/// Execution of a transition inside a transaction.
pub const OP_TRANSIT: &str = "transit";

/// Loading and checking a workflow definition.
pub const OP_CHECK_DEFINITION: &str = "check_definition";
