//! Observability for Waymark: tracing subscriber setup and the attribute
//! names used on workflow spans.

pub mod tracing_setup;
pub mod workflow_attrs;
