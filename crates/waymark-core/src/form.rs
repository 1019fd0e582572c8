//! Form trait definition.
//!
//! A form collects the user input a transition needs. Actions describe their
//! fields through [`Form::add_field`]; the UI layer renders and submits it.

use serde_json::Value;
use waymark_types::error_collection::ErrorCollection;

use crate::flow::context::Context;

/// Input form built for one transition.
///
/// Implementations live outside the engine (HTML forms, CLI prompts, API
/// payload validators).
pub trait Form {
    /// Register a field. `spec` is free-form (type, label, constraints).
    fn add_field(&mut self, name: &str, spec: Value);

    /// Validate the submitted input, writing accepted values into `context`.
    ///
    /// On failure the reasons are available through [`Form::errors`].
    fn validate(&mut self, context: &mut Context) -> bool;

    fn errors(&self) -> &ErrorCollection;
}
