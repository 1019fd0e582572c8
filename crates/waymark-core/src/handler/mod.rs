//! Use-case orchestration around a single transition.

pub mod listener;
pub mod transition_handler;

pub use listener::{Listener, Listeners, NoopListener};
pub use transition_handler::{FORM_FAILED, TransitionHandler};
