//! Workflow graph model and runtime item.

pub mod action;
pub mod context;
pub mod item;
pub mod step;
pub mod transition;
pub mod workflow;

pub use action::{Action, ActionError, FnAction};
pub use context::Context;
pub use item::Item;
pub use step::Step;
pub use transition::Transition;
pub use workflow::Workflow;
