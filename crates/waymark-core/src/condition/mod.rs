//! Composable guards.
//!
//! Transition guards implement [`Condition`] and are combined with
//! [`AndCondition`] / [`OrCondition`]. Composites hold trait objects, so any
//! mix of leaves and composites can be nested. Workflow-level guards, which
//! decide whether a workflow handles an entity at all, live in [`workflow`].
//!
//! Empty composites match, for AND as well as for OR: a workflow configured
//! without guards is unconditionally permitted.

pub mod collection;
pub mod property;
pub mod workflow;

pub use collection::{AndCondition, ConditionCollection, OrCondition};
pub use property::{Operator, PropertyCondition};

use waymark_types::error_collection::ErrorCollection;

use crate::flow::context::Context;
use crate::flow::item::Item;
use crate::flow::transition::Transition;

/// Message key of the aggregate error appended by a failing [`AndCondition`].
pub const AND_FAILED: &str = "transition.condition.and.failed";

/// Message key of the aggregate error appended by a failing [`OrCondition`].
pub const OR_FAILED: &str = "transition.condition.or.failed";

/// A guard over an item in the context of a transition.
///
/// On failure an implementation may append diagnostics to `errors`; it is
/// not required to.
pub trait Condition: Send + Sync {
    fn matches(
        &self,
        transition: &Transition,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool;
}

/// Adapter turning a closure into a [`Condition`].
pub struct FnCondition<F> {
    f: F,
}

impl<F> FnCondition<F>
where
    F: Fn(&Transition, &Item, &Context, &mut ErrorCollection) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Condition for FnCondition<F>
where
    F: Fn(&Transition, &Item, &Context, &mut ErrorCollection) -> bool + Send + Sync,
{
    fn matches(
        &self,
        transition: &Transition,
        item: &Item,
        context: &Context,
        errors: &mut ErrorCollection,
    ) -> bool {
        (self.f)(transition, item, context, errors)
    }
}
