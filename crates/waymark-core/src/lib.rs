//! Workflow engine core for Waymark.
//!
//! This crate holds the workflow graph, guard evaluation, transition
//! execution and the transaction-bounded transition handler. It defines the
//! "ports" (repository traits) that the infrastructure layer implements and
//! depends only on `waymark-types` -- never on `waymark-infra` or any
//! storage crate.

pub mod condition;
pub mod definition;
pub mod flow;
pub mod form;
pub mod handler;
pub mod manager;
pub mod repository;
