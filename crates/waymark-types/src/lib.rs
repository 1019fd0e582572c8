//! Shared domain types for Waymark.
//!
//! This crate contains the value types used across the workflow engine:
//! entity identities, state records, permissions, the error collection and
//! the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod entity;
pub mod error;
pub mod error_collection;
pub mod permission;
pub mod state;
