//! Infrastructure layer for Waymark.
//!
//! Contains implementations of the repository traits defined in
//! `waymark-core` (the in-memory store) and the configuration loader.

pub mod config;
pub mod memory;
