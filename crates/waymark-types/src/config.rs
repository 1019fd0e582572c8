//! Global configuration types for Waymark.
//!
//! `WaymarkConfig` represents the `waymark.toml` file that controls logging
//! and how workflow definitions are discovered and checked.

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaymarkConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Bridge tracing spans to the OpenTelemetry stdout exporter.
    #[serde(default)]
    pub enable_otel: bool,

    /// Directory scanned for workflow definition files.
    #[serde(default = "default_definitions_dir")]
    pub definitions_dir: String,

    /// Run graph validation after building a workflow from a definition.
    #[serde(default = "default_strict_definitions")]
    pub strict_definitions: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_definitions_dir() -> String {
    "workflows".to_string()
}

fn default_strict_definitions() -> bool {
    true
}

impl Default for WaymarkConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            enable_otel: false,
            definitions_dir: default_definitions_dir(),
            strict_definitions: default_strict_definitions(),
        }
    }
}
