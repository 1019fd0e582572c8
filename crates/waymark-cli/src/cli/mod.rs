//! CLI command definitions and dispatch for the `waymark` binary.
//!
//! Uses clap derive macros for argument parsing. Every command works on a
//! workflow definition file (YAML or TOML).

pub mod check;
pub mod definition;
pub mod graph;
pub mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Check, inspect and simulate workflow definitions.
#[derive(Parser)]
#[command(name = "waymark", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file (defaults to ./waymark.toml).
    #[arg(long, global = true, env = "WAYMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a definition (or every definition in the
    /// configured directory).
    Check {
        /// Definition file. Omit to check the definitions directory.
        file: Option<PathBuf>,
    },

    /// Show the steps of a workflow and the transitions leaving them.
    Graph {
        /// Definition file.
        file: PathBuf,
    },

    /// Run transitions against a fresh in-memory entity.
    Simulate {
        /// Definition file.
        file: PathBuf,

        /// Transition to run, in order. The start transition runs first
        /// unless it is listed explicitly.
        #[arg(short, long = "transition")]
        transitions: Vec<String>,

        /// Entity property as key=value (value parsed as JSON, else string).
        #[arg(long = "set", value_parser = parse_key_value)]
        properties: Vec<(String, serde_json::Value)>,

        /// Form input as key=value (value parsed as JSON, else string).
        #[arg(long = "input", value_parser = parse_key_value)]
        inputs: Vec<(String, serde_json::Value)>,

        /// Entity identifier.
        #[arg(long, default_value = "1")]
        id: String,

        /// Entity provider (defaults to the definition's provider).
        #[arg(long)]
        provider: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse `key=value`. The value is read as JSON and falls back to a plain
/// string, so `--set words=120` gives a number and `--set title=Hello` a
/// string.
pub fn parse_key_value(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
