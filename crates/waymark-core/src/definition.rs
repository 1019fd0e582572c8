//! Workflow definition parsing, validation, and filesystem operations.
//!
//! Workflows are declared in YAML or TOML: steps, transitions, the start
//! transition, permissions, labels and target steps. A definition builds a
//! plain [`Workflow`]; actions and conditions are attached in code afterwards
//! through [`Workflow::transition_mut`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use waymark_types::error::{PermissionError, WorkflowError};
use waymark_types::permission::Permission;

use crate::condition::workflow::ProviderNameCondition;
use crate::flow::{Step, Transition, Workflow};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a workflow definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// YAML/TOML parse failure.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Structural validation failure.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// File extension is neither YAML nor TOML.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid permission: {0}")]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

// ---------------------------------------------------------------------------
// Definition model
// ---------------------------------------------------------------------------

/// Declarative form of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Restrict the workflow to entities of this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub start_transition: String,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Names of the transitions allowed to leave this step.
    #[serde(default)]
    pub transitions: Vec<String>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    /// Permission id, scoped to the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Target step.
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

impl WorkflowDefinition {
    /// Build the workflow graph. Does not run [`Workflow::validate`].
    pub fn build(&self) -> Result<Workflow, DefinitionError> {
        let mut workflow = Workflow::new(&self.name);
        if let Some(label) = &self.label {
            workflow = workflow.with_label(label);
        }

        for def in &self.steps {
            let mut step = Step::new(&def.name);
            if let Some(label) = &def.label {
                step = step.with_label(label);
            }
            for transition in &def.transitions {
                step.add_allowed_transition(transition);
            }
            step.set_final(def.is_final);
            if let Some(permission) = &def.permission {
                step.set_permission(Permission::for_workflow_name(&self.name, permission)?);
            }
            workflow.add_step(step);
        }

        for def in &self.transitions {
            let mut transition = Transition::new(&def.name);
            if let Some(label) = &def.label {
                transition = transition.with_label(label);
            }
            transition.set_step_to(&def.to);
            if let Some(permission) = &def.permission {
                transition.set_permission(Permission::for_workflow_name(&self.name, permission)?);
            }
            for (key, value) in &def.config {
                transition.set_config_value(key, value.clone());
            }
            workflow.add_transition(transition, def.name == self.start_transition);
        }

        if let Some(provider) = &self.provider {
            workflow.set_condition(ProviderNameCondition::new(provider));
        }

        Ok(workflow)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a YAML string into a validated `WorkflowDefinition`.
pub fn parse_definition_yaml(yaml: &str) -> Result<WorkflowDefinition, DefinitionError> {
    let def: WorkflowDefinition =
        serde_yaml_ng::from_str(yaml).map_err(|e| DefinitionError::ParseError(e.to_string()))?;
    validate_definition(&def)?;
    Ok(def)
}

/// Parse a TOML string into a validated `WorkflowDefinition`.
pub fn parse_definition_toml(source: &str) -> Result<WorkflowDefinition, DefinitionError> {
    let def: WorkflowDefinition =
        toml::from_str(source).map_err(|e| DefinitionError::ParseError(e.to_string()))?;
    validate_definition(&def)?;
    Ok(def)
}

pub fn serialize_definition_yaml(def: &WorkflowDefinition) -> Result<String, DefinitionError> {
    serde_yaml_ng::to_string(def).map_err(|e| DefinitionError::ParseError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structural constraints on a `WorkflowDefinition`.
///
/// Checks:
/// - Name is non-empty and contains only alphanumeric characters, `-` and `_`
/// - Step and transition names are unique
/// - The start transition exists
/// - Every transition allowed in a step exists
/// - Every transition targets an existing step
/// - Final steps allow no transitions
pub fn validate_definition(def: &WorkflowDefinition) -> Result<(), DefinitionError> {
    if def.name.is_empty() {
        return Err(DefinitionError::ValidationError(
            "workflow name must not be empty".to_string(),
        ));
    }
    if !def
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DefinitionError::ValidationError(format!(
            "workflow name '{}' contains invalid characters",
            def.name
        )));
    }

    let mut step_names = HashSet::new();
    for step in &def.steps {
        if !step_names.insert(step.name.as_str()) {
            return Err(DefinitionError::ValidationError(format!(
                "duplicate step: '{}'",
                step.name
            )));
        }
    }

    let mut transition_names = HashSet::new();
    for transition in &def.transitions {
        if !transition_names.insert(transition.name.as_str()) {
            return Err(DefinitionError::ValidationError(format!(
                "duplicate transition: '{}'",
                transition.name
            )));
        }
    }

    if !transition_names.contains(def.start_transition.as_str()) {
        return Err(DefinitionError::ValidationError(format!(
            "start transition '{}' is not defined",
            def.start_transition
        )));
    }

    for step in &def.steps {
        if let Some(unknown) = step
            .transitions
            .iter()
            .find(|t| !transition_names.contains(t.as_str()))
        {
            return Err(DefinitionError::ValidationError(format!(
                "step '{}' references unknown transition '{unknown}'",
                step.name
            )));
        }
        if step.is_final && !step.transitions.is_empty() {
            return Err(DefinitionError::ValidationError(format!(
                "final step '{}' must not allow transitions",
                step.name
            )));
        }
    }

    for transition in &def.transitions {
        if !step_names.contains(transition.to.as_str()) {
            return Err(DefinitionError::ValidationError(format!(
                "transition '{}' targets unknown step '{}'",
                transition.name, transition.to
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Filesystem operations
// ---------------------------------------------------------------------------

/// Load a definition, choosing the format by file extension.
pub fn load_definition_file(path: &Path) -> Result<WorkflowDefinition, DefinitionError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "yaml" | "yml" => parse_definition_yaml(&std::fs::read_to_string(path)?),
        "toml" => parse_definition_toml(&std::fs::read_to_string(path)?),
        other => Err(DefinitionError::UnsupportedFormat(format!(
            "'{}' (extension '{other}')",
            path.display()
        ))),
    }
}

/// Discover all definition files directly under `dir`, sorted by path.
///
/// Files that fail to load are skipped with a warning.
pub fn discover_definitions(
    dir: &Path,
) -> Result<Vec<(PathBuf, WorkflowDefinition)>, DefinitionError> {
    let mut results = Vec::new();
    if !dir.exists() {
        return Ok(results);
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.sort();

    for path in paths {
        let supported = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml" || ext == "toml");
        if !path.is_file() || !supported {
            continue;
        }

        match load_definition_file(&path) {
            Ok(def) => results.push((path, def)),
            Err(error) => {
                tracing::warn!(?path, %error, "skipping invalid workflow definition");
            }
        }
    }

    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
