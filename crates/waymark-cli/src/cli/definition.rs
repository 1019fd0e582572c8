//! Loading definitions into workflows for the CLI commands.

use std::path::Path;

use anyhow::{Context, Result};

use waymark_core::definition::{DefinitionError, WorkflowDefinition, load_definition_file};
use waymark_core::flow::Workflow;

/// A definition together with the workflow built from it.
pub struct LoadedWorkflow {
    pub definition: WorkflowDefinition,
    pub workflow: Workflow,
}

/// Build the workflow of `definition`, validating the graph when `strict`.
pub fn build(definition: WorkflowDefinition, strict: bool) -> Result<LoadedWorkflow> {
    let workflow = definition
        .build()
        .with_context(|| format!("Failed to build workflow '{}'", definition.name))?;

    if strict {
        workflow
            .validate()
            .with_context(|| format!("Workflow '{}' is invalid", definition.name))?;
    }

    Ok(LoadedWorkflow {
        definition,
        workflow,
    })
}

/// Load, parse and build the definition at `path`.
pub fn load(path: &Path, strict: bool) -> Result<LoadedWorkflow> {
    let definition = load_definition_file(path).map_err(|e| match e {
        DefinitionError::ParseError(msg) => {
            anyhow::anyhow!("Failed to parse {}: {msg}", path.display())
        }
        DefinitionError::ValidationError(msg) => {
            anyhow::anyhow!("Definition {} is invalid: {msg}", path.display())
        }
        other => anyhow::anyhow!("Failed to load {}: {other}", path.display()),
    })?;

    build(definition, strict)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: publishing
start_transition: create
steps:
  - name: draft
    transitions: [publish]
  - name: published
    final: true
transitions:
  - name: create
    to: draft
  - name: publish
    to: published
"#;

    #[test]
    fn test_load_builds_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("publishing.yaml");
        std::fs::write(&path, YAML).unwrap();

        let loaded = load(&path, true).unwrap();
        assert_eq!(loaded.workflow.name(), "publishing");
        assert_eq!(loaded.definition.transitions.len(), 2);
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, YAML.replace("to: published", "to: gone")).unwrap();

        let err = load(&path, true).err().unwrap();
        assert!(err.to_string().contains("is invalid"));
    }
}
