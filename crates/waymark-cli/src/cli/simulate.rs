//! `waymark simulate`: drive a fresh entity through a workflow in memory.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;
use serde_json::{Map, Value, json};

use waymark_core::flow::{Context, Item, Workflow};
use waymark_core::form::Form;
use waymark_core::handler::NoopListener;
use waymark_core::manager::WorkflowManager;
use waymark_infra::memory::MemoryStore;
use waymark_observe::workflow_attrs::{
    WORKFLOW_ENTITY_ID, WORKFLOW_ERROR_COUNT, WORKFLOW_NAME, WORKFLOW_STEP, WORKFLOW_SUCCESS,
    WORKFLOW_TRANSITION,
};
use waymark_types::entity::{Entity, EntityId};
use waymark_types::error_collection::ErrorCollection;
use waymark_types::state::State;

/// Message key for a form field without submitted input.
pub const FIELD_REQUIRED: &str = "form.field.required";

/// Form fed from `--input` values: every registered field must be present
/// in the context input and is copied into the context properties.
#[derive(Debug, Default)]
pub struct InputForm {
    fields: Vec<(String, Value)>,
    errors: ErrorCollection,
}

impl InputForm {
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl Form for InputForm {
    fn add_field(&mut self, name: &str, spec: Value) {
        self.fields.push((name.to_string(), spec));
    }

    fn validate(&mut self, context: &mut Context) -> bool {
        self.errors.reset();

        for (name, _) in &self.fields {
            match context.get_input(name).cloned() {
                Some(value) => {
                    context.set_property(name.clone(), value);
                }
                None => {
                    self.errors.add_error(FIELD_REQUIRED, vec![json!(name)], None);
                }
            }
        }

        !self.errors.has_errors()
    }

    fn errors(&self) -> &ErrorCollection {
        &self.errors
    }
}

/// One executed (or rejected) transition of a simulation.
#[derive(Debug, Serialize)]
pub struct SimulationStep {
    pub transition: String,
    pub state: Option<State>,
    pub errors: Vec<String>,
}

/// Everything needed to run a simulation.
pub struct Simulation {
    pub workflow: Workflow,
    pub entity: Entity,
    pub transitions: Vec<String>,
    pub inputs: Vec<(String, Value)>,
}

impl Simulation {
    /// Run the transitions in order, stopping at the first one which fails.
    ///
    /// The start transition runs first unless it is listed explicitly as the
    /// first transition.
    pub fn run(self) -> Result<(Vec<SimulationStep>, Item)> {
        let start_name = self.workflow.start_transition()?.name().to_string();
        let workflow_name = self.workflow.name().to_string();

        let mut names = self.transitions;
        if names.first() != Some(&start_name) {
            names.insert(0, start_name);
        }

        let store = Arc::new(MemoryStore::new());
        let mut manager = WorkflowManager::new(store.clone(), store.clone(), store, NoopListener);
        manager.add_workflow(self.workflow);

        let mut item = manager.create_item(self.entity)?;
        let mut steps = Vec::new();

        for name in names {
            let span = tracing::info_span!(
                "transit",
                { WORKFLOW_NAME } = %workflow_name,
                { WORKFLOW_TRANSITION } = %name,
                { WORKFLOW_ENTITY_ID } = %item.entity_id(),
                { WORKFLOW_STEP } = tracing::field::Empty,
                { WORKFLOW_SUCCESS } = tracing::field::Empty,
                { WORKFLOW_ERROR_COUNT } = tracing::field::Empty,
            );
            let _guard = span.enter();

            let mut handler = manager
                .handle(item, &name)
                .with_context(|| format!("Transition '{name}' can't be processed"))?
                .with_context(|| format!("No workflow supports this entity ({workflow_name})"))?;

            for (key, value) in &self.inputs {
                handler.context_mut().set_input(key.clone(), value.clone());
            }

            let mut form = InputForm::default();
            if !handler.validate(&mut form) {
                span.record(WORKFLOW_SUCCESS, false);
                steps.push(SimulationStep {
                    transition: name,
                    state: None,
                    errors: render_errors(handler.error_collection()),
                });
                return Ok((steps, handler.into_item()));
            }

            let state = handler.transit()?;
            let success = state.is_successful();
            span.record(WORKFLOW_STEP, state.step_name().unwrap_or_default());
            span.record(WORKFLOW_SUCCESS, success);
            span.record(
                WORKFLOW_ERROR_COUNT,
                handler.error_collection().count_errors() as u64,
            );

            steps.push(SimulationStep {
                transition: name,
                errors: render_errors(handler.error_collection()),
                state: Some(state),
            });
            item = handler.into_item();

            if !success {
                break;
            }
        }

        Ok((steps, item))
    }
}

/// Flatten an error collection into readable lines, nested entries indented.
pub fn render_errors(errors: &ErrorCollection) -> Vec<String> {
    fn walk(errors: &ErrorCollection, depth: usize, out: &mut Vec<String>) {
        for entry in errors {
            out.push(format!("{}{entry}", "  ".repeat(depth)));
            if let Some(nested) = &entry.nested {
                walk(nested, depth + 1, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(errors, 0, &mut out);
    out
}

/// Build the simulated entity.
pub fn entity(provider: &str, id: &str, properties: Vec<(String, Value)>) -> Entity {
    let properties: Map<String, Value> = properties.into_iter().collect();
    Entity::with_properties(EntityId::new(provider, id), properties)
}

pub fn print_simulation(steps: &[SimulationStep], item: &Item, json: bool, quiet: bool) -> Result<()> {
    if json {
        let out = json!({
            "entity": item.entity(),
            "current_step": item.current_step_name(),
            "steps": steps,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Transition").fg(Color::White),
        Cell::new("Step").fg(Color::White),
        Cell::new("Result").fg(Color::White),
        Cell::new("Errors").fg(Color::White),
    ]);

    for (index, step) in steps.iter().enumerate() {
        let (step_name, result) = match &step.state {
            Some(state) if state.is_successful() => (
                state.step_name().unwrap_or("-").to_string(),
                Cell::new("✓ success").fg(Color::Green),
            ),
            Some(state) => (
                state.step_name().unwrap_or("-").to_string(),
                Cell::new("✗ failed").fg(Color::Red),
            ),
            None => ("-".to_string(), Cell::new("✗ invalid input").fg(Color::Red)),
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&step.transition),
            Cell::new(step_name),
            result,
            Cell::new(step.errors.len()),
        ]);
    }

    println!();
    println!(
        "  {} Simulated {} for {}",
        style("*").green().bold(),
        style(item.workflow_name().unwrap_or("workflow")).cyan(),
        style(item.entity_id()).cyan()
    );
    println!();
    println!("{table}");

    for step in steps.iter().filter(|s| !s.errors.is_empty()) {
        println!();
        println!("  {} {}", style("Errors of").bold(), style(&step.transition).cyan());
        for line in &step.errors {
            println!("    {line}");
        }
    }

    println!();
    println!(
        "  Current step: {}",
        style(item.current_step_name().unwrap_or("(not started)")).bold()
    );
    println!();

    Ok(())
}

/// Fail the command if the last simulated transition did not succeed.
pub fn ensure_success(steps: &[SimulationStep]) -> Result<()> {
    match steps.last() {
        Some(SimulationStep {
            state: Some(state), ..
        }) if state.is_successful() => Ok(()),
        Some(step) => bail!("Transition '{}' failed", step.transition),
        None => Ok(()),
    }
}
