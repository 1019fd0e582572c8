//! `waymark graph`: show the workflow graph of a definition.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use waymark_core::flow::Workflow;

#[derive(Debug, Serialize, PartialEq)]
pub struct EdgeView {
    pub transition: String,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StepView {
    pub name: String,
    pub label: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub transitions: Vec<EdgeView>,
}

#[derive(Debug, Serialize)]
pub struct GraphView {
    pub workflow: String,
    pub start_transition: Option<String>,
    pub start_step: Option<String>,
    pub steps: Vec<StepView>,
}

/// Collect the graph of `workflow`, steps in declaration order.
pub fn graph_view(workflow: &Workflow) -> GraphView {
    let start = workflow.start_transition().ok();

    let steps = workflow
        .steps()
        .iter()
        .map(|step| StepView {
            name: step.name().to_string(),
            label: step.label().to_string(),
            is_final: step.is_final(),
            transitions: step
                .allowed_transitions()
                .iter()
                .map(|name| EdgeView {
                    transition: name.clone(),
                    to: workflow
                        .transition(name)
                        .ok()
                        .and_then(|t| t.step_to())
                        .map(str::to_string),
                })
                .collect(),
        })
        .collect();

    GraphView {
        workflow: workflow.name().to_string(),
        start_transition: start.map(|t| t.name().to_string()),
        start_step: start.and_then(|t| t.step_to()).map(str::to_string),
        steps,
    }
}

pub fn print_graph(workflow: &Workflow, json: bool) -> Result<()> {
    let view = graph_view(workflow);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Step").fg(Color::White),
        Cell::new("Transition").fg(Color::White),
        Cell::new("Target").fg(Color::White),
    ]);

    for step in &view.steps {
        let name = if step.is_final {
            Cell::new(format!("{} (final)", step.name)).fg(Color::DarkGrey)
        } else {
            Cell::new(&step.name).fg(Color::Cyan)
        };

        if step.transitions.is_empty() {
            table.add_row(vec![name, Cell::new("-"), Cell::new("-")]);
            continue;
        }

        let mut name = Some(name);
        for edge in &step.transitions {
            table.add_row(vec![
                name.take().unwrap_or_else(|| Cell::new("")),
                Cell::new(&edge.transition),
                Cell::new(edge.to.as_deref().unwrap_or("?")),
            ]);
        }
    }

    println!();
    println!(
        "  {} Workflow '{}'",
        style("*").green().bold(),
        style(&view.workflow).cyan()
    );
    if let (Some(transition), Some(step)) = (&view.start_transition, &view.start_step) {
        println!("  Start: {transition} -> {step}");
    }
    println!();
    println!("{table}");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::flow::{Step, Transition};

    #[test]
    fn test_graph_view_lists_edges_per_step() {
        let mut workflow = Workflow::new("publishing");
        let mut draft = Step::new("draft").with_label("Draft");
        draft.add_allowed_transition("publish");
        let mut published = Step::new("published");
        published.set_final(true);
        workflow.add_step(draft).add_step(published);

        let mut create = Transition::new("create");
        create.set_step_to("draft");
        let mut publish = Transition::new("publish");
        publish.set_step_to("published");
        workflow
            .add_transition(create, true)
            .add_transition(publish, false);

        let view = graph_view(&workflow);
        assert_eq!(view.start_transition.as_deref(), Some("create"));
        assert_eq!(view.start_step.as_deref(), Some("draft"));
        assert_eq!(view.steps.len(), 2);
        assert_eq!(view.steps[0].label, "Draft");
        assert_eq!(
            view.steps[0].transitions,
            vec![EdgeView {
                transition: "publish".to_string(),
                to: Some("published".to_string()),
            }]
        );
        assert!(view.steps[1].is_final);
        assert!(view.steps[1].transitions.is_empty());
    }
}
