//! `waymark check`: parse and validate workflow definitions.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use waymark_core::definition::discover_definitions;

use super::definition;

/// Summary of one checked definition.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub name: String,
    pub steps: usize,
    pub transitions: usize,
    pub start_transition: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Check a single file.
pub fn check_file(path: &Path, strict: bool, json: bool, quiet: bool) -> Result<()> {
    let report = report_for(path, strict);
    let valid = report.valid;
    print_reports(std::slice::from_ref(&report), json, quiet)?;

    if !valid {
        bail!(
            "{}",
            report.error.unwrap_or_else(|| "definition is invalid".to_string())
        );
    }
    Ok(())
}

/// Check every definition in `dir`. Files which fail to parse are skipped by
/// discovery and reported in the log.
pub fn check_dir(dir: &Path, strict: bool, json: bool, quiet: bool) -> Result<()> {
    let reports: Vec<CheckReport> = discover_definitions(dir)?
        .into_iter()
        .map(|(path, def)| match definition::build(def.clone(), strict) {
            Ok(_) => summary(path, &def, None),
            Err(e) => summary(path, &def, Some(format!("{e:#}"))),
        })
        .collect();

    if reports.is_empty() && !json && !quiet {
        println!();
        println!(
            "  No workflow definitions found in {}",
            style(dir.display()).cyan()
        );
        println!();
        return Ok(());
    }

    print_reports(&reports, json, quiet)?;

    let invalid = reports.iter().filter(|r| !r.valid).count();
    if invalid > 0 {
        bail!("{invalid} of {} definitions are invalid", reports.len());
    }
    Ok(())
}

fn report_for(path: &Path, strict: bool) -> CheckReport {
    match definition::load(path, strict) {
        Ok(loaded) => summary(path.to_path_buf(), &loaded.definition, None),
        Err(e) => CheckReport {
            path: path.to_path_buf(),
            name: String::new(),
            steps: 0,
            transitions: 0,
            start_transition: String::new(),
            valid: false,
            error: Some(format!("{e:#}")),
        },
    }
}

fn summary(
    path: PathBuf,
    def: &waymark_core::definition::WorkflowDefinition,
    error: Option<String>,
) -> CheckReport {
    CheckReport {
        path,
        name: def.name.clone(),
        steps: def.steps.len(),
        transitions: def.transitions.len(),
        start_transition: def.start_transition.clone(),
        valid: error.is_none(),
        error,
    }
}

fn print_reports(reports: &[CheckReport], json: bool, quiet: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Workflow").fg(Color::White),
        Cell::new("File").fg(Color::White),
        Cell::new("Steps").fg(Color::White),
        Cell::new("Transitions").fg(Color::White),
        Cell::new("Start").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for report in reports {
        let status = if report.valid {
            Cell::new("✓ valid").fg(Color::Green)
        } else {
            Cell::new("✗ invalid").fg(Color::Red)
        };

        table.add_row(vec![
            Cell::new(&report.name),
            Cell::new(report.path.display()),
            Cell::new(report.steps),
            Cell::new(report.transitions),
            Cell::new(&report.start_transition),
            status,
        ]);
    }

    println!();
    println!("{table}");

    for report in reports.iter().filter(|r| !r.valid) {
        if let Some(error) = &report.error {
            println!(
                "  {} {}: {}",
                style("✗").red().bold(),
                report.path.display(),
                error
            );
        }
    }
    println!();

    Ok(())
}
