//! Waymark CLI entry point.
//!
//! Binary name: `waymark`
//!
//! Parses CLI arguments, loads the config, sets up tracing and dispatches to
//! the command handlers.

mod cli;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use waymark_infra::config::{load_config, resolve_definitions_dir};
use waymark_observe::tracing_setup::{init_tracing, log_filter, shutdown_tracing};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or tracing
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "waymark", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref());

    let filter = log_filter(cli.quiet, cli.verbose, &config.log_filter);
    init_tracing(config.enable_otel, &filter)
        .map_err(|e| anyhow!("Failed to set up tracing: {e}"))?;

    let strict = config.strict_definitions;
    let result = match cli.command {
        Commands::Check { file: Some(file) } => {
            cli::check::check_file(&file, strict, cli.json, cli.quiet)
        }
        Commands::Check { file: None } => {
            let dir = resolve_definitions_dir(&config, cli.config.as_deref());
            cli::check::check_dir(&dir, strict, cli.json, cli.quiet)
        }

        Commands::Graph { file } => cli::definition::load(&file, strict)
            .and_then(|loaded| cli::graph::print_graph(&loaded.workflow, cli.json)),

        Commands::Simulate {
            file,
            transitions,
            properties,
            inputs,
            id,
            provider,
        } => cli::definition::load(&file, strict).and_then(|loaded| {
            let provider = provider
                .or(loaded.definition.provider)
                .unwrap_or_else(|| "entity".to_string());

            let simulation = cli::simulate::Simulation {
                workflow: loaded.workflow,
                entity: cli::simulate::entity(&provider, &id, properties),
                transitions,
                inputs,
            };
            let (steps, item) = simulation.run()?;
            cli::simulate::print_simulation(&steps, &item, cli.json, cli.quiet)?;
            cli::simulate::ensure_success(&steps)
        }),

        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
