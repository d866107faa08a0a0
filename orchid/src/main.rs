//! `orchid`: validate workflow definitions, inspect state documents and
//! select the transition a node takes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use orchid::exit_codes;
use orchid::io::config::{EngineConfig, load_config};
use orchid::io::definition_store::load_state;
use orchid::logging;
use orchid::select::{SelectOutcome, StepInputs, select_from_files};
use orchid::validate::{ValidateOutcome, validate_workflow};

#[derive(Parser)]
#[command(
    name = "orchid",
    version,
    about = "Workflow DAG validation and rule selection"
)]
struct Cli {
    /// Engine configuration file; defaults apply when it is missing.
    #[arg(long, global = true, default_value = "orchid.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a workflow definition and print every structural violation.
    Validate {
        /// Workflow definition (JSON).
        workflow: PathBuf,
    },
    /// Validate a document against a schema and print the value at a path.
    State {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        document: PathBuf,
        /// Path expression such as `.order.items[0]`; whole document by default.
        #[arg(long, default_value = ".")]
        path: String,
    },
    /// Print the transition the node takes for the given document.
    Step {
        #[arg(long)]
        workflow: PathBuf,
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        document: PathBuf,
        #[arg(long, default_value = "start")]
        node: String,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    debug!(?config, "loaded config");
    match cli.command {
        Command::Validate { workflow } => cmd_validate(&workflow, &config),
        Command::State {
            schema,
            document,
            path,
        } => cmd_state(&schema, &document, &path, &config),
        Command::Step {
            workflow,
            schema,
            document,
            node,
        } => cmd_step(
            StepInputs {
                workflow: &workflow,
                schema: &schema,
                document: &document,
            },
            &node,
            &config,
        ),
    }
}

fn cmd_validate(workflow: &Path, config: &EngineConfig) -> Result<i32> {
    match validate_workflow(workflow, config)? {
        ValidateOutcome::Valid { .. } => {
            println!("ok");
            Ok(exit_codes::OK)
        }
        ValidateOutcome::Invalid { violations } => {
            for violation in &violations {
                println!("{violation}");
            }
            Ok(exit_codes::INVALID)
        }
    }
}

fn cmd_state(schema: &Path, document: &Path, path: &str, config: &EngineConfig) -> Result<i32> {
    let state = load_state(schema, document, &config.schema)?;
    let value = state
        .value_at_path(path)
        .with_context(|| format!("read path '{path}'"))?;
    let rendered = serde_json::to_string_pretty(&value).context("serialize value")?;
    println!("{rendered}");
    Ok(exit_codes::OK)
}

fn cmd_step(inputs: StepInputs<'_>, node: &str, config: &EngineConfig) -> Result<i32> {
    match select_from_files(inputs, node, config)? {
        SelectOutcome::Fired(transition) => {
            println!("{transition}");
            Ok(exit_codes::OK)
        }
        SelectOutcome::Unhandled => {
            eprintln!("no rule fired in node '{node}'");
            Ok(exit_codes::UNHANDLED)
        }
    }
}
