//! Command-line interface for structfix.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::engine::{OutputFormat, RunOptions, WorkspaceOrchestrator};
use crate::report;
use crate::workspace::Workspace;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_UNFIXABLE: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Structural lint and auto-fix for C# codebases.
///
/// Structfix analyzes the declaration structure of every source file in a
/// workspace, repeatedly fixes what it can until nothing is left to fix,
/// and asks for confirmation before writing the aggregated changes back.
#[derive(Parser)]
#[command(name = "structfix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the workspace (directory or single .cs file)
    pub path: Option<PathBuf>,

    /// Also run the workspace-wide injection pass for this type name
    #[arg(long, value_name = "TYPE")]
    pub inject: Option<String>,

    /// Path to a structfix.yaml configuration (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Apply changes without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Run the CLI. Returns the process exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    // No argument: a one-line usage hint, and a clean exit.
    let Some(path) = &cli.path else {
        println!("structfix <path to workspace>");
        return Ok(EXIT_SUCCESS);
    };

    let format = match cli.format.as_str() {
        "pretty" => OutputFormat::Pretty,
        "json" => OutputFormat::Json,
        other => {
            eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", other);
            return Ok(EXIT_ERROR);
        }
    };

    let config = match &cli.config {
        Some(explicit) => Config::parse_file(explicit)?,
        None => match Config::discover(path) {
            Some(discovered) => Config::parse_file(&discovered)?,
            None => Config::default(),
        },
    };

    let workspace = match Workspace::load(path, &config) {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let options = RunOptions {
        inject: cli.inject.clone(),
        assume_yes: cli.yes,
        format,
    };

    let orchestrator = WorkspaceOrchestrator::new(workspace, config);
    let summary = orchestrator.run(&options)?;

    match format {
        OutputFormat::Json => report::write_json(&path.to_string_lossy(), &summary)?,
        OutputFormat::Pretty => report::print_violations(&summary.remaining),
    }

    if summary.total_errors > 0 {
        Ok(EXIT_UNFIXABLE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
