//! Output formatting for structfix results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::engine::{ProjectOutcome, ProjectStatus, RunSummary};
use crate::rules::{Severity, Violation};

/// Per-project summary line, colored like the convergence console output.
pub fn print_project_summary(outcome: &ProjectOutcome) {
    if outcome.errors > 0 {
        println!(" {}", format!("{} UNFIXABLE ERRORS", outcome.errors).red());
    } else if outcome.fixes > 0 {
        println!(" {}", format!("FIXED {} ERRORS", outcome.fixes).green());
    } else {
        println!(" {}", "NO ERRORS FOUND".yellow());
    }
}

/// List the diagnostics remaining after convergence.
pub fn print_violations(violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    println!();
    println!("  {} ({}):", "Remaining".bold(), violations.len());
    println!();
    for v in violations {
        match v.severity {
            Severity::Error => print!("    {} ", "ERROR".red()),
            Severity::Warning => print!("    {} ", "WARN ".yellow()),
        }
        print!("{:<18}", v.rule.as_str().dimmed());
        print!("{}", v.file.blue());
        println!("{}", format!(":{}", v.span.start_line).dimmed());
        println!("            {}", v.message);
    }
    println!();
}

// =============================================================================
// JSON format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub workspace: String,
    pub projects: Vec<JsonProject>,
    pub violations: Vec<JsonViolation>,
    pub total_fixes: usize,
    pub total_errors: usize,
    pub changed_files: usize,
    pub committed: bool,
}

#[derive(Serialize, Deserialize)]
pub struct JsonProject {
    pub name: String,
    pub fixes: usize,
    pub errors: usize,
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonViolation {
    pub rule: String,
    pub code: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub message: String,
}

fn violation_to_json(v: &Violation) -> JsonViolation {
    JsonViolation {
        rule: v.rule.as_str().to_string(),
        code: v.rule.code().to_string(),
        severity: v.severity.to_string(),
        file: v.file.clone(),
        line: v.span.start_line,
        message: v.message.clone(),
    }
}

/// Write the whole run as JSON on stdout.
pub fn write_json(workspace: &str, summary: &RunSummary) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        workspace: workspace.to_string(),
        projects: summary
            .outcomes
            .iter()
            .map(|(name, outcome)| JsonProject {
                name: name.clone(),
                fixes: outcome.fixes,
                errors: outcome.errors,
                status: match outcome.status {
                    ProjectStatus::Done => "done".to_string(),
                    ProjectStatus::StalledWithErrors => "stalled_with_errors".to_string(),
                },
            })
            .collect(),
        violations: summary.remaining.iter().map(violation_to_json).collect(),
        total_fixes: summary.total_fixes,
        total_errors: summary.total_errors,
        changed_files: summary.changed_files,
        committed: summary.committed,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}
