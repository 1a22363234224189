//! Workspace orchestration: the outer driver that loads a workspace, runs
//! the optional injection batch pass, converges every project, and commits
//! the aggregated change set.

use std::io::{self, BufRead, Write};

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::report;
use crate::rules::{batch_inject_document, RuleSet, Violation};
use crate::syntax::{Semantics, SourceTree};
use crate::workspace::{Project, Workspace};

use super::convergence::{ConvergenceDriver, ProjectOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Type name for the workspace-wide injection batch pass.
    pub inject: Option<String>,
    /// Skip the commit confirmation.
    pub assume_yes: bool,
    pub format: OutputFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            inject: None,
            assume_yes: false,
            format: OutputFormat::Pretty,
        }
    }
}

pub struct RunSummary {
    pub outcomes: Vec<(String, ProjectOutcome)>,
    /// Diagnostics remaining after convergence, across all projects.
    pub remaining: Vec<Violation>,
    pub total_fixes: usize,
    pub total_errors: usize,
    pub changed_files: usize,
    pub committed: bool,
}

pub struct WorkspaceOrchestrator {
    workspace: Workspace,
    rules: RuleSet,
    config: Config,
}

impl WorkspaceOrchestrator {
    pub fn new(workspace: Workspace, config: Config) -> Self {
        Self {
            workspace,
            rules: RuleSet::all(),
            config,
        }
    }

    pub fn run(&self, options: &RunOptions) -> anyhow::Result<RunSummary> {
        let pretty = options.format == OutputFormat::Pretty;
        let mut projects: Vec<Project> = self.workspace.projects.clone();

        // Workspace-wide mechanical rewrite; one pass per document, with a
        // percentage-and-filename progress line.
        if let Some(type_name) = &options.inject {
            self.run_injection_pass(&mut projects, type_name, pretty)?;
        }

        let driver = ConvergenceDriver::new(&self.rules, &self.config);
        let mut outcomes = Vec::new();
        let mut converged = Vec::new();

        for project in projects {
            if pretty {
                print!("Analyzing project {}", project.name);
                io::stdout().flush().ok();
            }
            let (fixed, outcome) = driver.converge(project, |_| {
                if pretty {
                    print!(".");
                    io::stdout().flush().ok();
                }
            });
            if pretty {
                report::print_project_summary(&outcome);
            }
            outcomes.push((fixed.name.clone(), outcome));
            converged.push(fixed);
        }

        // Remaining diagnostics, for the report.
        let mut remaining = Vec::new();
        for project in &converged {
            let sem = Semantics::build(project.documents.iter().map(|d| &d.tree));
            remaining.extend(driver.analyze_project(project, &sem));
        }

        let total_fixes: usize = outcomes.iter().map(|(_, o)| o.fixes).sum();
        let total_errors: usize = outcomes.iter().map(|(_, o)| o.errors).sum();

        let changed = self.workspace.changed_documents(&converged);
        let mut committed = false;
        if !changed.is_empty() {
            let confirmed = options.assume_yes || (pretty && confirm_commit(changed.len())?);
            if confirmed {
                self.workspace.commit(&changed)?;
                committed = true;
            }
        }

        Ok(RunSummary {
            outcomes,
            remaining,
            total_fixes,
            total_errors,
            changed_files: changed.len(),
            committed,
        })
    }

    fn run_injection_pass(
        &self,
        projects: &mut [Project],
        type_name: &str,
        pretty: bool,
    ) -> anyhow::Result<()> {
        let total: usize = projects.iter().map(|p| p.documents.len()).sum();
        let bar = if pretty {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(ProgressStyle::with_template("{percent:>3}% {msg}")?);
            bar
        } else {
            ProgressBar::hidden()
        };

        for project in projects.iter_mut() {
            let sem = Semantics::build(project.documents.iter().map(|d| &d.tree));
            for document in project.documents.iter_mut() {
                bar.set_message(document.rel.clone());
                if let Some(text) = batch_inject_document(&document.tree, type_name, &sem) {
                    if let Ok(tree) = SourceTree::parse(text) {
                        let updated = document.with_tree(tree);
                        *document = updated;
                    }
                }
                bar.inc(1);
            }
        }
        bar.finish_and_clear();
        Ok(())
    }
}

fn confirm_commit(changes: usize) -> anyhow::Result<bool> {
    println!("Apply {} changes? (y/n)", changes);
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "y")
}
