//! The fixing pipeline: per-document fixing, per-project convergence, and
//! workspace orchestration.

mod convergence;
mod fixer;
mod orchestrator;

pub use convergence::{ConvergenceDriver, ProjectOutcome, ProjectStatus};
pub use fixer::{AppliedFix, DocumentFixer};
pub use orchestrator::{OutputFormat, RunOptions, RunSummary, WorkspaceOrchestrator};
