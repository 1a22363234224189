//! Structfix - structural lint and auto-fix for C# codebases.
//!
//! Structfix inspects the declaration structure of C# source files, reports
//! structural violations (member ordering, enum value completeness, missing
//! braces, async naming, dependency-injection anti-patterns, test structure),
//! and rewrites the offending source until no fixable violations remain.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis and rewriting:
//!
//! - `syntax`: parse trees, spans, text edits, and project-level semantics
//! - `rules`: the rule contract plus the seven concrete rules
//! - `engine`: per-document fixing, per-project convergence, orchestration
//! - `workspace`: the workspace/project/document model and atomic commit
//! - `config`: YAML run configuration
//! - `report`: output formatting (colored text, JSON)
//!
//! # Adding a New Rule
//!
//! Implement the `rules::Rule` trait and register it in `rules::RuleSet::all`.

pub mod cli;
pub mod config;
pub mod engine;
pub mod report;
pub mod rules;
pub mod syntax;
pub mod workspace;

pub use config::Config;
pub use engine::{ConvergenceDriver, ProjectOutcome, ProjectStatus, WorkspaceOrchestrator};
pub use rules::{FixOutcome, Rule, RuleCtx, RuleId, RuleSet, Severity, Violation};
pub use syntax::{Semantics, SourceTree, Span};
pub use workspace::{Document, Project, Workspace};
