//! The per-project fixed-point loop.
//!
//! Each pass analyzes the whole project, then applies at most one fix per
//! document against the pass-start diagnostics. A fix in one document
//! becomes visible to the others on the next full pass. The loop ends when
//! a pass applies nothing: `Done` with zero remaining errors, otherwise
//! `StalledWithErrors`.

use rayon::prelude::*;

use crate::config::Config;
use crate::rules::{RuleCtx, RuleSet, Severity, Violation};
use crate::syntax::{rename_identifier, Semantics, SourceTree};
use crate::workspace::Project;

use super::fixer::{AppliedFix, DocumentFixer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// A full pass produced zero appliable edits and no errors remain.
    Done,
    /// Error-severity diagnostics remain that no registered fixer addresses.
    StalledWithErrors,
}

#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub fixes: usize,
    pub errors: usize,
    pub status: ProjectStatus,
}

pub struct ConvergenceDriver<'a> {
    rules: &'a RuleSet,
    config: &'a Config,
}

impl<'a> ConvergenceDriver<'a> {
    pub fn new(rules: &'a RuleSet, config: &'a Config) -> Self {
        Self { rules, config }
    }

    /// Analyze the whole project with every enabled rule.
    ///
    /// Documents are analyzed in parallel (analysis has no ordering
    /// dependency); the result keeps document order, and diagnostics within
    /// a document are span-ordered.
    pub fn analyze_project(&self, project: &Project, sem: &Semantics) -> Vec<Violation> {
        project
            .documents
            .par_iter()
            .map(|document| {
                let ctx = RuleCtx {
                    tree: &document.tree,
                    file: &document.rel,
                    sem,
                };
                self.rules.analyze_document(&ctx, self.config)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Drive the project to its fixed point. `on_fix` is called once per
    /// applied fix with the document's relative path.
    pub fn converge(
        &self,
        mut project: Project,
        mut on_fix: impl FnMut(&str),
    ) -> (Project, ProjectOutcome) {
        let fixer = DocumentFixer::new(self.rules);
        let mut total_fixes = 0;

        loop {
            let sem = Semantics::build(project.documents.iter().map(|d| &d.tree));
            let diagnostics = self.analyze_project(&project, &sem);
            let errors = diagnostics
                .iter()
                .filter(|v| v.severity == Severity::Error)
                .count();

            let mut documents = project.documents.clone();
            let mut applied = 0;
            let mut rename: Option<(String, String)> = None;

            for (index, document) in project.documents.iter().enumerate() {
                let doc_diags: Vec<&Violation> = diagnostics
                    .iter()
                    .filter(|v| v.file == document.rel)
                    .collect();
                if doc_diags.is_empty() {
                    continue;
                }
                match fixer.fix_first(document, &doc_diags, &sem) {
                    Some(AppliedFix::Document(fixed)) => {
                        documents[index] = fixed;
                        applied += 1;
                        on_fix(&document.rel);
                    }
                    Some(AppliedFix::Workspace { old, new }) => {
                        rename = Some((old, new));
                        applied += 1;
                        on_fix(&document.rel);
                        // A workspace-scoped edit invalidates the remaining
                        // pass-start diagnostics; end the pass here.
                        break;
                    }
                    None => {}
                }
            }

            if let Some((old, new)) = rename {
                for document in documents.iter_mut() {
                    let renamed = rename_identifier(document.text(), &old, &new);
                    if renamed != document.text() {
                        if let Ok(tree) = SourceTree::parse(renamed) {
                            let updated = document.with_tree(tree);
                            *document = updated;
                        }
                    }
                }
            }

            if applied == 0 {
                let status = if errors > 0 {
                    ProjectStatus::StalledWithErrors
                } else {
                    ProjectStatus::Done
                };
                return (
                    project,
                    ProjectOutcome {
                        fixes: total_fixes,
                        errors,
                        status,
                    },
                );
            }

            total_fixes += applied;
            project = Project {
                name: project.name,
                documents,
            };
        }
    }
}
