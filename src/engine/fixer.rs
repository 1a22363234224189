//! Per-document fix application.

use crate::rules::{FixOutcome, RuleCtx, RuleSet, Violation};
use crate::syntax::{Semantics, SourceTree};
use crate::workspace::Document;

/// The result of one fixer application.
pub enum AppliedFix {
    /// A replacement document.
    Document(Document),
    /// A workspace-scoped rename; the driver applies it to every document.
    Workspace { old: String, new: String },
}

/// Applies the first available fix for a document's diagnostics.
///
/// Only one edit is applied per document per pass: tree edits to one
/// document cannot be safely composed without re-parsing in between, so the
/// driver re-analyzes before the next fix.
pub struct DocumentFixer<'a> {
    rules: &'a RuleSet,
}

impl<'a> DocumentFixer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Take the first diagnostic a registered fixer can address, run that
    /// fixer, and re-parse. Unfixable diagnostics (advisory rules, syntax
    /// errors) are skipped so they never block later fixable ones.
    pub fn fix_first(
        &self,
        document: &Document,
        diagnostics: &[&Violation],
        sem: &Semantics,
    ) -> Option<AppliedFix> {
        let first = diagnostics.iter().find(|v| {
            self.rules
                .get(v.rule)
                .map(|r| r.fixable())
                .unwrap_or(false)
        })?;
        let rule = self.rules.get(first.rule)?;
        let ctx = RuleCtx {
            tree: &document.tree,
            file: &document.rel,
            sem,
        };
        match rule.fix(&ctx, first)? {
            FixOutcome::Document(text) => {
                if text == document.text() {
                    return None;
                }
                let tree = SourceTree::parse(text).ok()?;
                Some(AppliedFix::Document(document.with_tree(tree)))
            }
            FixOutcome::Rename { old, new } => Some(AppliedFix::Workspace { old, new }),
        }
    }
}
