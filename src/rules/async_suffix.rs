//! Async naming: methods returning a task-like type end in `Async`.

use tree_sitter::Node;

use crate::syntax::{decl_name, method_return_type, Span, SourceTree};

use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

/// Task-like return types, matched by simple name.
static TASK_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "Task",
    "ValueTask",
};

const SUFFIX: &str = "Async";

pub struct AsyncSuffixRule;

impl Rule for AsyncSuffixRule {
    fn id(&self) -> RuleId {
        RuleId::AsyncSuffix
    }

    /// A mismatch in either direction is flagged; the conventional entry
    /// point is exempt.
    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let methods = ctx
            .tree
            .query_nodes("(method_declaration) @method", "method")
            .unwrap_or_default();
        for method in methods {
            let Some(name) = decl_name(ctx.tree, method) else {
                continue;
            };
            if name == "Main" {
                continue;
            }
            let returns_task = method_return_type(method)
                .map(|ty| is_task_type(ctx.tree, ty))
                .unwrap_or(false);
            if returns_task != name.ends_with(SUFFIX) {
                let mut v = ctx.violation(
                    RuleId::AsyncSuffix,
                    Span::from_node(method),
                    "Invalid Async suffix",
                );
                v.args = vec![name.to_string()];
                violations.push(v);
            }
        }
        violations
    }

    /// Renaming only the declaration would break every call site, so the fix
    /// is a workspace-wide rename request; the driver applies it to the
    /// whole project and re-scopes its re-analysis accordingly.
    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let method = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        if method.kind() != "method_declaration" {
            return None;
        }
        let name = decl_name(ctx.tree, method)?;
        let returns_task = method_return_type(method)
            .map(|ty| is_task_type(ctx.tree, ty))
            .unwrap_or(false);
        let new_name = if returns_task {
            format!("{}{}", name, SUFFIX)
        } else {
            name.strip_suffix(SUFFIX)?.to_string()
        };
        if new_name.is_empty() || new_name == name {
            return None;
        }
        Some(FixOutcome::Rename {
            old: name.to_string(),
            new: new_name,
        })
    }
}

/// Simple-name match against the task type set; qualified names are matched
/// on their rightmost segment, generic instantiations on their identifier.
fn is_task_type(st: &SourceTree, ty: Node) -> bool {
    match ty.kind() {
        "identifier" => TASK_TYPES.contains(st.node_text(ty)),
        "generic_name" => {
            let mut cursor = ty.walk();
            let result = ty
                .named_children(&mut cursor)
                .find(|c| c.kind() == "identifier")
                .map(|n| TASK_TYPES.contains(st.node_text(n)))
                .unwrap_or(false);
            result
        }
        "qualified_name" => ty
            .child_by_field_name("name")
            .map(|n| is_task_type(st, n))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Semantics;

    fn analyze(src: &str) -> Vec<Violation> {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let sem = Semantics::empty();
        let ctx = RuleCtx {
            tree: &st,
            file: "Test0.cs",
            sem: &sem,
        };
        AsyncSuffixRule.analyze(&ctx)
    }

    fn fix_first(src: &str) -> Option<FixOutcome> {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let sem = Semantics::empty();
        let ctx = RuleCtx {
            tree: &st,
            file: "Test0.cs",
            sem: &sem,
        };
        let violations = AsyncSuffixRule.analyze(&ctx);
        AsyncSuffixRule.fix(&ctx, violations.first()?)
    }

    #[test]
    fn test_task_method_without_suffix_is_flagged() {
        let violations = analyze("class C { Task Run() { return null; } }");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].args, vec!["Run"]);
    }

    #[test]
    fn test_suffixed_task_method_is_clean() {
        assert!(analyze("class C { Task RunAsync() { return null; } }").is_empty());
        assert!(analyze("class C { Task<int> CountAsync() { return null; } }").is_empty());
        assert!(
            analyze("class C { System.Threading.Tasks.Task RunAsync() { return null; } }")
                .is_empty()
        );
    }

    #[test]
    fn test_suffix_on_non_task_method_is_flagged() {
        let violations = analyze("class C { void RunAsync() {} }");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_entry_point_is_exempt() {
        assert!(analyze("class Program { static Task Main() { return null; } }").is_empty());
    }

    #[test]
    fn test_fix_requests_workspace_rename() {
        match fix_first("class C { Task Run() { return null; } }") {
            Some(FixOutcome::Rename { old, new }) => {
                assert_eq!(old, "Run");
                assert_eq!(new, "RunAsync");
            }
            other => panic!("expected rename, got {:?}", other),
        }

        match fix_first("class C { void RunAsync() {} }") {
            Some(FixOutcome::Rename { old, new }) => {
                assert_eq!(old, "RunAsync");
                assert_eq!(new, "Run");
            }
            other => panic!("expected rename, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_suffix_name_declines() {
        // "Async" on a void method would rename to the empty string.
        assert!(fix_first("class C { void Async() {} }").is_none());
    }
}
