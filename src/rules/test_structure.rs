//! Test structure: attributed test methods must run through the test harness.

use tree_sitter::Node;

use crate::syntax::{apply_edits, block_body, Span, SourceTree, TextEdit};

use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

/// Attribute names that mark a method as a test.
static TEST_ATTRIBUTES: phf::Set<&'static str> = phf::phf_set! {
    "Test",
    "TestCase",
    "TestCaseSource",
};

const HARNESS_CALL: &str = "Tester.Run(s => s);";

pub struct TestStructureRule;

impl Rule for TestStructureRule {
    fn id(&self) -> RuleId {
        RuleId::TestStructure
    }

    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let methods = ctx
            .tree
            .query_nodes("(method_declaration) @method", "method")
            .unwrap_or_default();
        for method in methods {
            if !has_test_attribute(ctx.tree, method) {
                continue;
            }
            let Some(body) = block_body(method) else {
                continue;
            };
            let mut cursor = body.walk();
            let has_harness_call = body
                .named_children(&mut cursor)
                .any(|stmt| is_tester_run_statement(ctx.tree, stmt));
            if !has_harness_call {
                violations.push(ctx.violation(
                    RuleId::TestStructure,
                    Span::from_node(method),
                    "Should use Tester.Run(...)",
                ));
            }
        }
        violations
    }

    /// Appends a stub harness invocation as the last statement of the body.
    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let method = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        if method.kind() != "method_declaration" {
            return None;
        }
        let body = block_body(method)?;
        let close = body.child(body.child_count().checked_sub(1)?)?;
        if close.kind() != "}" {
            return None;
        }
        let indent = ctx.tree.indent_at(method.start_byte());
        // When the closing brace sits on its own line the insertion continues
        // that line's indentation; otherwise it first breaks the line.
        let before = &ctx.tree.text()[..close.start_byte()];
        let line_tail = before.rsplit('\n').next().unwrap_or("");
        let text = if line_tail.trim().is_empty() && before.contains('\n') {
            format!("    {HARNESS_CALL}\n{indent}")
        } else {
            format!("\n{indent}    {HARNESS_CALL}\n{indent}")
        };
        let edit = TextEdit::insert(close.start_byte(), text);
        Some(FixOutcome::Document(apply_edits(ctx.tree.text(), &[edit])))
    }
}

fn has_test_attribute(st: &SourceTree, method: Node) -> bool {
    let mut cursor = method.walk();
    for child in method.children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut inner = child.walk();
        for attr in child.named_children(&mut inner) {
            if attr.kind() != "attribute" {
                continue;
            }
            let name = attr
                .child_by_field_name("name")
                .map(|n| st.node_text(n))
                .unwrap_or("");
            if TEST_ATTRIBUTES.contains(name) {
                return true;
            }
        }
    }
    false
}

/// Matches `Tester.Run(...)` as a bare expression statement.
fn is_tester_run_statement(st: &SourceTree, stmt: Node) -> bool {
    if stmt.kind() != "expression_statement" {
        return false;
    }
    let Some(invocation) = stmt.named_child(0) else {
        return false;
    };
    if invocation.kind() != "invocation_expression" {
        return false;
    }
    let Some(function) = invocation.child_by_field_name("function") else {
        return false;
    };
    if function.kind() != "member_access_expression" {
        return false;
    }
    let name = function
        .child_by_field_name("name")
        .map(|n| st.node_text(n))
        .unwrap_or("");
    let receiver = function
        .child_by_field_name("expression")
        .map(|n| st.node_text(n))
        .unwrap_or("");
    name == "Run" && receiver == "Tester"
}
