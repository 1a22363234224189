//! Brace insertion: every `if`/`else` branch body must be a block.

use tree_sitter::Node;

use crate::syntax::{apply_edits, Span, TextEdit};

use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

pub struct BracesRule;

impl Rule for BracesRule {
    fn id(&self) -> RuleId {
        RuleId::Braces
    }

    /// Flags non-block branch bodies. An `else if` chain is left alone; only
    /// its leaf branches are checked.
    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let ifs = ctx
            .tree
            .query_nodes("(if_statement) @if", "if")
            .unwrap_or_default();
        for if_node in ifs {
            if let Some(consequence) = consequence_of(if_node) {
                if consequence.kind() != "block" {
                    violations.push(ctx.violation(
                        RuleId::Braces,
                        Span::from_node(consequence),
                        "Missing braces",
                    ));
                }
            }
            if let Some(alternative) = alternative_of(if_node) {
                if alternative.kind() != "block" && alternative.kind() != "if_statement" {
                    violations.push(ctx.violation(
                        RuleId::Braces,
                        Span::from_node(alternative),
                        "Missing braces",
                    ));
                }
            }
        }
        violations
    }

    /// Wraps the offending statement in a block on its own lines, indented
    /// from the `if`/`else` line.
    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let stmt = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        let parent = stmt.parent()?;

        let (anchor, region_start) = match parent.kind() {
            "if_statement" => {
                if consequence_of(parent).map(|c| c.id()) == Some(stmt.id()) {
                    // Region starts after the condition's closing paren.
                    let rparen = {
                        let mut cursor = parent.walk();
                        let found = parent.children(&mut cursor).find(|c| c.kind() == ")");
                        found?
                    };
                    (parent, rparen.end_byte())
                } else {
                    // An alternative attached straight to the if statement.
                    let else_kw = {
                        let mut cursor = parent.walk();
                        let found = parent.children(&mut cursor).find(|c| c.kind() == "else");
                        found?
                    };
                    (parent, else_kw.end_byte())
                }
            }
            "else_clause" => {
                let else_kw = {
                    let mut cursor = parent.walk();
                    let found = parent.children(&mut cursor).find(|c| c.kind() == "else");
                    found?
                };
                (parent, else_kw.end_byte())
            }
            _ => return None,
        };

        let indent = ctx.tree.indent_at(anchor.start_byte());
        let stmt_text = ctx.tree.node_text(stmt);
        let replacement = format!(
            "\n{indent}{{\n{indent}    {stmt}\n{indent}}}",
            indent = indent,
            stmt = stmt_text
        );
        let edit = TextEdit::replace(region_start, stmt.end_byte(), replacement);
        Some(FixOutcome::Document(apply_edits(ctx.tree.text(), &[edit])))
    }
}

fn consequence_of(if_node: Node) -> Option<Node> {
    if let Some(consequence) = if_node.child_by_field_name("consequence") {
        return Some(consequence);
    }
    // Fallback: the first named child after the closing paren.
    let mut cursor = if_node.walk();
    let mut past_rparen = false;
    for child in if_node.children(&mut cursor) {
        if child.kind() == ")" {
            past_rparen = true;
            continue;
        }
        if past_rparen && child.is_named() && child.kind() != "comment" {
            return Some(child);
        }
    }
    None
}

fn alternative_of(if_node: Node) -> Option<Node> {
    let else_clause = {
        let mut cursor = if_node.walk();
        let found = if_node
            .children(&mut cursor)
            .find(|c| c.kind() == "else_clause");
        found
    };
    let else_clause = match else_clause {
        Some(e) => e,
        None => if_node.child_by_field_name("alternative")?,
    };
    if else_clause.kind() == "else_clause" {
        let mut cursor = else_clause.walk();
        let found = else_clause
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment");
        found
    } else {
        Some(else_clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Semantics, SourceTree};

    fn run_rule(src: &str) -> (Vec<Violation>, Option<String>) {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let sem = Semantics::empty();
        let ctx = RuleCtx {
            tree: &st,
            file: "Test0.cs",
            sem: &sem,
        };
        let violations = BracesRule.analyze(&ctx);
        let fixed = violations.first().and_then(|v| match BracesRule.fix(&ctx, v) {
            Some(FixOutcome::Document(text)) => Some(text),
            _ => None,
        });
        (violations, fixed)
    }

    #[test]
    fn test_block_bodies_are_clean() {
        let (violations, _) = run_rule(
            "class C { void M() { if (true) { return; } else { return; } } }",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_wraps_bare_if_body() {
        let src = "class C\n{\n    void M()\n    {\n        if (true) return;\n    }\n}\n";
        let (violations, fixed) = run_rule(src);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            fixed.unwrap(),
            "class C\n{\n    void M()\n    {\n        if (true)\n        {\n            return;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_wraps_bare_else_body() {
        let src =
            "class C\n{\n    void M()\n    {\n        if (true) { return; }\n        else Run();\n    }\n}\n";
        let (violations, fixed) = run_rule(src);
        assert_eq!(violations.len(), 1);
        let fixed = fixed.unwrap();
        assert!(fixed.contains("else\n        {\n            Run();\n        }"));
    }

    #[test]
    fn test_else_if_chain_not_double_wrapped() {
        let (violations, _) = run_rule(
            "class C { void M() { if (a) { Run(); } else if (b) { Run(); } } }",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_else_if_leaf_branches_still_checked() {
        let (violations, _) =
            run_rule("class C { void M() { if (a) { Run(); } else if (b) Run(); } }");
        assert_eq!(violations.len(), 1);
    }
}
