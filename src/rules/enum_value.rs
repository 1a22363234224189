//! Enum value fill: every enum member gets an explicit value.

use tree_sitter::Node;

use crate::syntax::{
    apply_edits, constant_value, descendants, enum_member_value, find_enclosing, Span, TextEdit,
};

use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

pub struct EnumValueRule;

impl Rule for EnumValueRule {
    fn id(&self) -> RuleId {
        RuleId::EnumValue
    }

    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let enums = ctx
            .tree
            .query_nodes("(enum_declaration) @enum", "enum")
            .unwrap_or_default();
        for decl in enums {
            let has_missing = enum_members(decl)
                .iter()
                .any(|m| enum_member_value(*m).is_none());
            if has_missing {
                violations.push(ctx.violation(
                    RuleId::EnumValue,
                    Span::from_node(decl),
                    "Missing enum value",
                ));
            }
        }
        violations
    }

    /// Assign sequential values starting at 1, resuming after any member
    /// with an explicit constant (`next = value + 1`).
    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let node = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        let decl = if node.kind() == "enum_declaration" {
            node
        } else {
            find_enclosing(node, "enum_declaration")?
        };

        let mut next = 1i64;
        let mut edits = Vec::new();
        for member in enum_members(decl) {
            match enum_member_value(member) {
                None => {
                    let name = member.child_by_field_name("name")?;
                    edits.push(TextEdit::insert(name.end_byte(), format!(" = {}", next)));
                    next += 1;
                }
                Some(value) => {
                    if let Some(v) = constant_value(ctx.tree, value) {
                        next = v + 1;
                    }
                }
            }
        }
        if edits.is_empty() {
            return None;
        }
        Some(FixOutcome::Document(apply_edits(ctx.tree.text(), &edits)))
    }
}

fn enum_members(decl: Node) -> Vec<Node> {
    descendants(decl)
        .into_iter()
        .filter(|n| n.kind() == "enum_member_declaration")
        .collect()
}
