//! Advisory rule: enum members must not carry the value zero.
//!
//! Zero is the default for an uninitialized enum field in C#, so a zero
//! member makes "unset" and "set to this member" indistinguishable. There
//! is no mechanical fix; the rule only reports.

use crate::syntax::{constant_value, descendants, enum_member_value, Span};

use super::{Rule, RuleCtx, RuleId, Violation};

pub struct EnumWithoutZeroRule;

impl Rule for EnumWithoutZeroRule {
    fn id(&self) -> RuleId {
        RuleId::EnumWithoutZero
    }

    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let enums = ctx
            .tree
            .query_nodes("(enum_declaration) @enum", "enum")
            .unwrap_or_default();
        for decl in enums {
            let has_zero = descendants(decl)
                .into_iter()
                .filter(|n| n.kind() == "enum_member_declaration")
                .filter_map(enum_member_value)
                .filter_map(|v| constant_value(ctx.tree, v))
                .any(|v| v == 0);
            if has_zero {
                violations.push(ctx.violation(
                    RuleId::EnumWithoutZero,
                    Span::from_node(decl),
                    "Enum value must not be zero",
                ));
            }
        }
        violations
    }

    fn fixable(&self) -> bool {
        false
    }
}
