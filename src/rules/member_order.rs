//! Declaration-order rule: members of a class must follow the canonical
//! kind/visibility/staticness/interface-slot order.

use std::cmp::Ordering;

use tree_sitter::Node;

use crate::syntax::{class_body, class_members, find_enclosing, SourceTree, Span, TextEdit};
use crate::syntax::{apply_edits, Semantics};

use super::sort_key::{DeclarationKind, SortKey};
use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

pub struct MemberOrderRule;

impl Rule for MemberOrderRule {
    fn id(&self) -> RuleId {
        RuleId::MemberOrder
    }

    /// Adjacent-pair scan down each class's member list. A pair is reported
    /// when the later key is strictly less than the earlier one and both
    /// keys are known; unknown member kinds neither report nor block their
    /// neighbors.
    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let classes = ctx
            .tree
            .query_nodes("(class_declaration) @class", "class")
            .unwrap_or_default();

        for class in classes {
            let Some(body) = class_body(class) else {
                continue;
            };
            let slots = ctx.sem.interface_slots(ctx.tree, class);
            let mut prev: Option<SortKey> = None;
            for member in class_members(body) {
                let key = SortKey::for_member(ctx.tree, member, &slots);
                if let Some(prev_key) = &prev {
                    if prev_key.is_known()
                        && key.is_known()
                        && key.compare(prev_key) == Ordering::Less
                    {
                        let (first, second) = key
                            .explain(prev_key)
                            .unwrap_or_else(|| (String::new(), String::new()));
                        let mut v = ctx.violation(
                            RuleId::MemberOrder,
                            Span::from_node(member),
                            format!("{} should be declared before {}", first, second),
                        );
                        v.args = vec![first, second];
                        violations.push(v);
                    }
                }
                prev = Some(key);
            }
        }
        violations
    }

    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let member = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        let class = find_enclosing(member, "class_declaration")?;
        reorder_class(ctx.tree, class, ctx.sem).map(FixOutcome::Document)
    }
}

/// Re-emit a class with its members stably sorted by SortKey.
///
/// Each member travels as a chunk: every line after the previous member
/// (comments included, leading blank lines dropped) through the member's
/// last byte. Blank lines between chunks are regenerated by policy: one
/// before any member that is not a constant/field/property, or whenever
/// adjacent keys differ; equal-key field blocks stay dense.
pub(crate) fn reorder_class(
    st: &SourceTree,
    class: Node,
    sem: &Semantics,
) -> Option<String> {
    let body = class_body(class)?;
    let members = class_members(body);
    if members.len() < 2 {
        return None;
    }

    let src = st.text();
    let slots = sem.interface_slots(st, class);
    let open_brace_end = body.start_byte() + 1;

    struct Chunk {
        start: usize,
        end: usize,
        key: SortKey,
        order: usize,
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut prev_end = open_brace_end;
    for (order, member) in members.iter().enumerate() {
        let key = SortKey::for_member(st, *member, &slots);
        let start = chunk_start(src, member.start_byte(), prev_end);
        chunks.push(Chunk {
            start,
            end: member.end_byte(),
            key,
            order,
        });
        prev_end = member.end_byte();
    }

    let region_start = chunks.first()?.start;
    let region_end = chunks.last()?.end;

    let mut sorted: Vec<&Chunk> = chunks.iter().collect();
    sorted.sort_by(|a, b| a.key.compare(&b.key).then(a.order.cmp(&b.order)));

    let mut out = String::new();
    let mut prev_key: Option<&SortKey> = None;
    for (i, chunk) in sorted.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if needs_blank_line(&chunk.key, prev_key) {
                out.push('\n');
            }
        }
        out.push_str(&src[chunk.start..chunk.end]);
        prev_key = Some(&chunk.key);
    }

    if out == src[region_start..region_end] {
        return None;
    }
    let edit = TextEdit::replace(region_start, region_end, out);
    Some(apply_edits(src, &[edit]))
}

/// Start of a member's chunk: the first non-blank line after the previous
/// member's end. Comment lines above the member move with it.
fn chunk_start(src: &str, member_start: usize, prev_end: usize) -> usize {
    let member_line = src[..member_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if member_line <= prev_end {
        // Shares a line with the previous member or the opening brace.
        return member_start;
    }
    let mut pos = src[prev_end..]
        .find('\n')
        .map(|i| prev_end + i + 1)
        .unwrap_or(src.len());
    while pos < member_line {
        let line_end = src[pos..].find('\n').map(|i| pos + i).unwrap_or(src.len());
        if src[pos..line_end].trim().is_empty() {
            pos = line_end + 1;
        } else {
            break;
        }
    }
    pos.min(member_line)
}

fn needs_blank_line(current: &SortKey, prev: Option<&SortKey>) -> bool {
    let Some(prev) = prev else {
        return false;
    };
    match current.declaration {
        Some(DeclarationKind::Constant)
        | Some(DeclarationKind::Field)
        | Some(DeclarationKind::Property) => {}
        _ => return true,
    }
    current.compare(prev) != Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::{RuleSet, Severity};
    use crate::syntax::{decl_name, descendants, Semantics};

    fn analyze(src: &str) -> (SourceTree, Vec<Violation>) {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let sem = Semantics::build([&st]);
        let ctx = RuleCtx {
            tree: &st,
            file: "Test0.cs",
            sem: &sem,
        };
        let violations = MemberOrderRule.analyze(&ctx);
        (st, violations)
    }

    fn fix_to_convergence(src: &str) -> String {
        let rules = RuleSet::all();
        let config = Config::default();
        let mut text = src.to_string();
        for _ in 0..32 {
            let st = SourceTree::parse(text.clone()).unwrap();
            let sem = Semantics::build([&st]);
            let ctx = RuleCtx {
                tree: &st,
                file: "Test0.cs",
                sem: &sem,
            };
            let violations = rules.analyze_document(&ctx, &config);
            let Some(first) = violations
                .iter()
                .find(|v| v.rule == RuleId::MemberOrder)
            else {
                break;
            };
            match MemberOrderRule.fix(&ctx, first) {
                Some(FixOutcome::Document(next)) => text = next,
                _ => break,
            }
        }
        text
    }

    /// Member names of the first class, in source order after parsing `src`.
    fn member_names(src: &str) -> Vec<String> {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let class = descendants(st.root())
            .into_iter()
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        class_members(class_body(class).unwrap())
            .into_iter()
            .map(|m| match m.kind() {
                // fields and operators have no name field; use the first line
                "field_declaration" | "operator_declaration" => {
                    st.node_text(m).lines().next().unwrap_or("").trim().to_string()
                }
                _ => decl_name(&st, m).unwrap_or("").to_string(),
            })
            .collect()
    }

    #[test]
    fn test_no_diagnostics_when_empty() {
        let (_, violations) = analyze("");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_sorted_class_is_clean() {
        let (_, violations) = analyze(
            r#"
class C
{
    const int K = 1;

    int f;

    public C() {}

    public void M() {}
}
"#,
        );
        assert!(violations.is_empty());
    }

    const UNSORTED: &str = r#"
namespace Demo
{
    public class TestClass
    {
        public class SubClass {}

        private string PrivateProperty { get; }
        internal string InternalProperty { get; }

        int nonConstField;
        int anotherNonConstField;
        const int constField = 1;

        public static bool operator ==(TestClass p1, TestClass p2) {
            return true;
        }

        // Keep comment
        protected TestClass() {}

        public TestClass(string title, string details) {}

        public void Method() {}
        public static void StaticMethod() {}
        public static void AnotherStaticMethod() {}
    }
}
"#;

    #[test]
    fn test_reports_each_adjacent_regression() {
        let (_, violations) = analyze(UNSORTED);
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Property should be declared before Class",
                "Internal should be declared before Private",
                "Field should be declared before Property",
                "Constant should be declared before Field",
                "Public should be declared before Protected",
                "Static should be declared before NonStatic",
            ]
        );
        assert!(violations.iter().all(|v| v.severity == Severity::Warning));
    }

    #[test]
    fn test_fix_reaches_canonical_order() {
        let fixed = fix_to_convergence(UNSORTED);
        let names = member_names(&fixed);
        assert_eq!(
            names,
            vec![
                "const int constField = 1;",
                "int nonConstField;",
                "int anotherNonConstField;",
                "TestClass", // public ctor
                "TestClass", // protected ctor
                "InternalProperty",
                "PrivateProperty",
                "StaticMethod",
                "AnotherStaticMethod",
                "Method",
                "SubClass",
                "public static bool operator ==(TestClass p1, TestClass p2) {",
            ]
        );
        // The comment stays attached to the protected constructor.
        let protected = fixed.find("protected TestClass").unwrap();
        let comment = fixed.find("// Keep comment").unwrap();
        assert!(comment < protected);
        assert!(fixed[comment..protected].trim_start_matches("// Keep comment").trim().is_empty());
        // Already-sorted output yields no further violations.
        let (_, violations) = analyze(&fixed);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_fix_is_idempotent() {
        let fixed = fix_to_convergence(UNSORTED);
        let st = SourceTree::parse(fixed.clone()).unwrap();
        let sem = Semantics::build([&st]);
        let class = descendants(st.root())
            .into_iter()
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        assert_eq!(reorder_class(&st, class, &sem), None);
    }

    #[test]
    fn test_fix_exact_output_small_class() {
        let src = "class C\n{\n    public void M() {}\n    const int K = 1;\n}\n";
        let fixed = fix_to_convergence(src);
        assert_eq!(
            fixed,
            "class C\n{\n    const int K = 1;\n\n    public void M() {}\n}\n"
        );
    }

    #[test]
    fn test_equal_key_fields_stay_dense() {
        let src = "class C\n{\n    public void M() {}\n    int a;\n    int b;\n}\n";
        let fixed = fix_to_convergence(src);
        assert_eq!(
            fixed,
            "class C\n{\n    int a;\n    int b;\n\n    public void M() {}\n}\n"
        );
    }

    #[test]
    fn test_interface_implementations_sort_by_slot() {
        let src = r#"
interface ITest
{
    void A();
    void B();
}

interface ITest2
{
    void C();
}

class Test : ITest, ITest2
{
    public void C() {}
    public void B() {}
    public void A() {}
}
"#;
        let (_, violations) = analyze(src);
        assert_eq!(violations.len(), 2);
        let fixed = fix_to_convergence(src);
        let names = member_names(&fixed);
        assert_eq!(names, vec!["A", "B", "C"]);
        let (_, violations) = analyze(&fixed);
        assert!(violations.is_empty());
    }
}
