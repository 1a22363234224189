//! Project-level semantic facts.
//!
//! A `Semantics` value is built once per analysis pass from the project's
//! current trees. It answers the queries the rules need beyond a single
//! document: which names are interfaces, which members those interfaces
//! declare (and in what order), integer constant values, and workspace-wide
//! identifier rename.

use std::collections::HashMap;

use regex::Regex;
use tree_sitter::Node;

use super::{base_list_types, bare_type_name, class_body, class_members, decl_name, descendants,
    SourceTree};

/// One position in the concatenated interface member list of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSlot {
    pub interface: String,
    pub member: String,
}

/// Semantic facts for one project snapshot.
#[derive(Debug, Default)]
pub struct Semantics {
    /// Interface name -> member names in declaration order.
    interfaces: HashMap<String, Vec<String>>,
}

impl Semantics {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build facts from every tree in a project.
    pub fn build<'a>(trees: impl IntoIterator<Item = &'a SourceTree>) -> Self {
        let mut interfaces = HashMap::new();
        for st in trees {
            for node in descendants(st.root()) {
                if node.kind() != "interface_declaration" {
                    continue;
                }
                let Some(name) = decl_name(st, node) else {
                    continue;
                };
                let members = match class_body(node) {
                    Some(body) => class_members(body)
                        .into_iter()
                        .filter_map(|m| decl_name(st, m))
                        .map(|n| n.to_string())
                        .collect(),
                    None => Vec::new(),
                };
                interfaces.insert(name.to_string(), members);
            }
        }
        Self { interfaces }
    }

    /// Whether `name` is an interface declared in the project.
    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// The ordered interface member slots of a class: interfaces in base-list
    /// order, members in declaration order within each interface.
    pub fn interface_slots(&self, st: &SourceTree, class_node: Node) -> Vec<InterfaceSlot> {
        let mut slots = Vec::new();
        for ty in base_list_types(class_node) {
            let Some(name) = bare_type_name(st, ty) else {
                continue;
            };
            if let Some(members) = self.interfaces.get(&name) {
                for member in members {
                    slots.push(InterfaceSlot {
                        interface: name.clone(),
                        member: member.clone(),
                    });
                }
            }
        }
        slots
    }
}

/// Evaluate an integer constant expression, if it is one.
///
/// Handles decimal and hex literals (with `_` separators and integer
/// suffixes), unary minus, and parenthesized expressions.
pub fn constant_value(st: &SourceTree, expr: Node) -> Option<i64> {
    match expr.kind() {
        "integer_literal" => {
            let text: String = st
                .node_text(expr)
                .chars()
                .filter(|c| *c != '_')
                .collect();
            let text = text.trim_end_matches(['u', 'U', 'l', 'L']);
            if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                i64::from_str_radix(hex, 16).ok()
            } else {
                text.parse().ok()
            }
        }
        "prefix_unary_expression" => {
            let op = expr.child(0)?;
            if st.node_text(op) != "-" {
                return None;
            }
            let inner = expr.named_child(0)?;
            constant_value(st, inner).map(|v| -v)
        }
        "parenthesized_expression" => {
            let inner = expr.named_child(0)?;
            constant_value(st, inner)
        }
        _ => None,
    }
}

/// Rename an identifier everywhere it occurs as a whole word.
///
/// This is the textual stand-in for a semantic workspace rename; callers
/// apply it to every document of the project.
pub fn rename_identifier(text: &str, old: &str, new: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(old));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, new).into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceTree {
        SourceTree::parse(src.to_string()).unwrap()
    }

    #[test]
    fn test_interface_table() {
        let st = parse(
            r#"
interface ITest
{
    void A();
    void B();
}

interface ITest2
{
    void C();
}
"#,
        );
        let sem = Semantics::build([&st]);
        assert!(sem.is_interface("ITest"));
        assert!(sem.is_interface("ITest2"));
        assert!(!sem.is_interface("Test"));
    }

    #[test]
    fn test_interface_slots_follow_base_list_order() {
        let st = parse(
            r#"
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
"#,
        );
        let sem = Semantics::build([&st]);
        let class = descendants(st.root())
            .into_iter()
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        let slots = sem.interface_slots(&st, class);
        let names: Vec<&str> = slots.iter().map(|s| s.member.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_constant_value() {
        let st = parse("enum E { A = 4, B = 0x10, C = -2 }");
        let values: Vec<Option<i64>> = descendants(st.root())
            .into_iter()
            .filter(|n| n.kind() == "enum_member_declaration")
            .map(|m| crate::syntax::enum_member_value(m).and_then(|v| constant_value(&st, v)))
            .collect();
        assert_eq!(values, vec![Some(4), Some(16), Some(-2)]);
    }

    #[test]
    fn test_rename_identifier_whole_word() {
        let renamed = rename_identifier("Run(); RunAll(); x.Run()", "Run", "RunAsync");
        assert_eq!(renamed, "RunAsync(); RunAll(); x.RunAsync()");
    }
}
