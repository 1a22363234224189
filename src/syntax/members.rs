//! Node navigation helpers for C# declarations.
//!
//! The tree-sitter C# grammar exposes modifiers as `modifier` nodes and
//! declarations with a `name` field; everything else here navigates by node
//! kind so the helpers stay robust across grammar revisions.

use tree_sitter::Node;

use super::SourceTree;

/// Name of a declaration node (`class_declaration`, `method_declaration`, ...).
pub fn decl_name<'a>(st: &'a SourceTree, node: Node) -> Option<&'a str> {
    node.child_by_field_name("name").map(|n| st.node_text(n))
}

/// Modifier keywords of a declaration, in source order.
pub fn modifiers<'a>(st: &'a SourceTree, node: Node) -> Vec<&'a str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "modifier")
        .map(|c| st.node_text(c))
        .collect()
}

pub fn has_modifier(st: &SourceTree, node: Node, keyword: &str) -> bool {
    modifiers(st, node).iter().any(|m| *m == keyword)
}

/// The `declaration_list` body of a type declaration.
pub fn class_body(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| c.kind() == "declaration_list");
    result
}

/// Direct members of a type body, skipping comments and preprocessor lines.
pub fn class_members(body: Node) -> Vec<Node> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment" && !c.kind().starts_with("preproc"))
        .collect()
}

/// Types listed after the `:` of a type declaration.
pub fn base_list_types(node: Node) -> Vec<Node> {
    let base_list = {
        let mut cursor = node.walk();
        let result = node.children(&mut cursor).find(|c| c.kind() == "base_list");
        result
    };
    match base_list {
        Some(list) => {
            let mut cursor = list.walk();
            list.named_children(&mut cursor).collect()
        }
        None => Vec::new(),
    }
}

/// The bare identifier of a type reference: `IFoo` for `IFoo`,
/// `IFoo<Bar>`, and `Ns.IFoo` alike.
pub fn bare_type_name(st: &SourceTree, ty: Node) -> Option<String> {
    match ty.kind() {
        "identifier" => Some(st.node_text(ty).to_string()),
        "generic_name" => {
            let mut cursor = ty.walk();
            let result = ty
                .named_children(&mut cursor)
                .find(|c| c.kind() == "identifier")
                .map(|n| st.node_text(n).to_string());
            result
        }
        "qualified_name" => ty
            .child_by_field_name("name")
            .and_then(|n| bare_type_name(st, n)),
        _ => None,
    }
}

/// Nearest ancestor of the given kind, excluding the node itself.
pub fn find_enclosing<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// The `parameter_list` of a method or constructor.
pub fn parameter_list(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| c.kind() == "parameter_list");
    result
}

/// The `block` body of a method or constructor, if brace-bodied.
pub fn block_body(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).find(|c| c.kind() == "block");
    result
}

/// Explicit value expression of an enum member, if present.
pub fn enum_member_value(node: Node) -> Option<Node> {
    if let Some(value) = node.child_by_field_name("value") {
        return Some(value);
    }
    // Older grammar revisions leave the value unfielded after the name.
    let name = node.child_by_field_name("name")?;
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.start_byte() > name.end_byte())
        .last()
}

/// Return type of a method declaration: the last type-shaped named child
/// before the method name.
pub fn method_return_type(node: Node) -> Option<Node> {
    let name = node.child_by_field_name("name")?;
    let mut cursor = node.walk();
    let mut result = None;
    for child in node.named_children(&mut cursor) {
        if child.start_byte() >= name.start_byte() {
            break;
        }
        match child.kind() {
            "predefined_type" | "identifier" | "qualified_name" | "generic_name"
            | "nullable_type" | "array_type" | "tuple_type" => result = Some(child),
            _ => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceTree;

    fn parse(src: &str) -> SourceTree {
        SourceTree::parse(src.to_string()).unwrap()
    }

    fn first_of<'t>(st: &'t SourceTree, kind: &str) -> Node<'t> {
        crate::syntax::descendants(st.root())
            .into_iter()
            .find(|n| n.kind() == kind)
            .unwrap()
    }

    #[test]
    fn test_modifiers_and_name() {
        let st = parse("public static class Helpers {}");
        let class = first_of(&st, "class_declaration");
        assert_eq!(decl_name(&st, class), Some("Helpers"));
        assert_eq!(modifiers(&st, class), vec!["public", "static"]);
        assert!(has_modifier(&st, class, "static"));
        assert!(!has_modifier(&st, class, "sealed"));
    }

    #[test]
    fn test_class_members_skip_comments() {
        let st = parse("class C\n{\n    // note\n    int x;\n    void M() {}\n}\n");
        let class = first_of(&st, "class_declaration");
        let members = class_members(class_body(class).unwrap());
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].kind(), "field_declaration");
        assert_eq!(members[1].kind(), "method_declaration");
    }

    #[test]
    fn test_bare_type_name() {
        let st = parse("class C : IFoo, IBar<C> {}");
        let class = first_of(&st, "class_declaration");
        let bases = base_list_types(class);
        assert_eq!(bases.len(), 2);
        assert_eq!(bare_type_name(&st, bases[0]).as_deref(), Some("IFoo"));
        assert_eq!(bare_type_name(&st, bases[1]).as_deref(), Some("IBar"));
    }

    #[test]
    fn test_method_return_type() {
        let st = parse("class C { Task Run() { return null; } }");
        let method = first_of(&st, "method_declaration");
        let ret = method_return_type(method).unwrap();
        assert_eq!(st.node_text(ret), "Task");
    }
}
