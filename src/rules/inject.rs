//! Dependency-injection rewrite: a class that invokes members directly on an
//! interface type is rewritten to hold a constructor-injected instance field.
//!
//! The transformation is applied atomically to one class: every matching
//! member-access receiver becomes the field identifier, a `private readonly`
//! field is inserted at its sorted position, and the constructor gains a
//! parameter and an assignment (or a public constructor is synthesized).

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::syntax::{
    apply_edits, bare_type_name, block_body, class_body, class_members, decl_name, descendants,
    find_enclosing, parameter_list, InterfaceSlot, Semantics, SourceTree, Span, TextEdit,
};

use super::sort_key::{DeclarationKind, SortKey, Staticness, Visibility};
use super::{FixOutcome, Rule, RuleCtx, RuleId, Violation};

/// Leading interface marker: a capital I followed by another capital.
static INTERFACE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new("^I[A-Z]").unwrap());

pub struct InjectRule;

impl Rule for InjectRule {
    fn id(&self) -> RuleId {
        RuleId::Inject
    }

    /// Interface members are instance members, so a member access whose
    /// receiver is a plain interface type name cannot be valid; each such
    /// receiver is reported at its own location.
    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation> {
        let mut violations = Vec::new();
        let accesses = ctx
            .tree
            .query_nodes("(member_access_expression) @access", "access")
            .unwrap_or_default();
        for access in accesses {
            let Some(receiver) = access.child_by_field_name("expression") else {
                continue;
            };
            if !matches!(receiver.kind(), "identifier" | "generic_name") {
                continue;
            }
            let Some(bare) = bare_type_name(ctx.tree, receiver) else {
                continue;
            };
            if !ctx.sem.is_interface(&bare) {
                continue;
            }
            if find_enclosing(receiver, "class_declaration").is_none() {
                continue;
            }
            let mut v = ctx.violation(
                RuleId::Inject,
                Span::from_node(receiver),
                format!("Interface '{}' accessed statically; inject an instance", bare),
            );
            v.args = vec![ctx.tree.node_text(receiver).to_string()];
            violations.push(v);
        }
        violations
    }

    fn fix(&self, ctx: &RuleCtx, violation: &Violation) -> Option<FixOutcome> {
        let root = ctx.tree.root();
        let receiver = root
            .named_descendant_for_byte_range(violation.span.start_byte, violation.span.end_byte)?;
        if !matches!(receiver.kind(), "identifier" | "generic_name") {
            return None;
        }
        let class = find_enclosing(receiver, "class_declaration")?;
        inject_into_class(ctx.tree, class, receiver, ctx.sem).map(FixOutcome::Document)
    }
}

/// Derive a variable name from a type name: strip the interface marker,
/// then lower-case the first character.
pub fn derive_variable_name(type_name: &str) -> String {
    let stripped = if INTERFACE_MARKER.is_match(type_name) {
        &type_name[1..]
    } else {
        type_name
    };
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply the injection transformation to one class, given one offending
/// receiver node inside it. Returns the rewritten document text, or `None`
/// when the rewrite does not apply (no matching receivers, expression-bodied
/// constructor).
pub(crate) fn inject_into_class(
    st: &SourceTree,
    class: Node,
    receiver: Node,
    sem: &Semantics,
) -> Option<String> {
    let type_text = st.node_text(receiver).trim().to_string();
    let bare = bare_type_name(st, receiver)?;
    let param_name = derive_variable_name(&bare);
    if param_name.is_empty() {
        return None;
    }
    let field_name = format!("_{}", param_name);

    let mut edits: Vec<TextEdit> = Vec::new();

    // Rewrite every matching receiver inside the class.
    for node in descendants(class) {
        if node.kind() != "member_access_expression" {
            continue;
        }
        let Some(r) = node.child_by_field_name("expression") else {
            continue;
        };
        if !matches!(r.kind(), "identifier" | "generic_name") {
            continue;
        }
        if bare_type_name(st, r).as_deref() == Some(bare.as_str()) {
            edits.push(TextEdit::replace(
                r.start_byte(),
                r.end_byte(),
                field_name.clone(),
            ));
        }
    }
    if edits.is_empty() {
        return None;
    }

    let body = class_body(class)?;
    let members = class_members(body);
    let member_indent = members
        .first()
        .map(|m| st.indent_at(m.start_byte()))
        .unwrap_or_else(|| format!("{}    ", st.indent_at(class.start_byte())));
    let slots = sem.interface_slots(st, class);

    // The new field, at its sorted position.
    let field_text = format!(
        "{member_indent}private readonly {type_text} {field_name};"
    );
    let field_key = SortKey::synthetic(
        DeclarationKind::Field,
        Visibility::Private,
        Staticness::NonStatic,
    );
    edits.push(insert_sorted(st, body, &members, &slots, &field_key, field_text));

    // Constructor: extend the existing one or synthesize a public one.
    let constructor = members
        .iter()
        .find(|m| m.kind() == "constructor_declaration")
        .copied();
    match constructor {
        Some(ctor) => {
            let params = parameter_list(ctor)?;
            let rparen = params.child(params.child_count().checked_sub(1)?)?;
            let parameter = if params.named_child_count() > 0 {
                format!(", {} {}", type_text, param_name)
            } else {
                format!("{} {}", type_text, param_name)
            };
            edits.push(TextEdit::insert(rparen.start_byte(), parameter));

            let block = block_body(ctor)?;
            let close = block.child(block.child_count().checked_sub(1)?)?;
            let ctor_indent = st.indent_at(ctor.start_byte());
            let assignment = format!("{} = {};", field_name, param_name);
            let before = &st.text()[..close.start_byte()];
            let line_tail = before.rsplit('\n').next().unwrap_or("");
            let text = if line_tail.trim().is_empty() && before.contains('\n') {
                format!("    {assignment}\n{ctor_indent}")
            } else {
                format!("\n{ctor_indent}    {assignment}\n{ctor_indent}")
            };
            edits.push(TextEdit::insert(close.start_byte(), text));
        }
        None => {
            let class_name = decl_name(st, class)?;
            let ctor_text = format!(
                "{i}public {cls}({ty} {param})\n{i}{{\n{i}    {field} = {param};\n{i}}}",
                i = member_indent,
                cls = class_name,
                ty = type_text,
                param = param_name,
                field = field_name,
            );
            let ctor_key = SortKey::synthetic(
                DeclarationKind::Constructor,
                Visibility::Public,
                Staticness::NonStatic,
            );
            edits.push(insert_sorted(st, body, &members, &slots, &ctor_key, ctor_text));
        }
    }

    Some(apply_edits(st.text(), &edits))
}

/// Insertion edit for a synthesized member at its sorted position: before
/// the first existing member whose key is not less than the new key, or at
/// the end of the body. A blank separator line is kept away from equal-key
/// neighbors so field blocks stay dense.
fn insert_sorted(
    st: &SourceTree,
    body: Node,
    members: &[Node],
    slots: &[InterfaceSlot],
    key: &SortKey,
    text: String,
) -> TextEdit {
    for member in members {
        let member_key = SortKey::for_member(st, *member, slots);
        match member_key.compare(key) {
            Ordering::Less => continue,
            Ordering::Equal => {
                let at = st.line_start(member.start_byte());
                return TextEdit::insert(at, format!("{}\n", text));
            }
            Ordering::Greater => {
                let at = st.line_start(member.start_byte());
                return TextEdit::insert(at, format!("{}\n\n", text));
            }
        }
    }
    let close = body
        .child(body.child_count() - 1)
        .expect("declaration body has a closing brace");
    let at = st.line_start(close.start_byte());
    TextEdit::insert(at, format!("\n{}\n", text))
}

/// One-pass workspace rewrite: inject `type_name` into every class in the
/// document that uses it as a member-access receiver. Loops within the
/// document until it is clean (one class at a time, re-parsing between),
/// which the receiver replacement guarantees terminates.
pub fn batch_inject_document(
    tree: &SourceTree,
    type_name: &str,
    sem: &Semantics,
) -> Option<String> {
    let mut current = tree.clone();
    let mut changed = false;
    loop {
        let Some((start, end)) = find_trigger(&current, type_name) else {
            break;
        };
        let root = current.root();
        let receiver = root.named_descendant_for_byte_range(start, end)?;
        let class = find_enclosing(receiver, "class_declaration")?;
        let next = inject_into_class(&current, class, receiver, sem)?;
        current = SourceTree::parse(next).ok()?;
        changed = true;
    }
    changed.then(|| current.text().to_string())
}

/// Byte range of the first member-access receiver naming `type_name` inside
/// a class.
fn find_trigger(st: &SourceTree, type_name: &str) -> Option<(usize, usize)> {
    for node in descendants(st.root()) {
        if node.kind() != "member_access_expression" {
            continue;
        }
        let Some(r) = node.child_by_field_name("expression") else {
            continue;
        };
        if !matches!(r.kind(), "identifier" | "generic_name") {
            continue;
        }
        if bare_type_name(st, r).as_deref() != Some(type_name) {
            continue;
        }
        if find_enclosing(r, "class_declaration").is_none() {
            continue;
        }
        return Some((r.start_byte(), r.end_byte()));
    }
    None
}
