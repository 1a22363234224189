//! The multi-field ordering key for class members.
//!
//! A `SortKey` captures up to four facts about a declaration: its kind, its
//! visibility, whether it is static, and (for methods) the position of the
//! interface member it implements. Comparison is lexicographic over the
//! fields in that order; a field known on exactly one side makes the unknown
//! side compare greater, so unclassifiable members drift to the end without
//! ever blocking detection among their classifiable neighbors.

use std::cmp::Ordering;

use tree_sitter::Node;

use crate::syntax::{decl_name, has_modifier, modifiers, InterfaceSlot, SourceTree};

/// Declaration kinds in their required order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclarationKind {
    Constant,
    Field,
    Constructor,
    Destructor,
    Delegate,
    Event,
    Enum,
    Interface,
    Property,
    Indexer,
    Method,
    Struct,
    Class,
}

impl DeclarationKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeclarationKind::Constant => "Constant",
            DeclarationKind::Field => "Field",
            DeclarationKind::Constructor => "Constructor",
            DeclarationKind::Destructor => "Destructor",
            DeclarationKind::Delegate => "Delegate",
            DeclarationKind::Event => "Event",
            DeclarationKind::Enum => "Enum",
            DeclarationKind::Interface => "Interface",
            DeclarationKind::Property => "Property",
            DeclarationKind::Indexer => "Indexer",
            DeclarationKind::Method => "Method",
            DeclarationKind::Struct => "Struct",
            DeclarationKind::Class => "Class",
        }
    }
}

/// Visibility levels in their required order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Internal,
    ProtectedInternal,
    Protected,
    Private,
}

impl Visibility {
    pub fn label(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Internal => "Internal",
            Visibility::ProtectedInternal => "ProtectedInternal",
            Visibility::Protected => "Protected",
            Visibility::Private => "Private",
        }
    }
}

/// Static members sort before instance members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Staticness {
    Static,
    NonStatic,
}

impl Staticness {
    pub fn label(&self) -> &'static str {
        match self {
            Staticness::Static => "Static",
            Staticness::NonStatic => "NonStatic",
        }
    }
}

/// The ordering fingerprint of one class member.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub declaration: Option<DeclarationKind>,
    pub visibility: Option<Visibility>,
    pub staticness: Option<Staticness>,
    pub interface_slot: Option<usize>,
    slot_label: Option<String>,
}

/// Per-field comparison: `Some` decides the whole comparison, `None` means
/// tie, continue to the next field. A side missing the field compares
/// greater; a field missing on both sides decides equality outright (the
/// observed null-handling of the original comparator, preserved as-is).
fn cmp_field<T: Ord>(a: Option<&T>, b: Option<&T>) -> Option<Ordering> {
    match (a, b) {
        (None, Some(_)) => Some(Ordering::Greater),
        (Some(_), None) => Some(Ordering::Less),
        (None, None) => Some(Ordering::Equal),
        (Some(x), Some(y)) => match x.cmp(y) {
            Ordering::Equal => None,
            decided => Some(decided),
        },
    }
}

impl SortKey {
    /// Compute the key for a class member node.
    ///
    /// `slots` is the enclosing class's concatenated interface member list;
    /// a method gets the position of the first slot matching its name.
    pub fn for_member(st: &SourceTree, member: Node, slots: &[InterfaceSlot]) -> Self {
        let declaration = classify(st, member);
        let visibility = Some(visibility_of(st, member));
        let staticness = Some(if has_modifier(st, member, "static") {
            Staticness::Static
        } else {
            Staticness::NonStatic
        });

        let (interface_slot, slot_label) = if member.kind() == "method_declaration" {
            match decl_name(st, member)
                .and_then(|name| slots.iter().position(|s| s.member == name))
            {
                Some(index) => {
                    let slot = &slots[index];
                    (
                        Some(index),
                        Some(format!("{}.{}", slot.interface, slot.member)),
                    )
                }
                None => (None, None),
            }
        } else {
            (None, None)
        };

        Self {
            declaration,
            visibility,
            staticness,
            interface_slot,
            slot_label,
        }
    }

    /// A key built from known parts, for synthesized members.
    pub fn synthetic(
        declaration: DeclarationKind,
        visibility: Visibility,
        staticness: Staticness,
    ) -> Self {
        Self {
            declaration: Some(declaration),
            visibility: Some(visibility),
            staticness: Some(staticness),
            interface_slot: None,
            slot_label: None,
        }
    }

    /// Whether every classification field is known.
    ///
    /// The interface slot does not participate: a method that implements no
    /// interface member is still perfectly classifiable.
    pub fn is_known(&self) -> bool {
        self.declaration.is_some() && self.visibility.is_some() && self.staticness.is_some()
    }

    pub fn compare(&self, other: &SortKey) -> Ordering {
        cmp_field(self.declaration.as_ref(), other.declaration.as_ref())
            .or_else(|| cmp_field(self.visibility.as_ref(), other.visibility.as_ref()))
            .or_else(|| cmp_field(self.staticness.as_ref(), other.staticness.as_ref()))
            .or_else(|| cmp_field(self.interface_slot.as_ref(), other.interface_slot.as_ref()))
            .unwrap_or(Ordering::Equal)
    }

    /// Labels of the first field where the two keys differ, self first.
    pub fn explain(&self, other: &SortKey) -> Option<(String, String)> {
        if self.declaration != other.declaration {
            return Some((
                label_or(self.declaration.map(|d| d.label())),
                label_or(other.declaration.map(|d| d.label())),
            ));
        }
        if self.visibility != other.visibility {
            return Some((
                label_or(self.visibility.map(|v| v.label())),
                label_or(other.visibility.map(|v| v.label())),
            ));
        }
        if self.staticness != other.staticness {
            return Some((
                label_or(self.staticness.map(|s| s.label())),
                label_or(other.staticness.map(|s| s.label())),
            ));
        }
        if self.interface_slot != other.interface_slot {
            return Some((
                label_or(self.slot_label.as_deref()),
                label_or(other.slot_label.as_deref()),
            ));
        }
        None
    }
}

fn label_or(label: Option<&str>) -> String {
    label.unwrap_or("Unknown").to_string()
}

/// Single exhaustive mapping from tree-sitter node kinds to declaration
/// kinds. Anything unlisted (operators, conversion operators) stays unknown.
fn classify(st: &SourceTree, member: Node) -> Option<DeclarationKind> {
    match member.kind() {
        "field_declaration" => Some(if has_modifier(st, member, "const") {
            DeclarationKind::Constant
        } else {
            DeclarationKind::Field
        }),
        "constructor_declaration" => Some(DeclarationKind::Constructor),
        "destructor_declaration" => Some(DeclarationKind::Destructor),
        "delegate_declaration" => Some(DeclarationKind::Delegate),
        "event_declaration" | "event_field_declaration" => Some(DeclarationKind::Event),
        "enum_declaration" => Some(DeclarationKind::Enum),
        "interface_declaration" => Some(DeclarationKind::Interface),
        "property_declaration" => Some(DeclarationKind::Property),
        "indexer_declaration" => Some(DeclarationKind::Indexer),
        "method_declaration" => Some(DeclarationKind::Method),
        "struct_declaration" => Some(DeclarationKind::Struct),
        "class_declaration" => Some(DeclarationKind::Class),
        _ => None,
    }
}

fn visibility_of(st: &SourceTree, member: Node) -> Visibility {
    let mods = modifiers(st, member);
    if mods.contains(&"protected") && mods.contains(&"internal") {
        return Visibility::ProtectedInternal;
    }
    for m in mods {
        match m {
            "public" => return Visibility::Public,
            "internal" => return Visibility::Internal,
            "protected" => return Visibility::Protected,
            "private" => return Visibility::Private,
            _ => {}
        }
    }
    Visibility::Private
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{class_body, class_members, descendants, Semantics};

    fn member_keys(src: &str) -> Vec<SortKey> {
        let st = SourceTree::parse(src.to_string()).unwrap();
        let sem = Semantics::build([&st]);
        let class = descendants(st.root())
            .into_iter()
            .find(|n| n.kind() == "class_declaration")
            .unwrap();
        let slots = sem.interface_slots(&st, class);
        class_members(class_body(class).unwrap())
            .into_iter()
            .map(|m| SortKey::for_member(&st, m, &slots))
            .collect()
    }

    #[test]
    fn test_declaration_kind_precedence() {
        let keys = member_keys(
            "class C { public void M() {} const int K = 1; int f; public C() {} }",
        );
        assert_eq!(keys[0].declaration, Some(DeclarationKind::Method));
        assert_eq!(keys[1].declaration, Some(DeclarationKind::Constant));
        assert_eq!(keys[2].declaration, Some(DeclarationKind::Field));
        assert_eq!(keys[3].declaration, Some(DeclarationKind::Constructor));
        assert_eq!(keys[1].compare(&keys[2]), Ordering::Less);
        assert_eq!(keys[2].compare(&keys[3]), Ordering::Less);
        assert_eq!(keys[3].compare(&keys[0]), Ordering::Less);
    }

    #[test]
    fn test_visibility_defaults_to_private() {
        let keys = member_keys("class C { int f; public int g; }");
        assert_eq!(keys[0].visibility, Some(Visibility::Private));
        assert_eq!(keys[1].visibility, Some(Visibility::Public));
        assert_eq!(keys[1].compare(&keys[0]), Ordering::Less);
    }

    #[test]
    fn test_protected_internal_ranks_between() {
        let keys = member_keys(
            "class C { internal int a; protected internal int b; protected int c; }",
        );
        assert_eq!(keys[1].visibility, Some(Visibility::ProtectedInternal));
        assert_eq!(keys[0].compare(&keys[1]), Ordering::Less);
        assert_eq!(keys[1].compare(&keys[2]), Ordering::Less);
    }

    #[test]
    fn test_static_sorts_before_instance() {
        let keys = member_keys("class C { public void M() {} public static void S() {} }");
        assert_eq!(keys[1].compare(&keys[0]), Ordering::Less);
    }

    #[test]
    fn test_unknown_side_compares_greater() {
        // operator== has no declaration kind; every classified member wins.
        let keys = member_keys(
            "class C { public static bool operator ==(C a, C b) { return true; } public void M() {} }",
        );
        assert_eq!(keys[0].declaration, None);
        assert!(!keys[0].is_known());
        assert_eq!(keys[0].compare(&keys[1]), Ordering::Greater);
        assert_eq!(keys[1].compare(&keys[0]), Ordering::Less);
    }

    #[test]
    fn test_mutually_unknown_fields_compare_equal() {
        // Two operators: unknown kind on both sides ends the comparison.
        let keys = member_keys(
            "class C { public static bool operator ==(C a, C b) { return true; } public static bool operator !=(C a, C b) { return false; } }",
        );
        assert_eq!(keys[0].compare(&keys[1]), Ordering::Equal);
    }

    #[test]
    fn test_identical_keys_compare_equal() {
        let keys = member_keys("class C { int a; int b; }");
        assert_eq!(keys[0].compare(&keys[1]), Ordering::Equal);
        assert_eq!(keys[0].explain(&keys[1]), None);
    }

    #[test]
    fn test_interface_slot_ordering_and_unknown() {
        let keys = member_keys(
            r#"
interface ITest { void A(); void B(); }
class C : ITest
{
    public void B() {}
    public void A() {}
    public void Other() {}
}
"#,
        );
        assert_eq!(keys[0].interface_slot, Some(1));
        assert_eq!(keys[1].interface_slot, Some(0));
        assert_eq!(keys[2].interface_slot, None);
        assert_eq!(keys[1].compare(&keys[0]), Ordering::Less);
        // Non-implementing method sorts after implementing ones.
        assert_eq!(keys[2].compare(&keys[0]), Ordering::Greater);
    }

    #[test]
    fn test_explain_reports_first_differing_field() {
        let keys = member_keys("class C { private int f; public void M() {} }");
        let (a, b) = keys[1].explain(&keys[0]).unwrap();
        assert_eq!(a, "Method");
        assert_eq!(b, "Field");

        let keys = member_keys("class C { private int f; public int g; }");
        let (a, b) = keys[1].explain(&keys[0]).unwrap();
        assert_eq!(a, "Public");
        assert_eq!(b, "Private");
    }
}
