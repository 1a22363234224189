//! Syntax facade over the tree-sitter C# grammar.
//!
//! Everything the rules know about C# syntax goes through this module:
//! parsing, spans, node navigation, text edits, and the project-level
//! semantic queries (interface member tables, constant evaluation,
//! workspace-wide rename).

mod edit;
mod members;
mod parser;
mod semantics;
mod tree;

pub use edit::{apply_edits, TextEdit};
pub use members::{
    bare_type_name, base_list_types, block_body, class_body, class_members, decl_name,
    enum_member_value, find_enclosing, has_modifier, method_return_type, modifiers,
    parameter_list,
};
pub use parser::{language, parse};
pub use semantics::{constant_value, rename_identifier, InterfaceSlot, Semantics};
pub use tree::{descendants, SourceTree, Span};
