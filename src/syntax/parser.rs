//! Tree-sitter parser construction for C#.

use tree_sitter::{Language, Parser, Tree};

/// The C# grammar.
pub fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse C# source into a tree-sitter tree.
///
/// Partial parse errors are still returned as a valid tree with ERROR nodes;
/// a `None` from tree-sitter (wrong language, cancelled) is an error here.
pub fn parse(text: &str) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&language())?;
    parser
        .parse(text, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
}
