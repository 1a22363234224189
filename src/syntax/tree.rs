//! Immutable source snapshots and spans.

use std::fmt;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use super::parser;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Immutable snapshot of a source unit: the text and its parse tree.
///
/// A fix never mutates a tree in place; it produces new text which is parsed
/// into a fresh `SourceTree`.
#[derive(Clone)]
pub struct SourceTree {
    text: String,
    tree: Tree,
}

impl SourceTree {
    /// Parse source text into a snapshot.
    pub fn parse(text: String) -> anyhow::Result<Self> {
        let tree = parser::parse(&text)?;
        Ok(Self { text, tree })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        &self.text[node.start_byte()..node.end_byte()]
    }

    /// Whether the parse tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Span of the first ERROR/MISSING node, if any.
    pub fn first_error_span(&self) -> Option<Span> {
        descendants(self.root())
            .into_iter()
            .find(|n| n.is_error() || n.is_missing())
            .map(Span::from_node)
    }

    /// Byte offset of the first character of the line containing `byte`.
    pub fn line_start(&self, byte: usize) -> usize {
        self.text[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Leading whitespace of the line containing `byte`.
    pub fn indent_at(&self, byte: usize) -> String {
        let start = self.line_start(byte);
        self.text[start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Run a tree-sitter query and collect the nodes of one capture,
    /// in source order.
    pub fn query_nodes(&self, query_src: &str, capture: &str) -> anyhow::Result<Vec<Node<'_>>> {
        let query = Query::new(&parser::language(), query_src)?;
        let index = query
            .capture_index_for_name(capture)
            .ok_or_else(|| anyhow::anyhow!("unknown capture {:?}", capture))?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.root(), self.text.as_bytes());

        let mut nodes = Vec::new();
        while let Some(m) = matches.next() {
            for cap in m.captures {
                if cap.index == index {
                    nodes.push(cap.node);
                }
            }
        }
        nodes.sort_by_key(|n| n.start_byte());
        Ok(nodes)
    }
}

/// Collect a node and all its descendants in preorder.
pub fn descendants(node: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        out.push(n);
        let mut cursor = n.walk();
        let children: Vec<_> = n.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    out
}
