//! Span-based text edits.
//!
//! Rewrites are expressed as byte-range splices against the current source
//! text; the edited text is re-parsed into a fresh tree. This keeps trees
//! immutable snapshots and preserves all formatting outside the edits.

/// A single replacement of a byte range with new text.
#[derive(Debug, Clone)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    /// Replace the bytes in `[start, end)` with `text`.
    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Insert `text` at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

/// Apply a set of edits to `source`.
///
/// Replacement ranges must not overlap. Insertions at the same offset are
/// emitted in list order.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by_key(|&i| (edits[i].start, edits[i].end));

    let mut out = String::with_capacity(source.len() + 64);
    let mut pos = 0;
    for &i in &order {
        let edit = &edits[i];
        debug_assert!(edit.start >= pos, "overlapping text edits");
        let start = edit.start.max(pos);
        let end = edit.end.max(start);
        out.push_str(&source[pos..start]);
        out.push_str(&edit.text);
        pos = end;
    }
    out.push_str(&source[pos..]);
    out
}
