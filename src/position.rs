//! Caret position to control mapping
//!
//! [`find_control_at`] does not test containment. It picks the latest
//! control-bearing node that starts at or before the caret: first the last
//! line with any node at or before the caret line, then, within that line
//! only, the last node whose column is at or before the caret column. When
//! every node on that line starts right of the caret the result is `None`,
//! even if earlier lines hold nodes.
//!
//! A node's column is that of its opening `<`. Hosts that report the column
//! of the element name are one to the right.

use crate::document::parser::{NodeId, ParsedDocument, SourcePosition};

/// The control-bearing node "under" a 1-based caret position.
pub fn find_control_at(doc: &ParsedDocument, line: u32, column: u32) -> Option<NodeId> {
    let preceding: Vec<(NodeId, SourcePosition)> = doc
        .all_controls()
        .into_iter()
        .filter_map(|node| doc.position(node).map(|pos| (node, pos)))
        .take_while(|(_, pos)| pos.line <= line)
        .collect();

    let last_line = preceding.last()?.1.line;

    preceding
        .into_iter()
        .filter(|(_, pos)| pos.line == last_line)
        .take_while(|(_, pos)| pos.column <= column)
        .last()
        .map(|(node, _)| node)
}

/// Source position of a node, or `(-1, -1)` when it has none.
pub fn source_position(doc: &ParsedDocument, node: NodeId) -> (i64, i64) {
    match doc.position(node) {
        Some(pos) => (i64::from(pos.line), i64::from(pos.column)),
        None => (-1, -1),
    }
}

/// Convert a byte offset to a 1-based line/column (columns count characters).
pub fn offset_to_position(source: &str, offset: usize) -> SourcePosition {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    SourcePosition::new(line, col)
}

/// Convert a 1-based line/column back to a byte offset.
///
/// Positions past the end of a line clamp to the line end; lines past the
/// end of the text clamp to the text length.
pub fn position_to_offset(source: &str, position: SourcePosition) -> usize {
    let mut line = 1u32;
    let mut line_start = 0usize;

    if position.line > 1 {
        let mut found = false;
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line += 1;
                if line == position.line {
                    line_start = i + 1;
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return source.len();
        }
    }

    let rest = &source[line_start..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let wanted = position.column.saturating_sub(1) as usize;

    rest[..line_end]
        .char_indices()
        .nth(wanted)
        .map(|(i, _)| line_start + i)
        .unwrap_or(line_start + line_end)
}
