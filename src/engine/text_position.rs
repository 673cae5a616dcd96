//! Character-offset resolution within a DOM subtree.
//!
//! Two variants exist because the two consumers need different behavior: the
//! range builder only needs a boundary (no mutation), while the marker must
//! physically split text nodes so that wrapper elements can be inserted at
//! exact character positions.

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::engine::range::Boundary;

/// Locate the boundary `char_offset` characters into `node`'s text content,
/// without mutating the tree.
///
/// Offset 0 is the node itself (no descent needed). Otherwise descendant text
/// nodes are walked in pre-order, accumulating consumed length; the boundary
/// lands inside the first text node whose length reaches the remainder.
/// Whitespace-only text counts like any other text.
pub fn find_text_position(doc: &Document, node: NodeId, char_offset: u32) -> Result<Boundary> {
    if char_offset == 0 {
        return Ok(Boundary {
            node,
            offset: 0,
        });
    }

    let mut remaining = char_offset;
    for text in doc.descendant_text_nodes(node) {
        let len = doc.text_len(text);
        if remaining <= len {
            return Ok(Boundary {
                node: text,
                offset: remaining,
            });
        }
        remaining -= len;
    }

    Err(Error::OffsetOutOfRange {
        offset: char_offset,
    })
}

/// Return the text node starting at `char_offset` within `node`, splitting a
/// text node if the offset falls strictly inside one.
///
/// Offset 0 returns the first text node unmodified; splitting only happens
/// for offsets inside a node. Returns `None` when the offset is at or past
/// the end of `node`'s text.
pub fn find_and_split_offset(
    doc: &mut Document,
    node: NodeId,
    char_offset: u32,
) -> Option<NodeId> {
    let mut remaining = char_offset as i64;
    descend_and_split(doc, node, &mut remaining)
}

fn descend_and_split(doc: &mut Document, node: NodeId, remaining: &mut i64) -> Option<NodeId> {
    if doc.is_text(node) {
        if *remaining <= 0 {
            return Some(node);
        }
        let len = doc.text_len(node) as i64;
        if *remaining < len {
            return doc.split_text(node, *remaining as u32);
        }
        *remaining -= len;
        return None;
    }

    let children: Vec<_> = doc.children(node).collect();
    for child in children {
        if let Some(found) = descend_and_split(doc, child, remaining) {
            return Some(found);
        }
    }
    None
}
