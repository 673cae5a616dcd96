//! First-visible-element search.
//!
//! Depth-first descent from the body toward the topmost (vertical regime) or
//! leftmost (paginated regime) visible leaf. The result anchors fragment
//! synthesis and position resumption, so it must be an element a selector can
//! address again later; anonymous leaves fall back to the closest identified
//! ancestor.

use crate::dom::{Document, NodeId};
use crate::layout::Layout;

use super::marker::ACTIVE_LOCATION_ID;
use super::visibility::{Coverage, is_element_visible};

/// Find the first visible element, starting from the body.
///
/// Falls back to the body itself when nothing below it qualifies.
pub fn find_first_visible_element(
    doc: &Document,
    layout: &dyn Layout,
    vertical: bool,
    fixed_layout: bool,
) -> Option<NodeId> {
    let body = doc.body()?;
    Some(descend(doc, layout, body, vertical, fixed_layout))
}

fn descend(
    doc: &Document,
    layout: &dyn Layout,
    node: NodeId,
    vertical: bool,
    fixed_layout: bool,
) -> NodeId {
    for child in doc.element_children(node) {
        if !is_element_visible(doc, layout, child, vertical, fixed_layout, Coverage::Partial) {
            continue;
        }
        if should_ignore_element(doc, child) {
            continue;
        }

        // The marker span is synthetic: it must never leak into an outbound
        // selector. Anchor on the identified ancestor instead.
        if doc
            .element_id(child)
            .is_some_and(|id| id.contains(ACTIVE_LOCATION_ID))
        {
            return anchor_at(doc, node, child);
        }

        if doc.children(child).next().is_some() {
            return descend(doc, layout, child, vertical, fixed_layout);
        }

        if doc.element_id(child).is_none_or(str::is_empty) {
            return anchor_at(doc, node, child);
        }
    }

    node
}

fn anchor_at(doc: &Document, parent: NodeId, child: NodeId) -> NodeId {
    if doc.element_id(parent).is_some_and(|id| !id.is_empty()) {
        parent
    } else {
        closest_element_with_id(doc, child)
    }
}

/// Nearest ancestor carrying a non-empty id; the element itself when none of
/// its ancestors has one.
pub fn closest_element_with_id(doc: &Document, node: NodeId) -> NodeId {
    doc.nearest_ancestor_with_id(node).unwrap_or(node)
}

/// Elements that cannot serve as anchors: hidden, transparent, or devoid of
/// text. Images count as content even without text.
pub fn should_ignore_element(doc: &Document, node: NodeId) -> bool {
    if doc
        .style_property(node, "display")
        .is_some_and(|d| d == "none")
    {
        return true;
    }
    if doc
        .style_property(node, "opacity")
        .is_some_and(|o| o == "0")
    {
        return true;
    }
    is_element_empty(doc, node)
}

fn is_element_empty(doc: &Document, node: NodeId) -> bool {
    if doc.tag_is(node, "img") {
        return false;
    }
    doc.text_content(node).trim().is_empty()
}
