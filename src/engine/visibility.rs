//! Viewport visibility classification.
//!
//! Visibility depends on the pagination regime: a vertically scrolled
//! document is judged on the vertical axis, a paginated one on the
//! horizontal axis. Fixed-layout resources are a single fully rendered page,
//! so everything in them counts as visible.

use crate::dom::{Document, NodeId};
use crate::geometry::{Metrics, Rect};
use crate::layout::Layout;

use super::range::{Range, bounding_client_rect};

/// How much of the target must be inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Any overlap with the viewport counts.
    Partial,
    /// The whole rectangle must fit inside the viewport.
    Full,
}

/// Is a client rectangle visible under the given regime?
pub fn is_rect_visible(rect: &Rect, metrics: &Metrics, vertical: bool, coverage: Coverage) -> bool {
    match (vertical, coverage) {
        (true, Coverage::Partial) => rect.bottom > 0.0 && rect.top < metrics.viewport_height,
        // Full coverage only anchors the first-visible search, so it tests
        // where the element STARTS, not whether it fits.
        (true, Coverage::Full) => rect.top >= 0.0 && rect.top <= metrics.client_height,
        (false, Coverage::Partial) => rect.right > 0.0 && rect.left < metrics.viewport_width,
        (false, Coverage::Full) => rect.left >= 1.0,
    }
}

/// Is an element visible in the viewport?
///
/// The body and the root element are always visible; they span the whole
/// document and asking about them means "is the document on screen", which
/// it is. Elements with no box are not visible.
pub fn is_element_visible(
    doc: &Document,
    layout: &dyn Layout,
    node: NodeId,
    vertical: bool,
    fixed_layout: bool,
    coverage: Coverage,
) -> bool {
    if fixed_layout {
        return true;
    }
    if Some(node) == doc.body() || Some(node) == doc.root_element() {
        return true;
    }
    let Some(rect) = layout.node_rect(node) else {
        return false;
    };
    is_rect_visible(&rect, &layout.metrics(), vertical, coverage)
}

/// Is any part of a resolved range inside the viewport?
///
/// Ranges are tested on both axes at once; unlike elements they have no
/// regime-specific shortcut.
pub fn is_range_visible(doc: &Document, layout: &dyn Layout, range: &Range, fixed_layout: bool) -> bool {
    if fixed_layout {
        return true;
    }
    let rect = bounding_client_rect(doc, layout, range);
    if rect.is_zero() {
        return false;
    }
    let m = layout.metrics();
    rect.top < m.viewport_height && rect.bottom > 0.0 && rect.left < m.viewport_width && rect.right > 0.0
}
