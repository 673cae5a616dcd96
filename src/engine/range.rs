//! Range construction from abstract locations.
//!
//! A [`Range`] is the concrete counterpart of a `Locations` value: either a
//! whole-node selection or a pair of (node, character-offset) boundaries.
//! Geometry questions about a range go through the [`Layout`] capability.

use log::{debug, error};

use crate::dom::{Document, NodeId, query_selector};
use crate::error::{Error, Result};
use crate::geometry::{Rect, bounding_rect};
use crate::layout::Layout;
use crate::locator::Locations;

use super::text_position::find_text_position;

/// A position inside the document: a node plus a character offset into it.
/// Offset 0 on an element means "at the element itself".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: u32,
}

/// A concrete selection over the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// Whole-node selection (`Range.selectNode`).
    Node(NodeId),
    /// Dual-boundary selection.
    Boundaries { start: Boundary, end: Boundary },
}

impl Range {
    pub fn is_collapsed(&self) -> bool {
        match self {
            Range::Node(_) => false,
            Range::Boundaries { start, end } => start == end,
        }
    }

    /// The boundary resolution starts from, used for fallback repairs.
    pub fn start_boundary(&self) -> Boundary {
        match *self {
            Range::Node(node) => Boundary { node, offset: 0 },
            Range::Boundaries { start, .. } => start,
        }
    }
}

/// Resolve a `Locations` value to a concrete range.
///
/// Decision order: an explicit `domRange` wins; otherwise a bare selector
/// (direct or nested under the range start) selects the whole node; with
/// neither present resolution fails. A bare `progression` is not resolvable
/// to a range — scrolling handles that case separately.
pub fn resolve_locations(
    doc: &mut Document,
    layout: &dyn Layout,
    locations: &Locations,
) -> Result<Range> {
    if let Some(dom_range) = &locations.dom_range {
        let start_selector = dom_range.start.css_selector.clone();
        let start_offset = dom_range.start.char_offset.unwrap_or(0);
        let end = dom_range.end_or_start();
        let end_selector = end.css_selector.clone();
        let end_offset = end.char_offset.unwrap_or(0);
        return resolve_dom_range(
            doc,
            layout,
            &start_selector,
            start_offset,
            &end_selector,
            end_offset,
        );
    }

    if let Some(selector) = locations.css_selector.as_deref() {
        return resolve_css_selector(doc, selector);
    }

    Err(Error::NothingToResolve)
}

/// Dual-boundary resolution: both selectors are queried, both offsets are
/// located via the text position resolver, and a degenerate result (no
/// client rects) is repaired to the nearest non-whitespace character.
pub fn resolve_dom_range(
    doc: &mut Document,
    layout: &dyn Layout,
    start_selector: &str,
    start_offset: u32,
    end_selector: &str,
    end_offset: u32,
) -> Result<Range> {
    let start_node = query_selector(doc, start_selector)?;
    let start = find_text_position(doc, start_node, start_offset).inspect_err(|_| {
        error!("domRange bad start, selector={start_selector}, offset={start_offset}");
    })?;

    let end_node = if end_selector == start_selector {
        start_node
    } else {
        query_selector(doc, end_selector)?
    };
    let end = find_text_position(doc, end_node, end_offset).inspect_err(|_| {
        error!("domRange bad end, selector={end_selector}, offset={end_offset}");
    })?;

    let range = Range::Boundaries { start, end };

    // A collapsed or invisible selection yields no client rects and therefore
    // a garbage bounding rectangle (seen in browsers when start and end meet
    // at a newline). Repair by selecting the single nearest non-whitespace
    // character instead.
    if client_rects(doc, layout, &range).is_empty() {
        let (node, offset) =
            find_non_whitespace(doc, start.node, start.offset).ok_or(Error::NoNonWhitespace)?;
        debug!("degenerate range repaired at offset {offset}");
        return Ok(Range::Boundaries {
            start: Boundary { node, offset },
            end: Boundary {
                node,
                offset: offset + 1,
            },
        });
    }

    Ok(range)
}

/// Single-selector resolution: the whole matched node becomes the range.
/// Hidden targets are forced visible first so geometry queries succeed.
pub fn resolve_css_selector(doc: &mut Document, selector: &str) -> Result<Range> {
    let node = query_selector(doc, selector)?;

    if doc
        .style_property(node, "display")
        .is_some_and(|d| d == "none")
    {
        let display = if is_page_break_element(doc, node) {
            "flex"
        } else {
            "block"
        };
        doc.set_style_property(node, "display", display);
    }

    Ok(Range::Node(node))
}

/// Does the element carry an explicit `type="pagebreak"` marker?
pub fn is_page_break_element(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, "type") == Some("pagebreak")
}

/// Client rectangles of the text covered by a range.
///
/// A collapsed range has none, mirroring `Range.getClientRects()` on a
/// zero-length browser selection.
pub fn client_rects(doc: &Document, layout: &dyn Layout, range: &Range) -> Vec<Rect> {
    match range {
        Range::Node(node) => {
            let mut rects: Vec<Rect> = doc
                .descendant_text_nodes(*node)
                .into_iter()
                .filter_map(|t| text_rect(doc, layout, t))
                .collect();
            if rects.is_empty()
                && let Some(rect) = layout.node_rect(*node)
            {
                rects.push(rect);
            }
            rects
        }
        Range::Boundaries { start, end } => {
            if range.is_collapsed() {
                return Vec::new();
            }
            let mut rects = Vec::new();
            let mut current = Some(start.node);
            while let Some(node) = current {
                if node == end.node {
                    break;
                }
                if doc.is_text(node) {
                    // The start node contributes nothing when the boundary
                    // sits at its very end.
                    let covered = node != start.node || start.offset < doc.text_len(node);
                    if covered && let Some(rect) = text_rect(doc, layout, node) {
                        rects.push(rect);
                    }
                }
                current = doc.next_node(node);
            }
            if doc.is_text(end.node)
                && end.offset > 0
                && let Some(rect) = text_rect(doc, layout, end.node)
            {
                rects.push(rect);
            }
            rects
        }
    }
}

/// Rect of a text node, falling back to the nearest laid-out ancestor.
///
/// Marker wrappers and text splits create nodes the host has not measured
/// yet; until the next relayout their geometry is the enclosing element's.
/// The walk stops at a `display: none` ancestor, which has no box to lend.
fn text_rect(doc: &Document, layout: &dyn Layout, node: NodeId) -> Option<Rect> {
    if let Some(rect) = layout.node_rect(node) {
        return Some(rect);
    }
    let mut current = doc.parent_element(node);
    while let Some(ancestor) = current {
        if doc
            .style_property(ancestor, "display")
            .is_some_and(|d| d == "none")
        {
            return None;
        }
        if let Some(rect) = layout.node_rect(ancestor) {
            return Some(rect);
        }
        current = doc.parent_element(ancestor);
    }
    None
}

/// Bounding rectangle of a range; [`Rect::ZERO`] when it has no client rects.
pub fn bounding_client_rect(doc: &Document, layout: &dyn Layout, range: &Range) -> Rect {
    bounding_rect(&client_rects(doc, layout, range)).unwrap_or(Rect::ZERO)
}

/// First non-whitespace character at or before the given position, falling
/// back to the first one at or after it.
pub fn find_non_whitespace(doc: &Document, node: NodeId, offset: u32) -> Option<(NodeId, u32)> {
    find_non_whitespace_backward(doc, node, Some(offset))
        .or_else(|| find_non_whitespace_forward(doc, node, offset))
}

fn find_non_whitespace_backward(
    doc: &Document,
    node: NodeId,
    offset: Option<u32>,
) -> Option<(NodeId, u32)> {
    let mut current = Some(node);
    let mut offset = offset;
    while let Some(node) = current {
        if doc.is_text(node) {
            let chars: Vec<char> = doc.text_data(node)?.chars().collect();
            if !chars.is_empty() {
                let last = chars.len() as u32 - 1;
                let mut i = offset.unwrap_or(last).min(last) as i64;
                while i >= 0 {
                    if !chars[i as usize].is_whitespace() {
                        return Some((node, i as u32));
                    }
                    i -= 1;
                }
            }
            offset = None;
        }
        current = doc.prev_node(node);
    }
    None
}

fn find_non_whitespace_forward(doc: &Document, node: NodeId, offset: u32) -> Option<(NodeId, u32)> {
    let mut current = Some(node);
    let mut offset = offset;
    while let Some(node) = current {
        if doc.is_text(node) {
            let chars: Vec<char> = doc.text_data(node)?.chars().collect();
            let mut i = offset as usize;
            while i < chars.len() {
                if !chars[i].is_whitespace() {
                    return Some((node, i as u32));
                }
                i += 1;
            }
            offset = 0;
        }
        current = doc.next_node(node);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document_str;
    use crate::layout::{FlowLayout, FlowOptions};
    use crate::locator::{CssBoundary, DomRange};

    fn doc_and_layout(html: &str) -> (Document, FlowLayout) {
        let doc = parse_document_str(html);
        let layout = FlowLayout::new(&doc, FlowOptions::default());
        (doc, layout)
    }

    #[test]
    fn test_single_selector_selects_whole_node() {
        let (mut doc, layout) = doc_and_layout(r#"<p id="p42">Hello world</p>"#);
        let locations = Locations::from_selector("#p42");

        let range = resolve_locations(&mut doc, &layout, &locations).unwrap();
        let p = doc.get_by_id("p42").unwrap();
        assert_eq!(range, Range::Node(p));
        assert!(!client_rects(&doc, &layout, &range).is_empty());
    }

    #[test]
    fn test_dom_range_covers_substring() {
        let (mut doc, layout) = doc_and_layout(r#"<p id="p42">Hello world</p>"#);
        let locations = Locations::from_dom_range(DomRange::span(
            CssBoundary::new("#p42", 6),
            CssBoundary::new("#p42", 11),
        ));

        let range = resolve_locations(&mut doc, &layout, &locations).unwrap();
        match range {
            Range::Boundaries { start, end } => {
                assert_eq!(start.node, end.node);
                assert_eq!(start.offset, 6);
                assert_eq!(end.offset, 11);
                let covered: String = doc
                    .text_data(start.node)
                    .unwrap()
                    .chars()
                    .skip(start.offset as usize)
                    .take((end.offset - start.offset) as usize)
                    .collect();
                assert_eq!(covered, "world");
            }
            other => panic!("expected boundaries, got {other:?}"),
        }
    }

    #[test]
    fn test_nothing_to_resolve() {
        let (mut doc, layout) = doc_and_layout("<p>x</p>");
        let locations = Locations {
            progression: Some(0.5),
            ..Default::default()
        };
        assert!(matches!(
            resolve_locations(&mut doc, &layout, &locations),
            Err(Error::NothingToResolve)
        ));
    }

    #[test]
    fn test_missing_selector_reported() {
        let (mut doc, layout) = doc_and_layout("<p>x</p>");
        let locations = Locations::from_selector("#missing");
        match resolve_locations(&mut doc, &layout, &locations) {
            Err(Error::SelectorNotFound { selector }) => assert_eq!(selector, "#missing"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_collapsed_range_repaired_to_nonwhitespace() {
        let (mut doc, layout) = doc_and_layout(r#"<p id="p">  word</p>"#);
        let locations = Locations::from_dom_range(DomRange::span(
            CssBoundary::new("#p", 1),
            CssBoundary::new("#p", 1),
        ));

        let range = resolve_locations(&mut doc, &layout, &locations).unwrap();
        match range {
            Range::Boundaries { start, end } => {
                assert_eq!(end.offset, start.offset + 1);
                let c = doc
                    .text_data(start.node)
                    .unwrap()
                    .chars()
                    .nth(start.offset as usize)
                    .unwrap();
                assert!(!c.is_whitespace());
            }
            other => panic!("expected boundaries, got {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_only_document_is_hard_failure() {
        let (mut doc, layout) = doc_and_layout(r#"<p id="p">   </p>"#);
        let locations = Locations::from_dom_range(DomRange::span(
            CssBoundary::new("#p", 1),
            CssBoundary::new("#p", 1),
        ));
        assert!(matches!(
            resolve_locations(&mut doc, &layout, &locations),
            Err(Error::NoNonWhitespace)
        ));
    }

    #[test]
    fn test_hidden_target_forced_visible() {
        let (mut doc, layout) =
            doc_and_layout(r#"<p id="p" style="display: none">hidden</p>"#);
        let range = resolve_css_selector(&mut doc, "#p").unwrap();
        let p = doc.get_by_id("p").unwrap();
        assert_eq!(range, Range::Node(p));
        assert_eq!(doc.style_property(p, "display").as_deref(), Some("block"));
        let _ = layout;
    }

    #[test]
    fn test_hidden_pagebreak_forced_to_flex() {
        let (mut doc, _) = doc_and_layout(
            r#"<span id="pb" type="pagebreak" style="display: none" title="24"></span>"#,
        );
        resolve_css_selector(&mut doc, "#pb").unwrap();
        let pb = doc.get_by_id("pb").unwrap();
        assert_eq!(doc.style_property(pb, "display").as_deref(), Some("flex"));
    }

    #[test]
    fn test_rects_survive_text_split() {
        // Splitting creates a text node the layout never measured; it
        // borrows the paragraph's rect.
        let (mut doc, layout) = doc_and_layout(r#"<p id="p">Hello brave world</p>"#);
        let p = doc.get_by_id("p").unwrap();
        let text = doc.descendant_text_nodes(p)[0];
        let suffix = doc.split_text(text, 6).unwrap();

        let range = Range::Boundaries {
            start: Boundary {
                node: suffix,
                offset: 0,
            },
            end: Boundary {
                node: suffix,
                offset: 5,
            },
        };
        assert!(!client_rects(&doc, &layout, &range).is_empty());
    }

    #[test]
    fn test_marked_region_keeps_rects() {
        use crate::engine::marker::set_location_marker;

        let (mut doc, layout) = doc_and_layout(r#"<p id="p">Hello brave world</p>"#);
        let locations = Locations::from_dom_range(DomRange::span(
            CssBoundary::new("#p", 6),
            CssBoundary::new("#p", 11),
        ));
        set_location_marker(&mut doc, &locations, false).unwrap();

        let range = resolve_locations(&mut doc, &layout, &locations).unwrap();
        assert!(!bounding_client_rect(&doc, &layout, &range).is_zero());
    }

    #[test]
    fn test_hidden_subtree_lends_no_rect() {
        let (mut doc, layout) =
            doc_and_layout(r#"<div style="display: none"><p id="p">hidden</p></div>"#);
        let p = doc.get_by_id("p").unwrap();
        let text = doc.descendant_text_nodes(p)[0];
        let suffix = doc.split_text(text, 3).unwrap();

        let range = Range::Boundaries {
            start: Boundary {
                node: suffix,
                offset: 0,
            },
            end: Boundary {
                node: suffix,
                offset: 3,
            },
        };
        assert!(client_rects(&doc, &layout, &range).is_empty());
    }

    #[test]
    fn test_range_spanning_two_paragraphs() {
        let (mut doc, layout) =
            doc_and_layout(r#"<p id="a">first</p><p id="b">second</p>"#);
        let range = resolve_dom_range(&mut doc, &layout, "#a", 2, "#b", 3).unwrap();
        let rects = client_rects(&doc, &layout, &range);
        // Text of #a plus text of #b.
        assert_eq!(rects.len(), 2);
    }
}
