//! Fragment synthesis.
//!
//! Fragments are the free-form `key=value` tags on an outbound locator:
//! `page=`/`totalPages=` from scroll metrics, `toc=` from the nearest
//! preceding heading, and `physicalPage=` from print page-break markers.
//! Each synthesizer degrades to emitting nothing rather than failing the
//! whole locator.

use log::{debug, error};

use crate::dom::{Document, NodeId, query_selector};
use crate::geometry::Metrics;
use crate::locator::Heading;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const PAGE_BREAK_CLASSES: [&str; 3] = ["page-normal", "page-front", "page-special"];

/// Synthetic page position from scroll metrics.
///
/// Page numbers only exist under pagination; a vertically scrolled document
/// reports the literal `null` so the host can tell "no page" from "page
/// missing".
pub fn page_fragments(metrics: &Metrics, vertical: bool) -> Vec<String> {
    if vertical || metrics.viewport_width == 0.0 {
        return vec!["page=null".to_string(), "totalPages=null".to_string()];
    }
    let page = (metrics.scroll_left / metrics.viewport_width).round() as i64 + 1;
    let total = (metrics.scroll_width / metrics.viewport_width).round() as i64;
    vec![format!("page={page}"), format!("totalPages={total}")]
}

/// Collect every heading in document order.
///
/// A heading without its own id borrows one from the nearest ancestor it is
/// the first element child of; that is where navigation anchors usually sit
/// when authors wrap headings in sections.
pub fn collect_headings(doc: &Document) -> Vec<Heading> {
    let mut headings = Vec::new();
    let Some(root) = doc.root_element() else {
        return headings;
    };
    let mut current = Some(root);
    while let Some(node) = current {
        if heading_level(doc, node).is_some() {
            let level = heading_level(doc, node).unwrap_or(0);
            let text = {
                let t = doc.text_content(node);
                if t.trim().is_empty() {
                    doc.attr(node, "title")
                        .or_else(|| doc.attr(node, "aria-label"))
                        .unwrap_or_default()
                        .to_string()
                } else {
                    t
                }
            };
            headings.push(Heading {
                node,
                id: effective_heading_id(doc, node),
                level,
                text,
            });
        }
        current = doc.next_node(node);
    }
    debug!("cached {} headings", headings.len());
    headings
}

fn heading_level(doc: &Document, node: NodeId) -> Option<u8> {
    let name = doc.element_name(node)?;
    let name = name.as_ref();
    HEADING_TAGS
        .iter()
        .position(|t| *t == name)
        .map(|i| i as u8 + 1)
}

fn effective_heading_id(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(id) = doc.element_id(node)
        && !id.is_empty()
    {
        return Some(id.to_string());
    }
    let mut cur = node;
    while let Some(parent) = doc.parent_element(cur) {
        if doc.element_children(parent).next() != Some(cur) {
            break;
        }
        if let Some(id) = doc.element_id(parent)
            && !id.is_empty()
        {
            return Some(id.to_string());
        }
        cur = parent;
    }
    None
}

/// `toc=<id>` of the closest heading at or before the selector target.
///
/// The target is narrowed to its first descendant heading when it contains
/// one. Headings without a usable id are skipped; with no heading at all the
/// enclosing `section` (or body) id is used. Empty-handed, emits nothing.
pub fn toc_fragments(doc: &Document, headings: &[Heading], selector: &str) -> Vec<String> {
    let Ok(target) = query_selector(doc, selector) else {
        error!("toc fragment: selector failed, selector={selector}");
        return Vec::new();
    };

    let current = first_descendant_heading(doc, target).unwrap_or(target);

    for heading in headings.iter().rev() {
        if !doc.precedes_or_contains(heading.node, current) {
            continue;
        }
        if let Some(id) = &heading.id {
            return vec![format!("toc={id}")];
        }
    }

    let fallback = doc
        .closest_tag(target, "section")
        .or_else(|| doc.closest_tag(target, "body"));
    if let Some(node) = fallback
        && let Some(id) = doc.element_id(node)
        && !id.is_empty()
    {
        return vec![format!("toc={id}")];
    }
    Vec::new()
}

fn first_descendant_heading(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.next_node(node);
    let end = doc.next_node_not_child(node);
    while current != end {
        let id = current?;
        if heading_level(doc, id).is_some() {
            return Some(id);
        }
        current = doc.next_node(id);
    }
    None
}

/// `physicalPage=<n>` from the closest preceding print page-break marker.
///
/// Walks backwards through preceding siblings level by level toward the body;
/// when no marker exists at all, falls back to the `webpub:currentPage` meta
/// in the head.
pub fn physical_page_fragments(doc: &Document, selector: &str) -> Vec<String> {
    match find_current_physical_page(doc, selector) {
        Some(page) if !page.is_empty() => vec![format!("physicalPage={page}")],
        _ => Vec::new(),
    }
}

fn find_current_physical_page(doc: &Document, selector: &str) -> Option<String> {
    let Ok(mut element) = query_selector(doc, selector) else {
        error!("physical page: selector failed, selector={selector}");
        return None;
    };

    if is_page_break(doc, element) {
        return page_index_of(doc, element);
    }

    loop {
        let parent = doc.get(element)?.parent;
        let siblings: Vec<NodeId> = doc.element_children(parent).collect();
        let position = siblings.iter().position(|s| *s == element)?;

        for &sibling in siblings[..=position].iter().rev() {
            if let Some(index) = physical_page_index(doc, sibling) {
                return Some(index);
            }
        }

        if !doc.is_element(parent) || doc.tag_is(parent, "body") {
            return current_page_meta(doc);
        }
        element = parent;
    }
}

fn physical_page_index(doc: &Document, element: NodeId) -> Option<String> {
    if is_page_break(doc, element) {
        return page_index_of(doc, element);
    }
    let marker = first_descendant_with_class(doc, element, &PAGE_BREAK_CLASSES)?;
    page_index_of(doc, marker)
}

fn is_page_break(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, "type") == Some("pagebreak")
}

fn page_index_of(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(title) = doc.attr(node, "title") {
        return Some(title.to_string());
    }
    let text = doc.text_content(node);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn first_descendant_with_class(
    doc: &Document,
    node: NodeId,
    classes: &[&str],
) -> Option<NodeId> {
    let mut current = doc.next_node(node);
    let end = doc.next_node_not_child(node);
    while current != end {
        let id = current?;
        if doc
            .element_classes(id)
            .iter()
            .any(|c| classes.contains(&c.as_str()))
        {
            return Some(id);
        }
        current = doc.next_node(id);
    }
    None
}

fn current_page_meta(doc: &Document) -> Option<String> {
    let head = doc.find_by_tag("head")?;
    let mut current = doc.next_node(head);
    let end = doc.next_node_not_child(head);
    while current != end {
        let id = current?;
        if doc.attr(id, "name") == Some("webpub:currentPage") {
            return doc.attr(id, "content").map(str::to_string);
        }
        current = doc.next_node(id);
    }
    None
}
