//! The active-location marker.
//!
//! The currently active reading position is materialized in the tree as one
//! or more `<span id="activeLocation">` wrappers around the covered text
//! nodes. The marker serves two purposes: hosts style it for visual sync, and
//! the visibility query uses it as a probe ("does the active marker sit under
//! this selector").

use log::{debug, error};

use crate::dom::{Document, NodeId, query_selector};
use crate::error::{Error, Result};
use crate::locator::Locations;

use super::text_position::find_and_split_offset;

/// Id shared by every span of the marker. Deliberately duplicated when the
/// marked region spans several text nodes.
pub const ACTIVE_LOCATION_ID: &str = "activeLocation";

/// Tag used for marker wrappers.
pub const LOCATION_TAG: &str = "span";

/// How [`remove_location_marker`] takes the marker back out.
///
/// `Unwrap` restores the exact pre-marker tree (children hoisted, parent
/// text normalized) at the cost of relayout on every removal. `StripId` only
/// drops the id and leaves the spans behind, trading steady element
/// accumulation for layout stability on hosts where relayout visibly
/// flickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerRemoval {
    #[default]
    Unwrap,
    StripId,
}

/// Wrap the text covered by `locations` in marker spans.
///
/// With no character offsets on an audio book with text, the whole target
/// element's content is wrapped in a single span. Otherwise each text node
/// between the two resolved boundaries gets its own wrapper.
pub fn set_location_marker(
    doc: &mut Document,
    locations: &Locations,
    audio_book_with_text: bool,
) -> Result<()> {
    let start_selector = locations
        .css_selector
        .clone()
        .or_else(|| {
            locations
                .dom_range
                .as_ref()
                .map(|r| r.start.css_selector.clone())
        })
        .ok_or(Error::NothingToResolve)?;

    let start_parent = query_selector(doc, &start_selector)?;

    let end_selector = locations
        .dom_range
        .as_ref()
        .map(|r| r.end_or_start().css_selector.clone())
        .unwrap_or_else(|| start_selector.clone());
    let end_parent = if end_selector == start_selector {
        start_parent
    } else {
        query_selector(doc, &end_selector)?
    };

    let start_offset = locations
        .dom_range
        .as_ref()
        .and_then(|r| r.start.char_offset);
    let end_offset = locations
        .dom_range
        .as_ref()
        .and_then(|r| r.end.as_ref())
        .and_then(|b| b.char_offset);

    if start_offset.unwrap_or(0) == 0 && end_offset.unwrap_or(0) == 0 && audio_book_with_text {
        wrap_with_location_element(doc, start_parent);
        return Ok(());
    }

    let start_node = boundary_node(doc, start_parent, start_offset);
    let end_node = boundary_node(doc, end_parent, end_offset);

    let mut texts = Vec::new();
    let mut current = start_node;
    while let Some(node) = current {
        if Some(node) == end_node {
            break;
        }
        if doc.is_text(node) {
            texts.push(node);
        }
        current = doc.next_node(node);
    }
    debug!("marking {} text nodes under {start_selector}", texts.len());

    for text in texts {
        let wrapper = doc.create_html_element(LOCATION_TAG, &[("id", ACTIVE_LOCATION_ID)]);
        let content = doc.text_data(text).unwrap_or_default().to_string();
        let clone = doc.create_text(content);
        doc.append(wrapper, clone);
        doc.replace_with(text, wrapper);
    }

    Ok(())
}

/// A missing offset means "past the element" rather than "offset 0": the
/// boundary lands just after the parent's subtree.
fn boundary_node(doc: &mut Document, parent: NodeId, offset: Option<u32>) -> Option<NodeId> {
    match offset {
        Some(o) => {
            find_and_split_offset(doc, parent, o).or_else(|| doc.next_node_not_child(parent))
        }
        None => doc.next_node_not_child(parent),
    }
}

/// Wrap all of `target`'s children in a single marker span.
fn wrap_with_location_element(doc: &mut Document, target: NodeId) {
    let wrapper = doc.create_html_element(LOCATION_TAG, &[("id", ACTIVE_LOCATION_ID)]);
    let children: Vec<NodeId> = doc.children(target).collect();
    for child in children {
        doc.detach(child);
        doc.append(wrapper, child);
    }
    doc.append(target, wrapper);
}

/// Remove every marker span in the document under the given policy.
pub fn remove_location_marker(doc: &mut Document, policy: MarkerRemoval) {
    let markers = find_markers(doc);
    for marker in markers {
        match policy {
            MarkerRemoval::StripId => doc.remove_attr(marker, "id"),
            MarkerRemoval::Unwrap => {
                let parent = doc.unwrap_children(marker);
                if parent.is_some() {
                    doc.normalize(parent);
                }
            }
        }
    }
}

/// All marker spans, in document order. The id map only knows the first
/// holder of an id, so this scans the tree.
pub fn find_markers(doc: &Document) -> Vec<NodeId> {
    let mut markers = Vec::new();
    let Some(root) = doc.root_element() else {
        return markers;
    };
    let mut current = Some(root);
    while let Some(node) = current {
        if doc.element_id(node) == Some(ACTIVE_LOCATION_ID) {
            markers.push(node);
        }
        current = doc.next_node(node);
    }
    markers
}

/// Does the active marker sit under the element matched by `selector`?
pub fn marker_under_selector(doc: &Document, selector: &str) -> bool {
    let Ok(scope) = query_selector(doc, selector) else {
        error!("marker probe: selector failed, selector={selector}");
        return false;
    };
    find_markers(doc)
        .into_iter()
        .any(|m| m != scope && doc.contains(scope, m))
}
