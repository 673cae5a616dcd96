//! Geometry capability supplied by the rendering engine.
//!
//! In the browser-hosted original, geometry came implicitly from
//! `getBoundingClientRect` and `document.scrollingElement`. Here the
//! rendering engine is an explicit collaborator behind the [`Layout`] trait:
//! it answers per-node client rectangles and the document's scroll metrics.
//! The locator engine never depends on a concrete rendering engine type.
//!
//! [`FlowLayout`] is a deterministic reference implementation that stacks
//! text leaves in reading order. It is what the tests and the CLI run
//! against; real hosts plug in their own measurements.

use std::collections::HashMap;

use crate::dom::{Document, NodeData, NodeId};
use crate::geometry::{Metrics, Rect};

/// Per-node geometry and scroll state of the rendered document.
pub trait Layout {
    /// Client rectangle of a node, viewport-relative. `None` when the node
    /// generates no box (hidden, detached, or never laid out).
    fn node_rect(&self, node: NodeId) -> Option<Rect>;

    /// Viewport and scroll measurements.
    fn metrics(&self) -> Metrics;
}

/// Options for [`FlowLayout`].
#[derive(Debug, Clone, Copy)]
pub struct FlowOptions {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Height assigned to each text leaf.
    pub line_height: f64,
    /// Continuous vertical scroll when true; paginated columns when false.
    pub vertical: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            viewport_height: 600.0,
            line_height: 20.0,
            vertical: true,
        }
    }
}

/// A simple reading-order block layout.
///
/// Every text leaf (and every `<img>`) gets one line-sized rectangle. In
/// vertical mode lines stack downward and the document grows in height; in
/// horizontal mode lines fill a column and overflow into the next page-wide
/// column, the way paginated EPUB rendering clips vertically and grows
/// horizontally. Element rectangles are the union of their descendants'.
pub struct FlowLayout {
    rects: HashMap<NodeId, Rect>,
    metrics: Metrics,
}

impl FlowLayout {
    /// Lay out the document with the viewport scrolled to the origin.
    pub fn new(doc: &Document, options: FlowOptions) -> Self {
        Self::with_scroll(doc, options, 0.0, 0.0)
    }

    /// Lay out the document with the given scroll offsets applied.
    pub fn with_scroll(
        doc: &Document,
        options: FlowOptions,
        scroll_left: f64,
        scroll_top: f64,
    ) -> Self {
        let mut layout = Self {
            rects: HashMap::new(),
            metrics: Metrics::default(),
        };
        let mut cursor = Cursor::default();
        if let Some(body) = doc.body() {
            layout.place(doc, body, &options, &mut cursor);
        }

        let content_height = if options.vertical {
            cursor.y.max(options.viewport_height)
        } else {
            options.viewport_height
        };
        let content_width = if options.vertical {
            options.viewport_width
        } else {
            (cursor.column + 1) as f64 * options.viewport_width
        };

        // Shift document coordinates into client coordinates.
        for rect in layout.rects.values_mut() {
            *rect = rect.translate(-scroll_left, -scroll_top);
        }

        layout.metrics = Metrics {
            viewport_width: options.viewport_width,
            viewport_height: options.viewport_height,
            scroll_left,
            scroll_top,
            scroll_width: content_width,
            scroll_height: content_height,
            client_height: options.viewport_height,
        };
        layout
    }

    fn place(&mut self, doc: &Document, node: NodeId, options: &FlowOptions, cursor: &mut Cursor) {
        if doc.is_element(node) {
            if doc
                .style_property(node, "display")
                .is_some_and(|d| d == "none")
            {
                return;
            }
            if doc.tag_is(node, "img") {
                let rect = cursor.take_line(options);
                self.rects.insert(node, rect);
                return;
            }
            for child in doc.children(node).collect::<Vec<_>>() {
                self.place(doc, child, options, cursor);
            }
            // Element box covers its descendants.
            let mut union: Option<Rect> = None;
            for child in doc.children(node) {
                if let Some(r) = self.rects.get(&child) {
                    union = Some(match union {
                        Some(u) => u.union(r),
                        None => *r,
                    });
                }
            }
            if let Some(rect) = union {
                self.rects.insert(node, rect);
            }
            return;
        }

        match doc.get(node).map(|n| &n.data) {
            Some(NodeData::Text(t)) => {
                // Whitespace-only leaves occupy no line but still get a
                // zero-height rect at the cursor so boundaries resolve.
                if t.trim().is_empty() {
                    let rect = Rect::new(cursor.x(options), cursor.y, cursor.x(options), cursor.y);
                    self.rects.insert(node, rect);
                } else {
                    let rect = cursor.take_line(options);
                    self.rects.insert(node, rect);
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct Cursor {
    y: f64,
    column: usize,
}

impl Cursor {
    fn x(&self, options: &FlowOptions) -> f64 {
        self.column as f64 * options.viewport_width
    }

    fn take_line(&mut self, options: &FlowOptions) -> Rect {
        if !options.vertical && self.y + options.line_height > options.viewport_height {
            self.column += 1;
            self.y = 0.0;
        }
        let left = self.x(options);
        let rect = Rect::new(
            left,
            self.y,
            left + options.viewport_width,
            self.y + options.line_height,
        );
        self.y += options.line_height;
        rect
    }
}

impl Layout for FlowLayout {
    fn node_rect(&self, node: NodeId) -> Option<Rect> {
        self.rects.get(&node).copied()
    }

    fn metrics(&self) -> Metrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document_str;

    #[test]
    fn test_vertical_stacking() {
        let doc = parse_document_str("<body><p>one</p><p>two</p></body>");
        let layout = FlowLayout::new(&doc, FlowOptions::default());

        let ps = crate::dom::query_selector_all(&doc, "p").unwrap();
        let first = layout.node_rect(ps[0]).unwrap();
        let second = layout.node_rect(ps[1]).unwrap();
        assert_eq!(first.top, 0.0);
        assert_eq!(second.top, first.bottom);
    }

    #[test]
    fn test_horizontal_columns() {
        // 3 paragraphs at 20px lines into a 40px-tall viewport: two columns.
        let doc = parse_document_str("<body><p>a</p><p>b</p><p>c</p></body>");
        let options = FlowOptions {
            viewport_width: 100.0,
            viewport_height: 40.0,
            line_height: 20.0,
            vertical: false,
        };
        let layout = FlowLayout::new(&doc, options);

        let ps = crate::dom::query_selector_all(&doc, "p").unwrap();
        assert_eq!(layout.node_rect(ps[0]).unwrap().left, 0.0);
        assert_eq!(layout.node_rect(ps[2]).unwrap().left, 100.0);
        assert_eq!(layout.metrics().scroll_width, 200.0);
    }

    #[test]
    fn test_scroll_shifts_client_coordinates() {
        let doc = parse_document_str("<body><p>one</p><p>two</p></body>");
        let layout = FlowLayout::with_scroll(&doc, FlowOptions::default(), 0.0, 20.0);

        let ps = crate::dom::query_selector_all(&doc, "p").unwrap();
        assert_eq!(layout.node_rect(ps[0]).unwrap().top, -20.0);
        assert_eq!(layout.node_rect(ps[1]).unwrap().top, 0.0);
    }

    #[test]
    fn test_display_none_generates_no_box() {
        let doc =
            parse_document_str(r#"<body><p style="display: none">hidden</p><p>shown</p></body>"#);
        let layout = FlowLayout::new(&doc, FlowOptions::default());
        let ps = crate::dom::query_selector_all(&doc, "p").unwrap();
        assert!(layout.node_rect(ps[0]).is_none());
        assert_eq!(layout.node_rect(ps[1]).unwrap().top, 0.0);
    }
}
