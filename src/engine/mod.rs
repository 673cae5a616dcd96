//! The locator resolution engine.
//!
//! [`PageEngine`] owns the parsed resource document and a [`Layout`]
//! capability, and exposes the host-facing operations: placing the active
//! location, scrolling to a location, visibility queries, and fragment
//! synthesis. Every operation degrades instead of failing: a locator that
//! cannot be resolved produces a logged sentinel result, never a panic.

pub mod first_visible;
pub mod fragments;
pub mod marker;
pub mod range;
pub mod text_position;
pub mod visibility;

use log::{debug, error, warn};

use crate::dom::{Document, css_selector_for, query_selector};
use crate::geometry::clamp;
use crate::layout::Layout;
use crate::locator::{ComicFrame, Heading, Locations, Locator, duration_fragment};

pub use marker::MarkerRemoval;

/// Static configuration of the engine for one resource document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    /// Pre-paginated resource: geometry is not scroll-dependent and
    /// everything counts as visible.
    pub fixed_layout: bool,
    /// Comic-book resource: `set_location` emits frame navigation commands.
    pub comic_book: bool,
    pub marker_removal: MarkerRemoval,
}

/// A scroll command for the host, as a fraction of the scrollable extent.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ScrollTarget {
    pub progression: f64,
}

/// Engine instance bound to one loaded resource document.
pub struct PageEngine {
    doc: Document,
    layout: Box<dyn Layout>,
    options: PageOptions,
    /// Lazily built once per document; in-page mutations after the build are
    /// accepted staleness.
    headings: Option<Vec<Heading>>,
    vertical_scroll: bool,
}

impl PageEngine {
    pub fn new(doc: Document, layout: Box<dyn Layout>, options: PageOptions) -> Self {
        let vertical_scroll = scroll_mode_enabled(&doc);
        Self {
            doc,
            layout,
            options,
            headings: None,
            vertical_scroll,
        }
    }

    /// The engine is ready as soon as it exists; the host polls this to know
    /// the document finished loading.
    pub fn is_reader_ready(&self) -> bool {
        true
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Swap in fresh geometry after the host scrolled or resized.
    pub fn set_layout(&mut self, layout: Box<dyn Layout>) {
        self.layout = layout;
    }

    /// Whether the document itself requests continuous vertical scrolling.
    pub fn vertical_scroll(&self) -> bool {
        self.vertical_scroll
    }

    /// Mark `locator` as the active location.
    ///
    /// Any previous marker is removed first. On comic books, additionally
    /// returns the frame the host should animate to; the duration fragment is
    /// mandatory there.
    pub fn set_location(
        &mut self,
        locator: Option<&Locator>,
        is_audio_book_with_text: bool,
    ) -> Option<ComicFrame> {
        let Some(locator) = locator else {
            debug!("no locator set");
            return None;
        };

        marker::remove_location_marker(&mut self.doc, self.options.marker_removal);

        if let Some(locations) = &locator.locations
            && let Err(err) =
                marker::set_location_marker(&mut self.doc, locations, is_audio_book_with_text)
        {
            error!("set_location: {err}");
        }

        if !self.options.comic_book {
            return None;
        }

        let Some(selector) = locator.css_selector() else {
            error!("set_location: css selector not set");
            return None;
        };
        let fragments = locator
            .locations
            .as_ref()
            .map(|l| l.fragments.as_slice())
            .unwrap_or_default();
        match duration_fragment(fragments) {
            Ok(duration) => Some(ComicFrame {
                css_selector: selector.to_string(),
                duration_ms: duration * 1000.0,
            }),
            Err(err) => {
                error!("set_location: {err}");
                None
            }
        }
    }

    /// Remove the active location marker.
    pub fn remove_location(&mut self) {
        marker::remove_location_marker(&mut self.doc, self.options.marker_removal);
    }

    /// Compute the scroll needed to bring `locations` into view.
    ///
    /// Returns `None` when the target is already acceptably visible (and
    /// `to_start` is not forcing a realignment), or when nothing resolvable
    /// or scrollable was found.
    pub fn scroll_to_locations(
        &mut self,
        locations: &Locations,
        is_vertical_scroll: bool,
        to_start: bool,
    ) -> Option<ScrollTarget> {
        self.vertical_scroll = is_vertical_scroll;

        match range::resolve_locations(&mut self.doc, self.layout.as_ref(), locations) {
            Ok(resolved) => {
                if !to_start
                    && visibility::is_range_visible(
                        &self.doc,
                        self.layout.as_ref(),
                        &resolved,
                        self.options.fixed_layout,
                    )
                {
                    return None;
                }
                self.scroll_to_range(&resolved, is_vertical_scroll)
            }
            Err(err) => {
                if let Some(progression) = locations.progression {
                    return Some(ScrollTarget { progression });
                }
                warn!("scroll_to_locations: unknown range: {err}");
                None
            }
        }
    }

    fn scroll_to_range(&self, resolved: &range::Range, vertical: bool) -> Option<ScrollTarget> {
        let rect = range::bounding_client_rect(&self.doc, self.layout.as_ref(), resolved);
        if rect.is_zero() {
            debug!("scroll_to_range: defective bounding rect, abort");
            return None;
        }

        let metrics = self.layout.metrics();
        if vertical {
            // Keep a safety band at both viewport edges so the target does
            // not land flush against them.
            let min = 0.05 * metrics.viewport_height;
            let max = 0.95 * metrics.viewport_height;
            if rect.top < min || rect.bottom > max {
                let offset = clamp(
                    (metrics.scroll_top + rect.top - min) / metrics.scroll_height,
                    0.0,
                    1.0,
                );
                return Some(ScrollTarget {
                    progression: offset,
                });
            }
            None
        } else {
            let offset =
                (metrics.scroll_left + 0.5 * (rect.left + rect.right)) / metrics.scroll_width;
            Some(ScrollTarget {
                progression: offset,
            })
        }
    }

    /// Is the locator at least partially visible?
    ///
    /// Uncertainty (no locations, no selector) defaults to `true`; a cleanly
    /// resolved-but-absent target is `false`. Visibility also requires that
    /// the active marker currently sits under the locator's selector, so a
    /// stale locator for a different region reports not-visible.
    pub fn is_locator_visible(&mut self, locator: &Locator) -> bool {
        let Some(locations) = &locator.locations else {
            return true;
        };
        let Some(selector) = locations.css_selector.as_deref().or_else(|| {
            locations
                .dom_range
                .as_ref()
                .map(|r| r.start.css_selector.as_str())
        }) else {
            return true;
        };
        let selector = selector.to_string();
        let locations = locations.clone();

        if self.options.comic_book {
            return query_selector(&self.doc, &selector).is_ok();
        }

        match range::resolve_locations(&mut self.doc, self.layout.as_ref(), &locations) {
            Ok(resolved) => {
                visibility::is_range_visible(
                    &self.doc,
                    self.layout.as_ref(),
                    &resolved,
                    self.options.fixed_layout,
                ) && marker::marker_under_selector(&self.doc, &selector)
            }
            Err(err) => {
                debug!("is_locator_visible: unknown range: {err}");
                false
            }
        }
    }

    /// Selector for the first visible element, for resuming a position when
    /// the host has no locator at all.
    pub fn first_visible_css_selector(&self) -> String {
        match first_visible::find_first_visible_element(
            &self.doc,
            self.layout.as_ref(),
            self.vertical_scroll,
            self.options.fixed_layout,
        ) {
            Some(node) => css_selector_for(&self.doc, node),
            None => "body".to_string(),
        }
    }

    /// Enrich `locator` with synthesized fragments for the current viewport.
    ///
    /// The locator's own selector anchors the synthesis when present;
    /// otherwise the first visible element does. Input fragments are kept and
    /// synthesized ones appended. On any failure the input locator comes back
    /// unchanged.
    pub fn get_locator_fragments(&mut self, locator: &Locator, is_vertical_scroll: bool) -> Locator {
        self.vertical_scroll = is_vertical_scroll;

        let selector = locator
            .locations
            .as_ref()
            .and_then(|l| l.css_selector.clone())
            .unwrap_or_else(|| self.first_visible_css_selector());
        if selector.is_empty() {
            debug!("get_locator_fragments: selector not found, returning input");
            return locator.clone();
        }

        if self.headings.is_none() {
            self.headings = Some(fragments::collect_headings(&self.doc));
        }
        let headings = self.headings.as_deref().unwrap_or_default();

        let mut synthesized =
            fragments::page_fragments(&self.layout.metrics(), is_vertical_scroll);
        synthesized.extend(fragments::toc_fragments(&self.doc, headings, &selector));
        synthesized.extend(fragments::physical_page_fragments(&self.doc, &selector));

        let mut locations = locator.locations.clone().unwrap_or_default();
        locations.css_selector.get_or_insert(selector);
        locations.fragments.extend(synthesized);

        Locator {
            locations: Some(locations),
            ..locator.clone()
        }
    }
}

/// Reads the per-document scroll-mode flag from the root element's inline
/// custom properties.
pub fn scroll_mode_enabled(doc: &Document) -> bool {
    let Some(root) = doc.root_element() else {
        return false;
    };
    let is_on = |prop: &str| {
        doc.style_property(root, prop)
            .is_some_and(|v| v.trim() == "readium-scroll-on")
    };
    is_on("--USER__view") || is_on("--USER__scroll")
}
