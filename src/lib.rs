//! # locus
//!
//! A locator resolution engine for EPUB reading systems: maps abstract
//! reading positions (locators) onto concrete DOM ranges in a parsed
//! resource document, and back.
//!
//! ## Features
//!
//! - Resolve `cssSelector`/`domRange` locators to live DOM ranges
//! - Mark the active reading location in the tree and query its visibility
//! - Synthesize `page=`, `toc=`, and `physicalPage=` fragments from the
//!   current viewport
//! - Compute scroll targets for paginated and continuously scrolled layouts
//! - JSON request/response boundary for embedding in a host reader
//!
//! ## Quick Start
//!
//! ```
//! use locus::dom::parse_document_str;
//! use locus::{FlowLayout, FlowOptions, Locations, Locator, PageEngine, PageOptions};
//!
//! let doc = parse_document_str(r#"<h1 id="ch1">One</h1><p id="p">Hello world</p>"#);
//! let layout = FlowLayout::new(&doc, FlowOptions::default());
//! let mut engine = PageEngine::new(doc, Box::new(layout), PageOptions::default());
//!
//! let locator = Locator::new("ch1.xhtml").with_locations(Locations::from_selector("#p"));
//! let enriched = engine.get_locator_fragments(&locator, true);
//! let fragments = enriched.locations.unwrap().fragments;
//! assert!(fragments.iter().any(|f| f == "toc=ch1"));
//! ```
//!
//! Geometry comes from the host through the [`Layout`] trait; [`FlowLayout`]
//! is a deterministic reference implementation for tests and tooling.

pub mod dom;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod locator;
pub mod ops;

pub use engine::{MarkerRemoval, PageEngine, PageOptions, ScrollTarget};
pub use error::{Error, Result};
pub use geometry::{Metrics, Rect};
pub use layout::{FlowLayout, FlowOptions, Layout};
pub use locator::{ComicFrame, CssBoundary, DomRange, Locations, Locator};
