//! The live resource document: arena DOM, html5ever parsing, selector
//! matching, and selector generation.

mod arena;
mod element_ref;
mod selector_gen;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Document, Node, NodeData, NodeId};
pub use element_ref::{
    ElementRef, LocusSelectors, Selector, parse_selector, query_selector, query_selector_all,
    query_selector_within,
};
pub use selector_gen::css_selector_for;
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse resource markup into a [`Document`].
///
/// Parsing is lenient, like a browser: malformed markup never fails, it just
/// produces the recovered tree.
pub fn parse_document_str(html: &str) -> Document {
    let sink = DomSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_document()
}
