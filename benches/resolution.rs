//! Benchmarks for locator resolution.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use locus::dom::{Document, parse_document_str};
use locus::engine::range::resolve_locations;
use locus::{
    CssBoundary, DomRange, FlowLayout, FlowOptions, Locations, Locator, PageEngine, PageOptions,
};

/// A chapter-sized document: headings, paragraphs, inline markup, and the
/// occasional print page-break marker.
fn sample_chapter() -> String {
    let mut html = String::from("<body>");
    for section in 0..20 {
        html.push_str(&format!("<h2 id=\"s{section}\">Section {section}</h2>"));
        for para in 0..25 {
            if para == 10 {
                html.push_str(&format!(
                    "<span type=\"pagebreak\" title=\"{section}\"></span>"
                ));
            }
            html.push_str(&format!(
                "<p id=\"s{section}p{para}\">The quick brown fox <em>jumps</em> \
                 over the lazy dog, paragraph {para} of section {section}.</p>"
            ));
        }
    }
    html.push_str("</body>");
    html
}

fn parsed() -> Document {
    parse_document_str(&sample_chapter())
}

fn bench_parse_document(c: &mut Criterion) {
    let html = sample_chapter();
    c.bench_function("parse_document", |b| {
        b.iter(|| parse_document_str(&html));
    });
}

fn bench_resolve_selector(c: &mut Criterion) {
    let mut doc = parsed();
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let locations = Locations::from_selector("#s15p20");

    c.bench_function("resolve_selector", |b| {
        b.iter(|| resolve_locations(&mut doc, &layout, &locations).unwrap());
    });
}

fn bench_resolve_dom_range(c: &mut Criterion) {
    let mut doc = parsed();
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let locations = Locations::from_dom_range(DomRange::span(
        CssBoundary::new("#s15p20", 4),
        CssBoundary::new("#s15p20", 30),
    ));

    c.bench_function("resolve_dom_range", |b| {
        b.iter(|| resolve_locations(&mut doc, &layout, &locations).unwrap());
    });
}

fn bench_locator_fragments(c: &mut Criterion) {
    let doc = parsed();
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let mut engine = PageEngine::new(doc, Box::new(layout), PageOptions::default());
    let locator = Locator::new("ch1.xhtml").with_locations(Locations::from_selector("#s15p20"));

    c.bench_function("locator_fragments", |b| {
        b.iter(|| engine.get_locator_fragments(&locator, true));
    });
}

fn bench_set_location(c: &mut Criterion) {
    let doc = parsed();
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let mut engine = PageEngine::new(doc, Box::new(layout), PageOptions::default());
    let locator = Locator::new("ch1.xhtml").with_locations(Locations::from_dom_range(
        DomRange::span(
            CssBoundary::new("#s15p20", 4),
            CssBoundary::new("#s15p20", 30),
        ),
    ));

    c.bench_function("set_location", |b| {
        b.iter(|| engine.set_location(Some(&locator), false));
    });
}

criterion_group!(
    benches,
    bench_parse_document,
    bench_resolve_selector,
    bench_resolve_dom_range,
    bench_locator_fragments,
    bench_set_location,
);
criterion_main!(benches);
