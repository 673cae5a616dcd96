//! End-to-end locator resolution through the public engine API.

use locus::dom::parse_document_str;
use locus::engine::range::{Range, bounding_client_rect, resolve_locations};
use locus::{
    CssBoundary, DomRange, FlowLayout, FlowOptions, Layout, Locations, Locator, PageEngine,
    PageOptions,
};

fn engine_for(html: &str) -> PageEngine {
    let doc = parse_document_str(html);
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    PageEngine::new(doc, Box::new(layout), PageOptions::default())
}

#[test]
fn selector_only_locations_select_whole_paragraph() {
    let mut doc = parse_document_str(r#"<p id="p42">Hello world</p>"#);
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let locations = Locations::from_selector("#p42");

    let range = resolve_locations(&mut doc, &layout, &locations).expect("resolvable");
    let p = doc.get_by_id("p42").expect("paragraph exists");
    assert_eq!(range, Range::Node(p));
}

#[test]
fn dom_range_selects_exact_substring() {
    let mut doc = parse_document_str(r#"<p id="p42">Hello world</p>"#);
    let layout = FlowLayout::new(&doc, FlowOptions::default());
    let locations = Locations::from_dom_range(DomRange::span(
        CssBoundary::new("#p42", 6),
        CssBoundary::new("#p42", 11),
    ));

    let range = resolve_locations(&mut doc, &layout, &locations).expect("resolvable");
    let Range::Boundaries { start, end } = range else {
        panic!("expected boundary range");
    };
    let text = doc.text_data(start.node).expect("text node");
    assert_eq!(
        &text[start.offset as usize..end.offset as usize],
        "world"
    );
}

#[test]
fn paginated_fragments_report_page_and_total() {
    // scrollLeft=800, viewportWidth=400, scrollWidth=4000: page 3 of 10.
    let html: String = (0..100).map(|i| format!("<p id=\"p{i}\">line</p>")).collect();
    let doc = parse_document_str(&html);
    let options = FlowOptions {
        viewport_width: 400.0,
        viewport_height: 200.0,
        line_height: 20.0,
        vertical: false,
    };
    let layout = FlowLayout::with_scroll(&doc, options, 800.0, 0.0);
    assert_eq!(layout.metrics().scroll_width, 4000.0);
    let mut engine = PageEngine::new(doc, Box::new(layout), PageOptions::default());

    let locator = Locator::new("ch1.xhtml").with_locations(Locations::from_selector("#p0"));
    let enriched = engine.get_locator_fragments(&locator, false);
    let fragments = enriched.locations.expect("locations").fragments;
    assert!(fragments.contains(&"page=3".to_string()), "{fragments:?}");
    assert!(
        fragments.contains(&"totalPages=10".to_string()),
        "{fragments:?}"
    );
}

#[test]
fn visibility_tracks_the_marker() {
    let mut engine = engine_for(r#"<p id="a">one two</p><p id="b">three four</p>"#);
    let locator_a = Locator::new("ch1.xhtml").with_locations(Locations::from_dom_range(
        DomRange::span(CssBoundary::new("#a", 0), CssBoundary::new("#a", 3)),
    ));
    let locator_b = Locator::new("ch1.xhtml").with_locations(Locations::from_dom_range(
        DomRange::span(CssBoundary::new("#b", 0), CssBoundary::new("#b", 5)),
    ));

    engine.set_location(Some(&locator_a), false);
    assert!(engine.is_locator_visible(&locator_a));
    assert!(!engine.is_locator_visible(&locator_b));

    engine.set_location(Some(&locator_b), false);
    assert!(engine.is_locator_visible(&locator_b));
    assert!(!engine.is_locator_visible(&locator_a));
}

#[test]
fn unresolvable_locator_is_not_visible() {
    let mut engine = engine_for(r#"<p id="p">x</p>"#);
    let locator = Locator::new("ch1.xhtml").with_locations(Locations::from_selector("#gone"));
    assert!(!engine.is_locator_visible(&locator));
}

#[test]
fn locator_without_locations_defaults_to_visible() {
    let mut engine = engine_for(r#"<p id="p">x</p>"#);
    assert!(engine.is_locator_visible(&Locator::new("ch1.xhtml")));
}

#[test]
fn round_trip_preserves_the_visible_region() {
    // One 20px line per paragraph, 20px viewport, scrolled one line down:
    // only #p42 is on screen.
    let html = r#"<h1 id="ch1">One</h1><p id="p42">Hello world</p>"#;
    let options = FlowOptions {
        viewport_height: 20.0,
        ..FlowOptions::default()
    };
    let mut doc = parse_document_str(html);
    let layout = FlowLayout::with_scroll(&doc, options, 0.0, 20.0);

    // Resolve the original domRange and remember its geometry.
    let original = Locations::from_dom_range(DomRange::span(
        CssBoundary::new("#p42", 0),
        CssBoundary::new("#p42", 11),
    ));
    let range = resolve_locations(&mut doc, &layout, &original).expect("resolvable");
    let before = bounding_client_rect(&doc, &layout, &range);
    assert!(!before.is_zero());

    // Mark it, then derive a fresh locator from the resulting DOM state.
    let layout = FlowLayout::with_scroll(&doc, options, 0.0, 20.0);
    let mut engine = PageEngine::new(doc, Box::new(layout), PageOptions::default());
    let locator = Locator::new("ch1.xhtml").with_locations(original);
    engine.set_location(Some(&locator), false);
    engine.set_layout(Box::new(FlowLayout::with_scroll(
        engine.document(),
        options,
        0.0,
        20.0,
    )));
    let enriched = engine.get_locator_fragments(&Locator::new("ch1.xhtml"), true);
    assert_eq!(
        enriched.locations.as_ref().and_then(|l| l.css_selector.as_deref()),
        Some("#p42")
    );

    // Feeding the derived locator back in addresses the same region.
    engine.set_location(Some(&enriched), false);
    let derived = enriched.locations.expect("locations");
    let layout = FlowLayout::with_scroll(engine.document(), options, 0.0, 20.0);
    let range = resolve_locations(engine.document_mut(), &layout, &derived).expect("resolvable");
    let after = bounding_client_rect(engine.document(), &layout, &range);

    assert!((before.top - after.top).abs() < 1e-6, "{before:?} vs {after:?}");
    assert!((before.bottom - after.bottom).abs() < 1e-6);
    assert!((before.left - after.left).abs() < 1e-6);
    assert!((before.right - after.right).abs() < 1e-6);
}

#[test]
fn scroll_target_lands_within_bounds() {
    let html: String = (0..200).map(|i| format!("<p id=\"p{i}\">line</p>")).collect();
    let mut engine = engine_for(&html);

    for target in ["#p50", "#p100", "#p199"] {
        let locations = Locations::from_selector(target);
        let scroll = engine
            .scroll_to_locations(&locations, true, true)
            .unwrap_or_else(|| panic!("{target} should need scrolling"));
        assert!(
            (0.0..=1.0).contains(&scroll.progression),
            "{target}: {scroll:?}"
        );
    }
}

#[test]
fn defective_geometry_aborts_scroll() {
    // A hidden target forced visible still has no layout box, so its
    // bounding rect is all zeros and scrolling must abort.
    let mut engine = engine_for(r#"<p id="h" style="display: none"></p><p id="v">x</p>"#);
    let locations = Locations::from_selector("#h");
    assert!(engine.scroll_to_locations(&locations, true, true).is_none());
}
