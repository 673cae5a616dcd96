//! The host request/response boundary.
//!
//! Hosts drive the engine with JSON messages: one request object in, one
//! response value out. The shapes mirror the locator model's camelCase
//! contract. A malformed request never panics; it produces an `error`
//! response.

use log::{error, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::engine::{MarkerRemoval, PageEngine, PageOptions};
use crate::locator::{Locations, Locator};

/// One host request, dispatched on the `op` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    SetLocation {
        locator: Option<Locator>,
        #[serde(default)]
        is_audio_book_with_text: bool,
    },
    #[serde(rename_all = "camelCase")]
    ScrollToLocations {
        locations: Locations,
        #[serde(default)]
        is_vertical_scroll: bool,
        #[serde(default)]
        to_start: bool,
    },
    #[serde(rename_all = "camelCase")]
    IsLocatorVisible { locator: Locator },
    #[serde(rename_all = "camelCase")]
    GetLocatorFragments {
        locator: Locator,
        #[serde(default)]
        is_vertical_scroll: bool,
    },
    IsReaderReady,
}

/// Handle one raw request string, producing the response as a JSON string.
pub fn handle_request(engine: &mut PageEngine, input: &str) -> String {
    let response = match serde_json::from_str::<Request>(input) {
        Ok(request) => dispatch(engine, request),
        Err(err) => {
            error!("bad request: {err}");
            json!({ "error": err.to_string() })
        }
    };
    response.to_string()
}

fn dispatch(engine: &mut PageEngine, request: Request) -> Value {
    match request {
        Request::SetLocation {
            locator,
            is_audio_book_with_text,
        } => {
            let frame = engine.set_location(locator.as_ref(), is_audio_book_with_text);
            json!({ "comicFrame": frame })
        }
        Request::ScrollToLocations {
            locations,
            is_vertical_scroll,
            to_start,
        } => {
            let target = engine.scroll_to_locations(&locations, is_vertical_scroll, to_start);
            json!({ "scrollTarget": target })
        }
        Request::IsLocatorVisible { locator } => {
            json!({ "visible": engine.is_locator_visible(&locator) })
        }
        Request::GetLocatorFragments {
            locator,
            is_vertical_scroll,
        } => {
            let enriched = engine.get_locator_fragments(&locator, is_vertical_scroll);
            json!({ "locator": enriched })
        }
        Request::IsReaderReady => json!({ "ready": engine.is_reader_ready() }),
    }
}

/// Wire form of [`PageOptions`]. Unknown keys are tolerated but logged so a
/// host/engine version skew is diagnosable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageOptionsWire {
    #[serde(default)]
    fixed_layout: bool,
    #[serde(default)]
    comic_book: bool,
    #[serde(default)]
    marker_removal: MarkerRemoval,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

/// Parse engine options from host-supplied JSON.
pub fn parse_page_options(input: &str) -> crate::error::Result<PageOptions> {
    let wire: PageOptionsWire = serde_json::from_str(input)?;
    for key in wire.extra.keys() {
        warn!("unknown page option: {key}");
    }
    Ok(PageOptions {
        fixed_layout: wire.fixed_layout,
        comic_book: wire.comic_book,
        marker_removal: wire.marker_removal,
    })
}
