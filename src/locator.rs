//! The locator data model.
//!
//! A [`Locator`] is an addressable reading position: a resource identifier
//! plus an optional in-resource location and a list of free-form fragment
//! tags (`"page=3"`, `"toc=chapter1"`, `"duration=12.5"`). Locators are
//! immutable value objects; every transformation produces a new value.
//!
//! The JSON shape (camelCase, optionals omitted) is the contract with the
//! host layer; see [`crate::ops`] for the request/response boundary.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::error::{Error, Result};

/// An addressable reading position inside a publication.
///
/// A locator with `locations == None` is valid only as a resource-level
/// reference; it cannot be resolved to a point inside the resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    /// Opaque resource identifier (typically the resource href).
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Locations>,
    /// Free-form fragment tags attached at the locator level.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<String>,
}

impl Locator {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn with_locations(mut self, locations: Locations) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Selector addressing the locator, preferring the direct `cssSelector`
    /// over the one nested under `domRange.start`, then `domRange.end`.
    pub fn css_selector(&self) -> Option<&str> {
        self.locations.as_ref().and_then(Locations::css_selector)
    }
}

/// One or more ways of addressing a position within a resource.
///
/// At least one of `css_selector`, `progression`, `dom_range` must be present
/// for in-resource navigation to succeed; absence of all three is a
/// resolution failure, not a crash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Locations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_selector: Option<String>,
    /// Fractional position through the resource, in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression: Option<f64>,
    /// Fractional position through the whole publication, in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_progression: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_range: Option<DomRange>,
    /// Fragment tags attached at the locations level. This is where the
    /// original reader keeps synthesized fragments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fragments: Vec<String>,
}

impl Locations {
    pub fn from_selector(selector: impl Into<String>) -> Self {
        Self {
            css_selector: Some(selector.into()),
            ..Default::default()
        }
    }

    pub fn from_dom_range(dom_range: DomRange) -> Self {
        Self {
            dom_range: Some(dom_range),
            ..Default::default()
        }
    }

    pub fn css_selector(&self) -> Option<&str> {
        self.css_selector
            .as_deref()
            .or_else(|| {
                self.dom_range
                    .as_ref()
                    .map(|r| r.start.css_selector.as_str())
            })
            .or_else(|| {
                self.dom_range
                    .as_ref()
                    .and_then(|r| r.end.as_ref())
                    .map(|b| b.css_selector.as_str())
            })
    }
}

/// A span between two boundaries. Represents a point when `end` is absent or
/// equal to `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomRange {
    pub start: CssBoundary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<CssBoundary>,
}

impl DomRange {
    pub fn point(start: CssBoundary) -> Self {
        Self { start, end: None }
    }

    pub fn span(start: CssBoundary, end: CssBoundary) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// The end boundary, defaulting to the start when absent.
    pub fn end_or_start(&self) -> &CssBoundary {
        self.end.as_ref().unwrap_or(&self.start)
    }
}

/// A selector plus a character offset into the selected node's text content.
///
/// Offset 0 (or absent) means "at the node itself": no text split is needed.
/// Negative or fractional offsets are rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssBoundary {
    pub css_selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_offset: Option<u32>,
}

impl CssBoundary {
    pub fn new(selector: impl Into<String>, char_offset: impl Into<Option<u32>>) -> Self {
        Self {
            css_selector: selector.into(),
            char_offset: char_offset.into(),
        }
    }
}

/// A heading discovered in the document, used for TOC fragment synthesis.
///
/// `id` may be absent when the heading element itself carries no identifier
/// and the ancestor search found none either; such headings never produce a
/// `toc=` fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub node: NodeId,
    pub id: Option<String>,
    /// 1–6 from the heading tag; 0 for the section/body fallback.
    pub level: u8,
    pub text: String,
}

/// A comic-book frame navigation command surfaced by `setLocation` on
/// pre-paginated comic documents. The host drives the frame animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicFrame {
    pub css_selector: String,
    pub duration_ms: f64,
}

/// Extract the `duration=<seconds>` fragment value.
///
/// A missing or malformed duration is an error, never zero: audio sync must
/// not silently animate over a zero-length window.
pub fn duration_fragment(fragments: &[String]) -> Result<f64> {
    let fragment = fragments
        .iter()
        .find(|f| f.contains("duration="))
        .ok_or(Error::MissingFragment { key: "duration" })?;

    let value = &fragment[fragment.find("duration=").unwrap_or(0) + "duration=".len()..];
    // Accept `<digits>` or `<digits>.<digits>`, nothing fancier.
    let numeric = value
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .next()
        .unwrap_or("");
    if numeric.is_empty() || numeric.starts_with('.') || numeric.ends_with('.') {
        return Err(Error::InvalidFragment {
            fragment: fragment.clone(),
        });
    }
    numeric.parse::<f64>().map_err(|_| Error::InvalidFragment {
        fragment: fragment.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_fragment_present() {
        let fragments = vec![
            "foo=1".to_string(),
            "duration=12.5".to_string(),
            "bar=2".to_string(),
        ];
        assert_eq!(duration_fragment(&fragments).unwrap(), 12.5);
    }

    #[test]
    fn test_duration_fragment_missing() {
        let fragments = vec!["foo=1".to_string()];
        assert!(matches!(
            duration_fragment(&fragments),
            Err(Error::MissingFragment { key: "duration" })
        ));
    }

    #[test]
    fn test_duration_fragment_integer() {
        let fragments = vec!["duration=7".to_string()];
        assert_eq!(duration_fragment(&fragments).unwrap(), 7.0);
    }

    #[test]
    fn test_duration_fragment_malformed() {
        let fragments = vec!["duration=abc".to_string()];
        assert!(matches!(
            duration_fragment(&fragments),
            Err(Error::InvalidFragment { .. })
        ));
    }

    #[test]
    fn test_locator_json_shape() {
        let locator = Locator::new("chapter1.xhtml").with_locations(Locations {
            css_selector: Some("#p42".to_string()),
            progression: Some(0.25),
            ..Default::default()
        });

        let json = serde_json::to_value(&locator).unwrap();
        assert_eq!(json["href"], "chapter1.xhtml");
        assert_eq!(json["locations"]["cssSelector"], "#p42");
        assert_eq!(json["locations"]["progression"], 0.25);
        // Absent optionals are omitted entirely.
        assert!(json["locations"].get("domRange").is_none());
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_locator_json_unknown_fields_tolerated() {
        let json = r##"{
            "href": "ch1.xhtml",
            "type": "application/xhtml+xml",
            "locations": {"cssSelector": "#a", "position": 3}
        }"##;
        let locator: Locator = serde_json::from_str(json).unwrap();
        assert_eq!(locator.css_selector(), Some("#a"));
    }

    #[test]
    fn test_negative_char_offset_rejected() {
        let json = r##"{"cssSelector": "#a", "charOffset": -4}"##;
        assert!(serde_json::from_str::<CssBoundary>(json).is_err());
    }

    #[test]
    fn test_selector_falls_back_to_dom_range() {
        let locations = Locations::from_dom_range(DomRange::point(CssBoundary::new("#start", 5)));
        assert_eq!(locations.css_selector(), Some("#start"));
    }
}
