//! Error types for locator resolution.

use thiserror::Error;

/// Errors that can occur while resolving a locator against the document.
///
/// Resolution failures are handled locally by the public engine operations:
/// they are logged together with the failing input and mapped to a sentinel
/// (`None`, `false`, or the unchanged input locator). Nothing in this crate
/// propagates a panic across the host boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("selector failed to parse: {selector}")]
    SelectorParse { selector: String },

    #[error("no element matches selector: {selector}")]
    SelectorNotFound { selector: String },

    #[error("char offset {offset} is at or past the end of the node's text")]
    OffsetOutOfRange { offset: u32 },

    #[error("locations carry no cssSelector, progression, or domRange")]
    NothingToResolve,

    #[error("no non-whitespace character found anywhere in the document")]
    NoNonWhitespace,

    #[error("fragment not found: {key}=")]
    MissingFragment { key: &'static str },

    #[error("malformed fragment: {fragment}")]
    InvalidFragment { fragment: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
