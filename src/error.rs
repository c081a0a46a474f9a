//! Structured error types for the stencil engine.
//!
//! Nothing here is fatal: every public operation returns a `Result` and
//! leaves the template model in a usable state. Best-effort enrichments
//! (natural-size probes, bound-value fetches) never surface here at all;
//! they degrade to an empty value or a no-op.

use std::fmt;

use thiserror::Error;

/// The unified error type returned by all public stencil API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// Template JSON failed to parse. The previous in-memory template is
    /// left untouched by the import path.
    #[error("invalid template file: {source}{hint}")]
    TemplateParse {
        source: serde_json::Error,
        hint: ParseHint,
    },

    /// Filled-values JSON failed to parse. Field values are left untouched.
    #[error("invalid values file: {source}{hint}")]
    ValuesParse {
        source: serde_json::Error,
        hint: ParseHint,
    },

    /// An upload that was supposed to be a PDF wasn't one.
    #[error("not a PDF file (missing %PDF header)")]
    NotAPdf,

    /// The rasterization collaborator failed. All-or-nothing: no partial
    /// background set is ever recorded.
    #[error("page rasterization failed: {0}")]
    Raster(String),

    /// Export was requested before any page background was recorded.
    #[error("no page backgrounds recorded; upload a PDF background first")]
    MissingBackgrounds,

    /// An image payload could not be decoded or embedded.
    #[error("image payload rejected: {0}")]
    Image(String),

    /// The project data service could not be reached.
    #[error("project service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The project data service answered with a non-2xx status. The
    /// `detail` message comes from the service's error body.
    #[error("project service error: {detail}")]
    Service { detail: String },
}

impl Error {
    pub fn template_parse(source: serde_json::Error) -> Self {
        let hint = ParseHint::for_error(&source);
        Error::TemplateParse { source, hint }
    }

    pub fn values_parse(source: serde_json::Error) -> Self {
        let hint = ParseHint::for_error(&source);
        Error::ValuesParse { source, hint }
    }
}

/// A human-oriented hint derived from `serde_json::Error::classify`.
///
/// Renders as an indented second line, or as nothing when there is no
/// useful hint to give.
#[derive(Debug)]
pub struct ParseHint(&'static str);

impl ParseHint {
    pub fn for_error(err: &serde_json::Error) -> Self {
        let hint = match err.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters"
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but doesn't match the expected shape; check key names and types"
            }
            serde_json::error::Category::Eof => "unexpected end of input; is the file truncated?",
            serde_json::error::Category::Io => "",
        };
        ParseHint(hint)
    }
}

impl fmt::Display for ParseHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "\n  hint: {}", self.0)
        }
    }
}
