//! Error types for each pipeline stage.
//!
//! Rendering, feed writing and selector compilation failures are fatal for a
//! run and bubble up through [`PipelineError`]. [`ItemError`] is the only
//! recoverable kind: the extractor records it next to the skipped block and
//! moves on.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures while driving the headless browser.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The content marker never appeared within the wait budget.
    #[error("content marker `{marker}` did not appear within {timeout:?}")]
    Timeout { marker: String, timeout: Duration },
    /// The WebDriver session could not be opened.
    #[error("failed to open browser session at {endpoint}: {message}")]
    Session { endpoint: String, message: String },
    /// Navigation to the target page failed.
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    /// The rendered page source could not be read back.
    #[error("failed to snapshot page markup: {0}")]
    Snapshot(String),
}

/// Reasons a single candidate block is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("candidate block has no title, anchor or summary")]
    EmptyBlock,
    #[error("href `{href}` cannot be resolved: {source}")]
    InvalidLink {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Invalid extractor configuration, detected before any markup is read.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid {chain} selector `{selector}`: {message}")]
    Selector {
        chain: &'static str,
        selector: String,
        message: String,
    },
}

/// Failures while serializing or persisting the feed document.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("xml serialization failed: {0}")]
    Xml(#[source] io::Error),
    #[error("feed document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("cannot write feed to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors surfaced by [`crate::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}
