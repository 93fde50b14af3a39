//! JSON dump of the extracted records.
//!
//! Written alongside the feed when `--json-output` is given, for pipelines
//! that would rather not parse RSS. Timestamps are RFC 3339.
//!
//! ```json
//! {
//!   "generated_at": "2024-02-01T12:30:00Z",
//!   "feed": { "title": "...", "link": "...", "description": "...", "language": "en" },
//!   "articles": [ { "title": "...", "link": "...", "published": "...", "summary": "..." } ]
//! }
//! ```

use crate::error::FeedError;
use crate::models::{ArticleRecord, FeedMetadata};
use crate::outputs::persist_atomically;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    generated_at: DateTime<Utc>,
    feed: &'a FeedMetadata,
    articles: &'a [ArticleRecord],
}

/// Write `records` as pretty-printed JSON to `path`, replacing any prior file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_articles(
    metadata: &FeedMetadata,
    records: &[ArticleRecord],
    path: &Path,
) -> Result<(), FeedError> {
    let snapshot = Snapshot {
        generated_at: Utc::now(),
        feed: metadata,
        articles: records,
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    persist_atomically(path, json.as_bytes())?;
    info!(count = records.len(), "Wrote JSON article dump");
    Ok(())
}
