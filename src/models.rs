//! Data models shared by the extractor, the feed emitter and the pipeline.
//!
//! - [`ArticleRecord`]: one normalized press release
//! - [`FeedMetadata`]: static channel-level information
//! - [`Extraction`]: the result of one extraction pass, with skip diagnostics
//! - [`PipelineConfig`]: the immutable configuration for a run

use crate::error::ItemError;
use crate::scrapers::press_releases::SelectorRules;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Title used when no title node yields text.
pub const TITLE_PLACEHOLDER: &str = "No title";
/// Link used when the block has no navigable anchor.
pub const LINK_PLACEHOLDER: &str = "#";
/// Summary used when no summary node yields text.
pub const SUMMARY_PLACEHOLDER: &str = "No summary available";

/// A press release as scraped from the listing page.
///
/// Every field is always populated: missing values are replaced by the
/// placeholder constants above, and a missing or unparseable date becomes the
/// extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Headline text.
    pub title: String,
    /// Absolute URL of the release, or [`LINK_PLACEHOLDER`].
    pub link: String,
    /// Publication time, normalized to UTC.
    pub published: DateTime<Utc>,
    /// Teaser or summary text.
    pub summary: String,
}

impl ArticleRecord {
    /// `true` when the link points somewhere real.
    pub fn has_link(&self) -> bool {
        self.link != LINK_PLACEHOLDER
    }
}

/// Channel-level feed information. Never derived from scraped data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedMetadata {
    pub title: String,
    /// Canonical page the feed mirrors (the channel's alternate link).
    pub link: String,
    pub description: String,
    /// Language code such as `en`.
    pub language: String,
}

/// Outcome for a single candidate block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Extracted(ArticleRecord),
    Skipped(ItemError),
}

/// A candidate block that was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Position of the block among the matched candidates.
    pub index: usize,
    pub reason: ItemError,
}

/// Result of one extraction pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Extracted records in document order.
    pub articles: Vec<ArticleRecord>,
    /// Blocks that failed structural assumptions.
    pub skipped: Vec<SkippedItem>,
    /// Number of records whose timestamp fell back to extraction time.
    pub undated: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Fold one block's outcome into the aggregate.
    pub(crate) fn push(&mut self, index: usize, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Extracted(record) => self.articles.push(record),
            ItemOutcome::Skipped(reason) => self.skipped.push(SkippedItem { index, reason }),
        }
    }
}

/// Settings for the headless browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// WebDriver endpoint, for example a local chromedriver.
    pub webdriver_url: String,
    /// CSS selector whose presence means the listing has rendered.
    pub content_marker: String,
    /// Bound on the wait for `content_marker`.
    pub wait_timeout: Duration,
    /// How long the resource count must stay flat to count as idle.
    pub idle_window: Duration,
    /// Upper bound on the network-idle heuristic.
    pub navigation_timeout: Duration,
    pub headless: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            content_marker: ".article-item".to_string(),
            wait_timeout: Duration::from_secs(10),
            idle_window: Duration::from_millis(500),
            navigation_timeout: Duration::from_secs(30),
            headless: true,
        }
    }
}

/// Everything a run needs, fixed before the pipeline starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Listing page to render.
    pub target_url: Url,
    /// Base for resolving relative article links.
    pub base_url: Url,
    /// Where the RSS document is written.
    pub output_path: PathBuf,
    /// Optional JSON dump of the extracted records.
    pub json_output_path: Option<PathBuf>,
    pub render: RenderSettings,
    /// Candidate and field selector chains for the extractor.
    pub selectors: SelectorRules,
    pub feed: FeedMetadata,
}
