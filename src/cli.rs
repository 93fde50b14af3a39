//! Command-line interface definitions.
//!
//! Every option has a default that targets the FirstWordPharma press-release
//! river, so a bare invocation performs one run. URLs and the output path can
//! also be set through environment variables.

use crate::models::{FeedMetadata, PipelineConfig, RenderSettings};
use crate::scrapers::press_releases::SelectorRules;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TARGET_URL: &str = "https://firstwordpharma.com/river/type/Press%20Release";
pub const DEFAULT_BASE_URL: &str = "https://firstwordpharma.com";
pub const DEFAULT_OUTPUT: &str = "firstwordpharma_press_releases.xml";

/// Render a JavaScript press-release listing and publish it as RSS 2.0.
///
/// # Examples
///
/// ```sh
/// # Run once against the defaults (needs chromedriver on :9515)
/// press_release_rss
///
/// # Write somewhere else and keep a JSON copy
/// press_release_rss -o /srv/feeds/pharma.xml --json-output /srv/feeds/pharma.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to render
    #[arg(long, env = "PRESS_RSS_TARGET_URL", default_value = DEFAULT_TARGET_URL)]
    pub target_url: Url,

    /// Base URL for resolving relative article links
    #[arg(long, env = "PRESS_RSS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Path of the RSS file (overwritten on each successful run)
    #[arg(short, long, env = "PRESS_RSS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Optional path for a JSON copy of the extracted articles
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// WebDriver endpoint (chromedriver)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// CSS selector that signals the listing has rendered
    #[arg(long, default_value = ".article-item")]
    pub content_marker: String,

    /// Seconds to wait for the content marker
    #[arg(long, default_value_t = 10)]
    pub wait_timeout_secs: u64,

    /// Milliseconds without new network resources before the page counts as idle
    #[arg(long, default_value_t = 500)]
    pub idle_window_ms: u64,

    /// Upper bound in seconds on waiting for network idle
    #[arg(long, default_value_t = 30)]
    pub navigation_timeout_secs: u64,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Channel title
    #[arg(long, default_value = "FirstWordPharma Press Releases")]
    pub feed_title: String,

    /// Channel description
    #[arg(long, default_value = "Press releases from FirstWordPharma")]
    pub feed_description: String,

    /// Channel language code
    #[arg(long, default_value = "en")]
    pub feed_language: String,

    /// Also print the feed document to stdout
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    /// Freeze the parsed arguments into the run configuration.
    pub fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            feed: FeedMetadata {
                title: self.feed_title,
                link: self.target_url.to_string(),
                description: self.feed_description,
                language: self.feed_language,
            },
            target_url: self.target_url,
            base_url: self.base_url,
            output_path: self.output,
            json_output_path: self.json_output,
            render: RenderSettings {
                webdriver_url: self.webdriver_url,
                content_marker: self.content_marker,
                wait_timeout: Duration::from_secs(self.wait_timeout_secs),
                idle_window: Duration::from_millis(self.idle_window_ms),
                navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
                headless: !self.headed,
            },
            selectors: SelectorRules::default(),
        }
    }
}
