//! # Press Release RSS
//!
//! Turns a JavaScript-rendered press-release listing into an RSS 2.0 feed.
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=9515 &
//! press_release_rss -o firstwordpharma_press_releases.xml
//! ```
//!
//! ## Architecture
//!
//! Each run is a single linear pass:
//! 1. **Rendering**: drive a headless browser until the listing has rendered
//! 2. **Extraction**: locate article blocks through fallback selector chains
//!    and normalize each into a record
//! 3. **Output**: serialize the records as RSS and atomically replace the feed file
//!
//! A render failure ends the run before anything is written, so the previous
//! feed survives. Finding no articles is reported but is not an error.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod models;
mod outputs;
mod pipeline;
mod render;
mod scrapers;
mod utils;

use cli::Cli;
use pipeline::RunOutcome;
use render::WebDriverRenderer;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("press_release_rss starting up");

    let args = Cli::parse();
    let print = args.print;
    let config = args.into_config();
    debug!(?config, "Resolved configuration");

    // Fail on a bad output path before paying for a browser session
    if let Err(e) = ensure_writable_parent(&config.output_path).await {
        error!(
            path = %config.output_path.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let renderer = WebDriverRenderer::new(config.render.clone());
    match pipeline::run(&renderer, &config).await {
        Ok(RunOutcome::Published {
            path,
            items,
            skipped,
            document,
        }) => {
            info!(path = %path.display(), items, skipped, "RSS feed published");
            if print {
                print!("{document}");
            }
        }
        Ok(RunOutcome::NothingToPublish) => {
            info!("No articles found; existing feed left as is");
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            return Err(e.into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
