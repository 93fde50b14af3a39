//! One render → extract → emit pass.
//!
//! Stages run strictly in sequence. A render failure stops the run before
//! anything is written, leaving any previous feed file as it was. An empty
//! extraction is reported and also writes nothing.

use crate::error::PipelineError;
use crate::models::PipelineConfig;
use crate::outputs::{json, rss};
use crate::render::Renderer;
use crate::scrapers::press_releases::ArticleExtractor;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed was written to `path`.
    Published {
        path: PathBuf,
        items: usize,
        skipped: usize,
        document: String,
    },
    /// No candidate blocks survived extraction; nothing was written.
    NothingToPublish,
}

/// Run the whole pipeline once against `config.target_url`.
///
/// The extractor is built before the renderer is called, so bad selector
/// rules fail without opening a browser.
///
/// # Arguments
///
/// * `renderer` - Produces the rendered markup for the target page
/// * `config` - Target, output paths, selector rules and feed metadata
///
/// # Returns
///
/// [`RunOutcome::Published`] after the feed was written,
/// [`RunOutcome::NothingToPublish`] when no article survived extraction, or
/// the fatal [`PipelineError`] that stopped the run.
///
/// # Examples
///
/// ```ignore
/// let renderer = WebDriverRenderer::new(config.render.clone());
/// match pipeline::run(&renderer, &config).await? {
///     RunOutcome::Published { items, .. } => info!(items, "published"),
///     RunOutcome::NothingToPublish => info!("nothing new"),
/// }
/// ```
#[instrument(level = "info", skip_all, fields(target = %config.target_url))]
pub async fn run<R: Renderer>(
    renderer: &R,
    config: &PipelineConfig,
) -> Result<RunOutcome, PipelineError> {
    let started = Instant::now();
    let extractor = ArticleExtractor::new(config.base_url.clone(), &config.selectors)?;

    info!("Rendering listing page");
    let markup = renderer.render(&config.target_url).await.map_err(|e| {
        error!(error = %e, "Rendering failed; leaving existing feed untouched");
        e
    })?;

    info!("Extracting articles");
    let extraction = extractor.extract(&markup);
    for skipped in &extraction.skipped {
        debug!(index = skipped.index, reason = %skipped.reason, "Candidate block left out of feed");
    }
    if extraction.is_empty() {
        info!("No articles found; check the candidate selectors. Nothing to publish");
        return Ok(RunOutcome::NothingToPublish);
    }
    info!(count = extraction.articles.len(), "Found articles");

    info!(path = %config.output_path.display(), "Generating RSS feed");
    let document = rss::write_feed(&config.feed, &extraction.articles, &config.output_path)
        .map_err(|e| {
            error!(error = %e, "Failed to write RSS feed");
            e
        })?;

    if let Some(json_path) = &config.json_output_path {
        if let Err(e) = json::write_articles(&config.feed, &extraction.articles, json_path) {
            error!(path = %json_path.display(), error = %e, "Failed to write JSON dump");
        }
    }

    info!(
        elapsed = ?started.elapsed(),
        items = extraction.articles.len(),
        skipped = extraction.skipped.len(),
        undated = extraction.undated,
        "Pipeline complete"
    );
    Ok(RunOutcome::Published {
        path: config.output_path.clone(),
        items: extraction.articles.len(),
        skipped: extraction.skipped.len(),
        document,
    })
}
