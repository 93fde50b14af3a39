//! Headless-browser rendering of the listing page.
//!
//! The listing is assembled client-side, so a plain HTTP fetch sees an empty
//! shell. [`WebDriverRenderer`] drives Chrome through a WebDriver endpoint
//! (chromedriver by default), waits for the page to settle, and snapshots
//! the resulting DOM as markup.
//!
//! # Readiness
//!
//! 1. Navigate and poll until `document.readyState` is `complete` and the
//!    resource-timing count has stopped growing for the idle window. This is
//!    a heuristic; running out of budget only logs a warning.
//! 2. Wait for the content marker selector. Not seeing it in time is a hard
//!    [`RenderError::Timeout`].
//!
//! The browser session is closed on every exit path before the result is
//! returned.

use crate::error::RenderError;
use crate::models::RenderSettings;
use crate::utils::truncate_for_log;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const IDLE_PROBE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// Anything that can turn a URL into rendered markup.
pub trait Renderer {
    async fn render(&self, url: &Url) -> Result<String, RenderError>;
}

/// [`Renderer`] backed by a WebDriver session.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    settings: RenderSettings,
}

impl WebDriverRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    async fn connect(&self) -> Result<Session, RenderError> {
        let endpoint = &self.settings.webdriver_url;
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(self.settings.headless))
            .connect(endpoint)
            .await
            .map_err(|e| RenderError::Session {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;
        info!(%endpoint, headless = self.settings.headless, "Browser session opened");
        Ok(Session {
            client: Some(client),
        })
    }

    async fn load(&self, client: &Client, url: &Url) -> Result<String, RenderError> {
        client
            .goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.wait_for_network_idle(client).await;

        let marker = &self.settings.content_marker;
        let timeout = self.settings.wait_timeout;
        match client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(marker.as_str()))
            .await
        {
            Ok(_) => debug!(%marker, "Content marker present"),
            Err(CmdError::WaitTimeout) => {
                return Err(RenderError::Timeout {
                    marker: marker.clone(),
                    timeout,
                });
            }
            Err(e) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        }

        let markup = client
            .source()
            .await
            .map_err(|e| RenderError::Snapshot(e.to_string()))?;
        debug!(preview = %truncate_for_log(&markup, 300), "Rendered markup");
        Ok(markup)
    }

    /// Poll until the page looks idle or the navigation budget runs out.
    async fn wait_for_network_idle(&self, client: &Client) {
        let started = Instant::now();
        let deadline = started + self.settings.navigation_timeout;
        let mut tracker = IdleTracker::new(self.settings.idle_window);

        loop {
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    budget = ?self.settings.navigation_timeout,
                    "Page did not go idle within budget; continuing"
                );
                return;
            }
            let probe = match client.execute(IDLE_PROBE, vec![]).await {
                Ok(value) => parse_probe(&value),
                Err(e) => {
                    warn!(error = %e, "Idle probe failed; continuing");
                    return;
                }
            };
            let Some((ready, resources)) = probe else {
                warn!("Idle probe returned an unexpected shape; continuing");
                return;
            };
            if tracker.observe(ready, resources, now) {
                debug!(elapsed = ?started.elapsed(), resources, "Network idle");
                return;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }
}

impl Renderer for WebDriverRenderer {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn render(&self, url: &Url) -> Result<String, RenderError> {
        let mut session = self.connect().await?;
        let result = match session.client() {
            Some(client) => self.load(client, url).await,
            None => Err(RenderError::Snapshot("browser session already closed".to_string())),
        };
        session.close().await;
        if let Ok(markup) = &result {
            info!(bytes = markup.len(), "Rendered page");
        }
        result
    }
}

/// Owns the WebDriver client and guarantees the session gets closed.
///
/// [`Session::close`] is the normal path. If the owning future is dropped
/// early the `Drop` impl hands the close to the runtime instead.
struct Session {
    client: Option<Client>,
}

impl Session {
    fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            match client.close().await {
                Ok(()) => debug!("Browser session closed"),
                Err(e) => warn!(error = %e, "Failed to close browser session"),
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = client.close().await;
                });
            }
        }
    }
}

/// Chrome options for an isolated, throwaway profile.
fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--incognito", "--no-sandbox", "--disable-dev-shm-usage"];
    if headless {
        args.extend(["--headless", "--disable-gpu"]);
    }
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Decode the `[readyState, resourceCount]` pair returned by [`IDLE_PROBE`].
fn parse_probe(value: &Value) -> Option<(bool, u64)> {
    let ready = value.get(0)?.as_str()? == "complete";
    let resources = value.get(1)?.as_u64()?;
    Some((ready, resources))
}

/// Tracks whether the resource count has held still for `window`.
#[derive(Debug)]
struct IdleTracker {
    window: Duration,
    last: Option<(u64, Instant)>,
}

impl IdleTracker {
    fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record one probe; `true` once the page counts as idle.
    fn observe(&mut self, ready: bool, resources: u64, now: Instant) -> bool {
        if !ready {
            self.last = None;
            return false;
        }
        match self.last {
            Some((count, since)) if count == resources => now.duration_since(since) >= self.window,
            _ => {
                self.last = Some((resources, now));
                false
            }
        }
    }
}
