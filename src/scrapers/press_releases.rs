//! Press-release listing extractor.
//!
//! The listing markup is not under our control and its class names drift, so
//! every lookup goes through an ordered selector chain: the most specific
//! selector first, broader ones after it, first hit wins. Candidate blocks are
//! located the same way.
//!
//! Each block yields an [`ItemOutcome`]. A block that breaks our structural
//! assumptions is skipped and reported without affecting its siblings.

use crate::error::{ExtractorError, ItemError};
use crate::models::{
    ArticleRecord, Extraction, ItemOutcome, LINK_PLACEHOLDER, SUMMARY_PLACEHOLDER,
    TITLE_PLACEHOLDER,
};
use crate::scrapers::dates::normalize_date;
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Selector chains, in trial order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRules {
    pub candidates: &'static [&'static str],
    pub title: &'static [&'static str],
    pub link: &'static [&'static str],
    pub date: &'static [&'static str],
    pub summary: &'static [&'static str],
}

impl Default for SelectorRules {
    fn default() -> Self {
        Self {
            candidates: &[".article-item", "article", ".news-item"],
            title: &[".article-title", "h2", "h3"],
            link: &["a"],
            date: &[".article-date", ".date"],
            summary: &[".article-summary", "p"],
        }
    }
}

/// A compiled, ordered list of selectors.
#[derive(Debug)]
struct Chain {
    name: &'static str,
    sources: &'static [&'static str],
    selectors: Vec<Selector>,
}

impl Chain {
    fn compile(name: &'static str, sources: &'static [&'static str]) -> Result<Self, ExtractorError> {
        let selectors = sources
            .iter()
            .map(|s| {
                Selector::parse(s).map_err(|e| ExtractorError::Selector {
                    chain: name,
                    selector: s.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            sources,
            selectors,
        })
    }

    /// Collapsed text of the first element matched by the first selector
    /// that yields non-empty text.
    fn first_text(&self, block: ElementRef<'_>) -> Option<String> {
        let found = self.selectors.iter().find_map(|sel| {
            block
                .select(sel)
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .find(|text| !text.is_empty())
        });
        if found.is_none() {
            debug!(chain = self.name, tried = ?self.sources, "No selector yielded text");
        }
        found
    }

    /// First element matched by the first selector with any match.
    fn first_element<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors.iter().find_map(|sel| block.select(sel).next())
    }
}

/// Turns rendered listing markup into [`ArticleRecord`]s.
#[derive(Debug)]
pub struct ArticleExtractor {
    base_url: Url,
    candidates: Chain,
    title: Chain,
    link: Chain,
    date: Chain,
    summary: Chain,
}

impl ArticleExtractor {
    /// Compile `rules` into an extractor that resolves links against `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base for turning relative hrefs into absolute links
    /// * `rules` - Candidate and per-field selector chains, in trial order
    ///
    /// # Returns
    ///
    /// The extractor, or [`ExtractorError::Selector`] naming the first rule
    /// that is not valid CSS.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let base = Url::parse("https://firstwordpharma.com")?;
    /// let extractor = ArticleExtractor::new(base, &SelectorRules::default())?;
    /// ```
    pub fn new(base_url: Url, rules: &SelectorRules) -> Result<Self, ExtractorError> {
        Ok(Self {
            base_url,
            candidates: Chain::compile("candidate", rules.candidates)?,
            title: Chain::compile("title", rules.title)?,
            link: Chain::compile("link", rules.link)?,
            date: Chain::compile("date", rules.date)?,
            summary: Chain::compile("summary", rules.summary)?,
        })
    }

    /// Extract every article from `markup`, in document order.
    ///
    /// Never fails: finding no candidates gives an empty [`Extraction`], and
    /// broken blocks end up in [`Extraction::skipped`].
    ///
    /// # Arguments
    ///
    /// * `markup` - Rendered page source
    ///
    /// # Returns
    ///
    /// The extracted records with skip diagnostics and the count of records
    /// whose date fell back to now.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let extraction = extractor.extract(r#"<div class="article-item"><h2>Hi</h2></div>"#);
    /// assert_eq!(extraction.articles[0].title, "Hi");
    /// ```
    #[instrument(level = "info", skip_all, fields(bytes = markup.len()))]
    pub fn extract(&self, markup: &str) -> Extraction {
        let document = Html::parse_document(markup);
        let root = document.root_element();
        let mut extraction = Extraction::default();

        let Some((selector, blocks)) = self.candidate_blocks(root) else {
            info!(tried = ?self.candidates.sources, "No candidate blocks matched any selector");
            return extraction;
        };
        info!(%selector, count = blocks.len(), "Matched candidate blocks");

        for (index, block) in blocks.into_iter().enumerate() {
            let (outcome, undated) = self.extract_block(block);
            match &outcome {
                ItemOutcome::Extracted(record) => {
                    debug!(index, title = %record.title, link = %record.link, "Extracted article");
                    if undated {
                        extraction.undated += 1;
                    }
                }
                ItemOutcome::Skipped(reason) => {
                    warn!(index, error = %reason, "Skipping candidate block");
                }
            }
            extraction.push(index, outcome);
        }

        info!(
            extracted = extraction.articles.len(),
            skipped = extraction.skipped.len(),
            undated = extraction.undated,
            "Extraction complete"
        );
        extraction
    }

    fn candidate_blocks<'a>(&self, root: ElementRef<'a>) -> Option<(&'static str, Vec<ElementRef<'a>>)> {
        self.candidates
            .selectors
            .iter()
            .zip(self.candidates.sources)
            .find_map(|(sel, source)| {
                let blocks: Vec<_> = root.select(sel).collect();
                if blocks.is_empty() {
                    debug!(selector = %source, "Candidate selector matched nothing");
                    None
                } else {
                    Some((*source, blocks))
                }
            })
    }

    /// Build a record from one block. The flag is `true` when the date fell back.
    fn extract_block(&self, block: ElementRef<'_>) -> (ItemOutcome, bool) {
        let title = self.title.first_text(block);
        let anchor = self.link.first_element(block);
        let summary = self.summary.first_text(block);

        if title.is_none() && anchor.is_none() && summary.is_none() {
            return (ItemOutcome::Skipped(ItemError::EmptyBlock), false);
        }

        let link = match anchor.and_then(|a| a.value().attr("href")) {
            Some(href) => match self.resolve_link(href) {
                Ok(link) => link,
                Err(e) => return (ItemOutcome::Skipped(e), false),
            },
            None => LINK_PLACEHOLDER.to_string(),
        };

        let date_text = self.date.first_text(block);
        let (published, undated) = normalize_date(date_text.as_deref());

        let record = ArticleRecord {
            title: title.unwrap_or_else(|| TITLE_PLACEHOLDER.to_string()),
            link,
            published,
            summary: summary.unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string()),
        };
        (ItemOutcome::Extracted(record), undated)
    }

    /// Join `href` onto the base URL; non-navigable targets give the placeholder.
    fn resolve_link(&self, href: &str) -> Result<String, ItemError> {
        let href = href.trim();
        if !is_navigable(href) {
            return Ok(LINK_PLACEHOLDER.to_string());
        }
        self.base_url
            .join(href)
            .map(String::from)
            .map_err(|source| ItemError::InvalidLink {
                href: href.to_string(),
                source,
            })
    }
}

fn is_navigable(href: &str) -> bool {
    !(href.is_empty()
        || href.starts_with('#')
        || href.get(..11).is_some_and(|p| p.eq_ignore_ascii_case("javascript:")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn extractor(base: &str) -> ArticleExtractor {
        ArticleExtractor::new(Url::parse(base).unwrap(), &SelectorRules::default()).unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>River</title></head><body>{body}</body></html>")
    }

    #[test]
    fn test_primary_selector_one_record_per_block_in_order() {
        let html = page(
            r#"
            <div class="article-item">
              <h2 class="article-title">First release</h2>
              <a href="/news/1">Read</a>
              <span class="article-date">January 15, 2024</span>
              <p class="article-summary">First summary</p>
            </div>
            <div class="article-item">
              <h2 class="article-title">Second release</h2>
              <a href="/news/2">Read</a>
              <span class="article-date">2024-02-20</span>
              <p class="article-summary">Second summary</p>
            </div>
            <article><h2>Not a primary match</h2></article>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);

        assert_eq!(out.articles.len(), 2);
        assert!(out.skipped.is_empty());
        assert_eq!(out.undated, 0);
        assert_eq!(out.articles[0].title, "First release");
        assert_eq!(out.articles[0].link, "https://example.com/news/1");
        assert_eq!(
            out.articles[0].published,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(out.articles[0].summary, "First summary");
        assert_eq!(out.articles[1].title, "Second release");
        assert_eq!(
            out.articles[1].published,
            Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_falls_back_to_article_elements() {
        let html = page(
            r#"
            <article><h2>A</h2><a href="/a">x</a><p>a</p></article>
            <article><h2>B</h2><a href="/b">x</a><p>b</p></article>
            <article><h2>C</h2><a href="/c">x</a><p>c</p></article>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);
        let titles: Vec<_> = out.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn test_falls_back_to_news_item_class() {
        let html = page(
            r#"
            <li class="news-item"><h3>Only h3</h3><a href="https://other.org/x">x</a><p>s</p></li>
            <li class="news-item"><h3>Second</h3><a href="/y">y</a><p>t</p></li>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles.len(), 2);
        assert_eq!(out.articles[0].title, "Only h3");
        assert_eq!(out.articles[0].link, "https://other.org/x");
        assert_eq!(out.articles[1].link, "https://example.com/y");
    }

    #[test]
    fn test_no_candidates_is_empty_not_error() {
        let out = extractor("https://example.com").extract(&page("<div>nothing here</div>"));
        assert!(out.is_empty());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn test_empty_markup() {
        assert!(extractor("https://example.com").extract("").is_empty());
    }

    #[test]
    fn test_field_chain_order() {
        let html = page(
            r#"
            <div class="article-item">
              <h3>Third choice</h3>
              <h2>Second choice</h2>
              <span class="article-title">First choice</span>
              <p>Generic paragraph</p>
              <div class="article-summary">Specific summary</div>
              <span class="date">2024-01-01</span>
              <span class="article-date">2024-06-30</span>
              <a href="/z">z</a>
            </div>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);
        let a = &out.articles[0];
        assert_eq!(a.title, "First choice");
        assert_eq!(a.summary, "Specific summary");
        assert_eq!(a.published, Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_title_node_falls_through() {
        let html = page(
            r#"<div class="article-item"><span class="article-title">  </span><h2>Heading</h2><p>s</p></div>"#,
        );
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles[0].title, "Heading");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let html = page(
            "<div class=\"article-item\"><h2>\n  Multi\n   line\t title </h2><p>a  <b>bold</b>\nsummary</p></div>",
        );
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles[0].title, "Multi line title");
        assert_eq!(out.articles[0].summary, "a bold summary");
    }

    #[test]
    fn test_relative_link_resolution() {
        let html = page(r#"<div class="article-item"><h2>T</h2><a href="/news/123">r</a></div>"#);
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles[0].link, "https://example.com/news/123");
    }

    #[test]
    fn test_placeholders_when_fields_missing() {
        let html = page(r#"<div class="article-item"><h2>Only a title</h2></div>"#);
        let out = extractor("https://example.com").extract(&html);
        let a = &out.articles[0];
        assert_eq!(a.title, "Only a title");
        assert_eq!(a.link, LINK_PLACEHOLDER);
        assert_eq!(a.summary, SUMMARY_PLACEHOLDER);
        assert_eq!(out.undated, 1);
    }

    #[test]
    fn test_non_navigable_hrefs_use_placeholder() {
        for href in ["", "#", "#top", "javascript:void(0)", "JavaScript:open()"] {
            let html = page(&format!(
                r#"<div class="article-item"><h2>T</h2><a href="{href}">x</a></div>"#
            ));
            let out = extractor("https://example.com").extract(&html);
            assert_eq!(out.articles[0].link, LINK_PLACEHOLDER, "href {href:?}");
        }
    }

    #[test]
    fn test_anchor_without_href_uses_placeholder() {
        let html = page(r#"<div class="article-item"><a name="x">T</a><p>s</p></div>"#);
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles[0].link, LINK_PLACEHOLDER);
        assert_eq!(out.articles[0].title, TITLE_PLACEHOLDER);
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let html = page(
            r#"<div class="article-item"><h2>T</h2><span class="date">sometime soon</span></div>"#,
        );
        let before = Utc::now();
        let out = extractor("https://example.com").extract(&html);
        let after = Utc::now();
        let published = out.articles[0].published;
        assert!(published >= before && published <= after);
        assert_eq!(out.undated, 1);
    }

    #[test]
    fn test_empty_block_is_skipped_without_touching_siblings() {
        let html = page(
            r#"
            <div class="article-item"><h2>One</h2><a href="/1">x</a><p>s1</p></div>
            <div class="article-item"><span class="article-date">2024-01-01</span></div>
            <div class="article-item"><h2>Three</h2><a href="/3">x</a><p>s3</p></div>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);

        assert_eq!(out.articles.len(), 2);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].index, 1);
        assert_eq!(out.skipped[0].reason, ItemError::EmptyBlock);
        assert_eq!(out.articles[0].title, "One");
        assert_eq!(out.articles[0].link, "https://example.com/1");
        assert_eq!(out.articles[0].summary, "s1");
        assert_eq!(out.articles[1].title, "Three");
        assert_eq!(out.articles[1].link, "https://example.com/3");
        assert_eq!(out.articles[1].summary, "s3");
    }

    #[test]
    fn test_unresolvable_href_is_skipped() {
        let html = page(
            r#"
            <div class="article-item"><h2>Good</h2><a href="/ok">x</a></div>
            <div class="article-item"><h2>Bad</h2><a href="http://[oops">x</a></div>
            "#,
        );
        let out = extractor("https://example.com").extract(&html);
        assert_eq!(out.articles.len(), 1);
        assert_eq!(out.articles[0].title, "Good");
        assert!(matches!(
            &out.skipped[0].reason,
            ItemError::InvalidLink { href, .. } if href == "http://[oops"
        ));
    }

    #[test]
    fn test_invalid_selector_rejected_at_construction() {
        let rules = SelectorRules {
            title: &["h2[[["],
            ..SelectorRules::default()
        };
        let err = ArticleExtractor::new(Url::parse("https://example.com").unwrap(), &rules)
            .unwrap_err();
        assert!(matches!(err, ExtractorError::Selector { chain: "title", .. }));
    }

    #[test]
    fn test_is_navigable() {
        assert!(is_navigable("/news/1"));
        assert!(is_navigable("https://example.com"));
        assert!(is_navigable("relative/path"));
        assert!(!is_navigable(""));
        assert!(!is_navigable("#anchor"));
        assert!(!is_navigable("javascript:alert(1)"));
    }
}
