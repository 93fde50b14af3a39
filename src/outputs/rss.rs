//! RSS 2.0 document generation.
//!
//! The channel carries the static [`FeedMetadata`]; each [`ArticleRecord`]
//! becomes one `<item>` in the order given. Field contents are trusted as
//! normalized by the extractor and only escaped here.
//!
//! # Document Shape
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0">
//!   <channel>
//!     <title/> <link/> <description/> <language/>
//!     <lastBuildDate/> <generator/> <docs/>
//!     <item> <title/> <link/> <description/> <pubDate/> <guid/> </item> ...
//!   </channel>
//! </rss>
//! ```

use crate::error::FeedError;
use crate::models::{ArticleRecord, FeedMetadata};
use crate::outputs::persist_atomically;
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
const RSS_DOCS: &str = "https://www.rssboard.org/rss-specification";

/// Serialize `records` into an RSS 2.0 document.
///
/// `lastBuildDate` is stamped with the current time.
///
/// # Arguments
///
/// * `metadata` - Channel title, link, description and language
/// * `records` - Items to emit, in feed order
///
/// # Returns
///
/// The complete UTF-8 document, XML declaration included. An empty `records`
/// slice gives a valid channel with no items.
///
/// # Examples
///
/// ```ignore
/// let xml = render_feed(&metadata, &[])?;
/// assert!(xml.contains("<rss version=\"2.0\">"));
/// ```
pub fn render_feed(metadata: &FeedMetadata, records: &[ArticleRecord]) -> Result<String, FeedError> {
    render_feed_at(metadata, records, Utc::now())
}

/// Like [`render_feed`] with an explicit `lastBuildDate`.
pub fn render_feed_at(
    metadata: &FeedMetadata,
    records: &[ArticleRecord],
    built: DateTime<Utc>,
) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, metadata, records, built).map_err(FeedError::Xml)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

/// Render the feed, replace the file at `path` with it, and return the document.
///
/// The previous file stays intact if anything fails before the final rename.
///
/// # Arguments
///
/// * `metadata` - Channel-level feed information
/// * `records` - Items to emit, in feed order
/// * `path` - Destination file; its parent directory must already exist
///
/// # Returns
///
/// The document that was written, or [`FeedError::Io`] if the temp file
/// could not be created, written or renamed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), items = records.len()))]
pub fn write_feed(
    metadata: &FeedMetadata,
    records: &[ArticleRecord],
    path: &Path,
) -> Result<String, FeedError> {
    let document = render_feed(metadata, records)?;
    persist_atomically(path, document.as_bytes())?;
    info!(bytes = document.len(), "Wrote RSS feed");
    Ok(document)
}

fn write_document<W: Write>(
    w: &mut Writer<W>,
    metadata: &FeedMetadata,
    records: &[ArticleRecord],
    built: DateTime<Utc>,
) -> std::io::Result<()> {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    w.write_event(Event::Start(rss))?;
    w.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(w, "title", &metadata.title)?;
    write_text_element(w, "link", &metadata.link)?;
    write_text_element(w, "description", &metadata.description)?;
    write_text_element(w, "language", &metadata.language)?;
    write_text_element(w, "lastBuildDate", &built.to_rfc2822())?;
    write_text_element(w, "generator", GENERATOR)?;
    write_text_element(w, "docs", RSS_DOCS)?;

    for record in records {
        write_item(w, record)?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    w.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

fn write_item<W: Write>(w: &mut Writer<W>, record: &ArticleRecord) -> std::io::Result<()> {
    w.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(w, "title", &record.title)?;
    write_text_element(w, "link", &record.link)?;
    write_text_element(w, "description", &record.summary)?;
    write_text_element(w, "pubDate", &record.published.to_rfc2822())?;
    if record.has_link() {
        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        w.write_event(Event::Start(guid))?;
        w.write_event(Event::Text(BytesText::new(&xml_safe(&record.link))))?;
        w.write_event(Event::End(BytesEnd::new("guid")))?;
    }
    w.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> std::io::Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Drop characters XML 1.0 cannot represent at all, even escaped.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect()
}
