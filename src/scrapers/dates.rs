//! Publication-date normalization.
//!
//! The listing page shows dates in several free-text styles. They are tried
//! against [`DATE_FORMATS`] in order and the first format that parses wins.
//! The order matters for ambiguous inputs and must not be rearranged.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

/// Candidate `strftime` patterns, in trial order.
pub const DATE_FORMATS: [&str; 4] = ["%B %d, %Y", "%d %b %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// Parse `text` against [`DATE_FORMATS`], returning midnight UTC of the date.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

/// Normalize optional date text, falling back to the current time.
///
/// Returns the timestamp and whether the fallback was taken.
pub fn normalize_date(text: Option<&str>) -> (DateTime<Utc>, bool) {
    match text.and_then(parse_date) {
        Some(dt) => (dt, false),
        None => {
            debug!(raw = ?text, "No date format matched; using extraction time");
            (Utc::now(), true)
        }
    }
}
