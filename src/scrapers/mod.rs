//! Extraction of press releases from rendered listing markup.
//!
//! - [`press_releases`]: candidate discovery and per-field selector chains
//! - [`dates`]: free-text date normalization
//!
//! Scraping never fails as a whole. Missing fields become placeholders,
//! unreadable dates become the extraction time, and blocks that cannot be
//! turned into a record are skipped and reported.

pub mod dates;
pub mod press_releases;
