//! Output generation for the extracted press releases.
//!
//! # Submodules
//!
//! - [`rss`]: the RSS 2.0 feed, the primary output
//! - [`json`]: an optional JSON dump of the same records
//!
//! Both write through [`persist_atomically`], so a failed run never leaves a
//! half-written file where a good one used to be.

pub mod json;
pub mod rss;

use crate::error::FeedError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `bytes` to a temp file next to `path`, then rename it over `path`.
pub(crate) fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), FeedError> {
    let io_err = |source: std::io::Error| FeedError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
