//! Static rated-album corpus
//!
//! Loaded once at startup from a JSON array of reviews and shared read-only.

use sevens_common::{Error, RatedAlbum, Result};
use std::path::Path;
use tracing::{info, warn};

/// Read the corpus file
///
/// A missing or unparsable corpus is fatal: the service has nothing to pick from.
pub fn load_corpus(path: &Path) -> Result<Vec<RatedAlbum>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read corpus {} failed: {}", path.display(), e))
    })?;

    let corpus: Vec<RatedAlbum> = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse corpus {} failed: {}", path.display(), e))
    })?;

    if corpus.is_empty() {
        warn!(
            "Corpus {} is empty; every pick will report nothing left",
            path.display()
        );
    } else {
        info!(
            albums = corpus.len(),
            "Loaded corpus from {}",
            path.display()
        );
    }

    Ok(corpus)
}
