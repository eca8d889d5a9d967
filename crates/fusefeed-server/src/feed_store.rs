//! Process-wide store of loaded fused feeds, keyed by feed id (§4.G).
//!
//! Keeping a live [`fusefeed_core::FusedFeed`] per id (rather than
//! re-parsing and re-fetching from a cold state on every request) is what
//! lets conditional-GET caching (etag/last-modified) actually save
//! upstream requests across HTTP hits.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use fusefeed_core::{FusedFeed, SpecError};

pub struct FeedStore {
    feeds_dir: PathBuf,
    loaded: RwLock<HashMap<String, Arc<RwLock<FusedFeed>>>>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedStoreError {
    #[error("no feed named {0:?}")]
    NotFound(String),
    #[error("invalid feed id {0:?}")]
    InvalidId(String),
    #[error("{0}")]
    Spec(#[from] SpecError),
}

impl FeedStore {
    pub fn new(feeds_dir: PathBuf) -> Self {
        FeedStore {
            feeds_dir,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the current entries for `id`, loading and caching the spec
    /// file on first use. Every call re-fetches the feed's sources
    /// (conditional-GET keeps this cheap when nothing upstream changed).
    pub async fn get(&self, id: &str) -> Result<Arc<RwLock<FusedFeed>>, FeedStoreError> {
        validate_id(id)?;

        if let Some(feed) = self.loaded.read().await.get(id) {
            return Ok(feed.clone());
        }

        let path = self.feeds_dir.join(format!("{id}.json"));
        if !path.exists() {
            return Err(FeedStoreError::NotFound(id.to_string()));
        }
        let feed = fusefeed_core::load_spec_file(&path)?;
        let feed = Arc::new(RwLock::new(feed));

        let mut loaded = self.loaded.write().await;
        let feed = loaded.entry(id.to_string()).or_insert(feed).clone();
        Ok(feed)
    }
}

/// Feed ids become path segments (`<feeds_dir>/<id>.json`); reject
/// anything that could escape that directory or isn't a sane identifier.
fn validate_id(id: &str) -> Result<(), FeedStoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(FeedStoreError::InvalidId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_spec_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path().to_path_buf());
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, FeedStoreError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn path_traversal_id_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path().to_path_buf());
        let err = store.get("../escape").await.unwrap_err();
        assert!(matches!(err, FeedStoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn malformed_spec_file_is_a_spec_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
        let store = FeedStore::new(dir.path().to_path_buf());
        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, FeedStoreError::Spec(_)));
    }

    #[tokio::test]
    async fn loaded_feed_is_cached_across_subsequent_lookups() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("empty.json"),
            r#"{"name": "empty", "sources": []}"#,
        )
        .unwrap();
        let store = FeedStore::new(dir.path().to_path_buf());

        let first = store.get("empty").await.unwrap();
        let second = store.get("empty").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
