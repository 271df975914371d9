//! Content store collaborator.
//!
//! # Data Flow
//! ```text
//! store.database_url
//!     → open() (scheme selects the backend)
//!     → Arc<dyn ContentStore>, created once at startup
//!     → injected into services
//! ```
//!
//! # Design Decisions
//! - Handlers never see the store directly; services wrap it
//! - Lookups return `Ok(None)` for absent keys; `Err` is reserved for
//!   store failures

pub mod memory;
pub mod models;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::{AdminToken, Article, ArticleVersion, Asset, Series, Topic, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported database url `{0}`")]
    UnsupportedUrl(String),

    #[error("seed file {path}: {source}")]
    Seed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file {path}: {source}")]
    SeedFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unique constraint violated on {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Lookup-by-key and insert operations over the content schema.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_articles(&self) -> StoreResult<Vec<Article>>;
    async fn find_article_by_slug(&self, slug: &str) -> StoreResult<Option<Article>>;
    async fn find_version(&self, id: Uuid) -> StoreResult<Option<ArticleVersion>>;
    async fn list_series(&self) -> StoreResult<Vec<Series>>;
    async fn list_topics(&self) -> StoreResult<Vec<Topic>>;
    async fn find_asset_by_key(&self, bucket_key: &str) -> StoreResult<Option<Asset>>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_admin_token(&self, token: &str) -> StoreResult<Option<AdminToken>>;
    async fn insert_admin_token(&self, token: AdminToken) -> StoreResult<()>;
}

/// Open the store named by `database_url`.
///
/// - `memory://`: empty in-memory store
/// - `json:///abs/path/seed.json`: in-memory store seeded from a JSON document
pub fn open(database_url: &str) -> StoreResult<Arc<dyn ContentStore>> {
    let url = Url::parse(database_url).map_err(|_| StoreError::UnsupportedUrl(database_url.to_string()))?;

    let store = match url.scheme() {
        "memory" => MemoryStore::new(),
        "json" => {
            let path = PathBuf::from(url.path());
            MemoryStore::load_from_file(&path)?
        }
        _ => return Err(StoreError::UnsupportedUrl(database_url.to_string())),
    };

    tracing::info!(scheme = url.scheme(), "Content store opened");
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_unknown_scheme() {
        assert!(matches!(
            open("postgres://localhost/blog"),
            Err(StoreError::UnsupportedUrl(_))
        ));
        assert!(matches!(open("not a url"), Err(StoreError::UnsupportedUrl(_))));
    }

    #[tokio::test]
    async fn test_open_memory() {
        let store = open("memory://").unwrap();
        assert!(store.list_articles().await.unwrap().is_empty());
    }
}
