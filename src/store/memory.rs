//! In-memory content store, optionally seeded from a JSON document.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::models::{AdminToken, Article, ArticleVersion, Asset, Series, Topic, User};
use crate::store::{ContentStore, StoreError, StoreResult};

/// On-disk seed document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seed {
    pub articles: Vec<Article>,
    pub versions: Vec<ArticleVersion>,
    pub series: Vec<Series>,
    pub topics: Vec<Topic>,
    pub assets: Vec<Asset>,
    pub users: Vec<User>,
    pub admin_tokens: Vec<AdminToken>,
}

#[derive(Default)]
pub struct MemoryStore {
    articles: DashMap<String, Article>,
    versions: DashMap<Uuid, ArticleVersion>,
    series: DashMap<Uuid, Series>,
    topics: DashMap<Uuid, Topic>,
    assets: DashMap<String, Asset>,
    users: DashMap<Uuid, User>,
    admin_tokens: DashMap<String, AdminToken>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        let store = Self::new();
        for a in seed.articles {
            store.articles.insert(a.slug.clone(), a);
        }
        for v in seed.versions {
            store.versions.insert(v.id, v);
        }
        for s in seed.series {
            store.series.insert(s.id, s);
        }
        for t in seed.topics {
            store.topics.insert(t.id, t);
        }
        for a in seed.assets {
            store.assets.insert(a.bucket_key.clone(), a);
        }
        for u in seed.users {
            store.users.insert(u.id, u);
        }
        for t in seed.admin_tokens {
            store.admin_tokens.insert(t.token.clone(), t);
        }
        store
    }

    /// Load a seed document from disk.
    pub fn load_from_file(path: &Path) -> StoreResult<Self> {
        let file = File::open(path).map_err(|source| StoreError::Seed {
            path: path.to_path_buf(),
            source,
        })?;
        let seed: Seed = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            StoreError::SeedFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let store = Self::from_seed(seed);
        tracing::info!(
            path = %path.display(),
            articles = store.articles.len(),
            users = store.users.len(),
            "Loaded content seed"
        );
        Ok(store)
    }

    pub fn insert_article(&self, article: Article) {
        self.articles.insert(article.slug.clone(), article);
    }

    pub fn insert_version(&self, version: ArticleVersion) {
        self.versions.insert(version.id, version);
    }

    pub fn insert_series(&self, series: Series) {
        self.series.insert(series.id, series);
    }

    pub fn insert_topic(&self, topic: Topic) {
        self.topics.insert(topic.id, topic);
    }

    pub fn insert_asset(&self, asset: Asset) {
        self.assets.insert(asset.bucket_key.clone(), asset);
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }
}

/// DashMap iteration order is unspecified; callers get a stable order.
fn sorted<T: Clone, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(|item| key(item));
    out
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        Ok(sorted(self.articles.iter().map(|r| r.value().clone()), |a| {
            (a.created_at, a.slug.clone())
        }))
    }

    async fn find_article_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        Ok(self.articles.get(slug).map(|r| r.value().clone()))
    }

    async fn find_version(&self, id: Uuid) -> StoreResult<Option<ArticleVersion>> {
        Ok(self.versions.get(&id).map(|r| r.value().clone()))
    }

    async fn list_series(&self) -> StoreResult<Vec<Series>> {
        Ok(sorted(self.series.iter().map(|r| r.value().clone()), |s| {
            s.title.clone()
        }))
    }

    async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        Ok(sorted(self.topics.iter().map(|r| r.value().clone()), |t| {
            t.name.clone()
        }))
    }

    async fn find_asset_by_key(&self, bucket_key: &str) -> StoreResult<Option<Asset>> {
        Ok(self.assets.get(bucket_key).map(|r| r.value().clone()))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_admin_token(&self, token: &str) -> StoreResult<Option<AdminToken>> {
        Ok(self.admin_tokens.get(token).map(|r| r.value().clone()))
    }

    async fn insert_admin_token(&self, token: AdminToken) -> StoreResult<()> {
        match self.admin_tokens.entry(token.token.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict("admin_tokens.token".into())),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn article(slug: &str, day: u32) -> Article {
        Article {
            id: Uuid::new_v4(),
            slug: slug.into(),
            title: slug.to_uppercase(),
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            updated_at: None,
            series_id: None,
            series_order: None,
            is_published: true,
        }
    }

    #[tokio::test]
    async fn test_list_order_is_stable() {
        let store = MemoryStore::new();
        store.insert_article(article("c", 3));
        store.insert_article(article("a", 1));
        store.insert_article(article("b", 2));

        let slugs: Vec<String> = store
            .list_articles()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.slug)
            .collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_admin_token_is_unique() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let token = AdminToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "abc".into(),
            created_at: now,
            expires_at: now + Duration::hours(1),
            last_active_at: None,
            revoked: false,
        };

        store.insert_admin_token(token.clone()).await.unwrap();
        assert_eq!(store.find_admin_token("abc").await.unwrap(), Some(token.clone()));
        assert!(matches!(
            store.insert_admin_token(token).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let seed = serde_json::json!({
            "articles": [{
                "id": "6f1c1f0e-8a53-4c1b-9d1e-2b8c3a4d5e6f",
                "slug": "hello-world",
                "title": "Hello",
                "createdAt": "2025-01-01T00:00:00Z",
                "isPublished": true
            }],
            "assets": [{
                "id": "0b7e4b8e-1f0a-4f3a-8a55-3c2d1e0f9a8b",
                "filename": "cover.png",
                "bucketKey": "2025/01/cover.png",
                "mimeType": "image/png",
                "createdAt": "2025-01-01T00:00:00Z"
            }]
        });
        std::fs::write(&path, seed.to_string()).unwrap();

        let store = MemoryStore::load_from_file(&path).unwrap();
        let found = store.find_article_by_slug("hello-world").await.unwrap().unwrap();
        assert_eq!(found.title, "Hello");
        assert!(store.find_asset_by_key("2025/01/cover.png").await.unwrap().is_some());
        assert!(store.list_topics().await.unwrap().is_empty());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = MemoryStore::load_from_file(Path::new("/nonexistent/seed.json"))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Seed { .. }));
    }
}
