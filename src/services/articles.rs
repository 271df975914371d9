//! Article, series, topic and asset queries.

use std::sync::Arc;

use uuid::Uuid;

use crate::store::{Article, ArticleVersion, Asset, ContentStore, Series, StoreResult, Topic};

pub struct ArticleService {
    store: Arc<dyn ContentStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> StoreResult<Vec<Article>> {
        self.store.list_articles().await
    }

    pub async fn list_published(&self) -> StoreResult<Vec<Article>> {
        let mut articles = self.store.list_articles().await?;
        articles.retain(|a| a.is_published);
        Ok(articles)
    }

    pub async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        self.store.find_article_by_slug(slug).await
    }

    pub async fn get_published_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        Ok(self
            .store
            .find_article_by_slug(slug)
            .await?
            .filter(|a| a.is_published))
    }

    pub async fn list_series(&self) -> StoreResult<Vec<Series>> {
        self.store.list_series().await
    }

    pub async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        self.store.list_topics().await
    }

    pub async fn get_asset(&self, bucket_key: &str) -> StoreResult<Option<Asset>> {
        self.store.find_asset_by_key(bucket_key).await
    }
}

pub struct VersionService {
    store: Arc<dyn ContentStore>,
}

impl VersionService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn get_by_uuid(&self, id: Uuid) -> StoreResult<Option<ArticleVersion>> {
        self.store.find_version(id).await
    }
}
