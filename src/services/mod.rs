//! Domain services over the content store.
//!
//! Built once at startup from the store handle and shared via `Arc`
//! with every handler and guard that needs them.

pub mod admin;
pub mod articles;

use std::sync::Arc;

pub use admin::{AdminService, Argon2Verifier, CredentialVerifier};
pub use articles::{ArticleService, VersionService};

use crate::store::ContentStore;

#[derive(Clone)]
pub struct Services {
    pub admin: Arc<AdminService>,
    pub articles: Arc<ArticleService>,
    pub versions: Arc<VersionService>,
}

impl Services {
    pub fn new(store: Arc<dyn ContentStore>, token_ttl_hours: i64) -> Self {
        Self::with_verifier(store, Arc::new(Argon2Verifier), token_ttl_hours)
    }

    pub fn with_verifier(
        store: Arc<dyn ContentStore>,
        verifier: Arc<dyn CredentialVerifier>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            admin: Arc::new(AdminService::new(store.clone(), verifier, token_ttl_hours)),
            articles: Arc::new(ArticleService::new(store.clone())),
            versions: Arc::new(VersionService::new(store)),
        }
    }
}
