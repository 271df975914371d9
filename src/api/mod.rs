//! Handler-definition units.
//!
//! Each unit lives at the path its URL is derived from: `articles/[slug].rs`
//! serves `/api/articles/:slug`, `v1/admin/assets/[...key].rs` serves
//! `/api/v1/admin/assets/*key`. Units report their own location via
//! `file!()`, and the route table turns that into a pattern at startup.

use std::sync::Arc;

use crate::guards::AdminRequired;
use crate::pipeline::middleware::Guard;
use crate::routing::HandlerUnit;
use crate::services::Services;

#[path = "articles/index.rs"]
mod articles_index;
#[path = "articles/[slug].rs"]
mod articles_slug;
#[path = "v1/admin/articles/index.rs"]
mod admin_articles_index;
#[path = "v1/admin/articles/[slug].rs"]
mod admin_articles_slug;
#[path = "v1/admin/articles/versions/[uuid].rs"]
mod admin_article_version;
#[path = "v1/admin/auth/index.rs"]
mod admin_auth;
#[path = "v1/admin/series/index.rs"]
mod admin_series;
#[path = "v1/admin/topics/index.rs"]
mod admin_topics;
#[path = "v1/admin/assets/[...key].rs"]
mod admin_assets;

/// Every handler-definition unit, wired to `services`.
pub fn units(services: &Services) -> Vec<HandlerUnit> {
    vec![
        articles_index::unit(services),
        articles_slug::unit(services),
        admin_articles_index::unit(services),
        admin_articles_slug::unit(services),
        admin_article_version::unit(services),
        admin_auth::unit(services),
        admin_series::unit(services),
        admin_topics::unit(services),
        admin_assets::unit(services),
    ]
}

fn admin_required(services: &Services) -> Arc<dyn Guard> {
    Arc::new(AdminRequired::new(services.admin.clone()))
}
