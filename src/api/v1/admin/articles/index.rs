use std::sync::Arc;

use serde_json::json;

use crate::pipeline::middleware::{compose, handler_fn};
use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;
use crate::routing::HandlerUnit;
use crate::services::{ArticleService, Services};

pub fn unit(services: &Services) -> HandlerUnit {
    let articles = services.articles.clone();
    let handler = handler_fn(move |req| get(articles.clone(), req));
    HandlerUnit::new(file!()).get(compose(handler, vec![super::admin_required(services)]))
}

/// All articles, drafts included.
async fn get(articles: Arc<ArticleService>, _req: NormalizedRequest) -> HandlerResult {
    let articles = articles.list().await?;
    Ok(json!({ "articles": articles }).into())
}
