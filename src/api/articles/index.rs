use std::sync::Arc;

use serde_json::json;

use crate::pipeline::middleware::handler_fn;
use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;
use crate::routing::HandlerUnit;
use crate::services::{ArticleService, Services};

pub fn unit(services: &Services) -> HandlerUnit {
    let articles = services.articles.clone();
    HandlerUnit::new(file!()).get(handler_fn(move |req| get(articles.clone(), req)))
}

/// Published articles.
async fn get(articles: Arc<ArticleService>, _req: NormalizedRequest) -> HandlerResult {
    let articles = articles.list_published().await?;
    Ok(json!({ "articles": articles, "message": "success" }).into())
}
