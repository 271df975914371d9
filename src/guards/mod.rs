//! Route guards.
//!
//! # Data Flow
//! ```text
//! Chain: [AdminRequired, WithUuid] → handler
//!     AdminRequired: X-Adm-Token present and active?  no → RESOURCE_NOT_FOUND
//!     WithUuid:      last segment a UUID?              no → BAD_REQUEST
//! ```

pub mod admin;
pub mod with_uuid;

pub use admin::{AdminRequired, ADMIN_TOKEN_HEADER};
pub use with_uuid::WithUuid;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{BAD_REQUEST, RESOURCE_NOT_FOUND};
    use crate::pipeline::middleware::{compose, handler_fn, Guard, Handler};
    use crate::pipeline::request::{Method, NormalizedRequest};
    use crate::pipeline::response::HandlerResult;
    use crate::services::Services;
    use crate::store::MemoryStore;
    use http::HeaderMap;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use url::Url;

    fn request(path: &str, token: Option<&str>) -> NormalizedRequest {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(ADMIN_TOKEN_HEADER, token.parse().unwrap());
        }
        NormalizedRequest::new(
            Method::Get,
            Url::parse(&format!("http://localhost{path}")).unwrap(),
            headers,
            None,
        )
    }

    fn counting(hits: Arc<AtomicUsize>) -> Arc<dyn Handler> {
        handler_fn(move |_req| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                HandlerResult::Ok(json!({}).into())
            }
        })
    }

    async fn admin_chain(hits: Arc<AtomicUsize>) -> (Arc<dyn Handler>, String) {
        let services = Services::new(Arc::new(MemoryStore::new()), 24);
        let token = services.admin.create_token(uuid::Uuid::new_v4()).await.unwrap();
        let guards: Vec<Arc<dyn Guard>> = vec![
            Arc::new(AdminRequired::new(services.admin.clone())),
            Arc::new(WithUuid),
        ];
        (compose(counting(hits), guards), token)
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (chain, _) = admin_chain(hits.clone()).await;

        let err = chain
            .call(request("/api/v1/admin/articles/versions/not-a-uuid", None))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(RESOURCE_NOT_FOUND.definition()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_token_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (chain, _) = admin_chain(hits.clone()).await;

        let err = chain
            .call(request("/api/x/6f1c1f0e-8a53-4c1b-9d1e-2b8c3a4d5e6f", Some("forged")))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(RESOURCE_NOT_FOUND.definition()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_then_bad_uuid() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (chain, token) = admin_chain(hits.clone()).await;

        let err = chain
            .call(request("/api/v1/admin/articles/versions/not-a-uuid", Some(&token)))
            .await
            .unwrap_err();

        assert_eq!(err.classify(), Some(BAD_REQUEST.definition()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_and_uuid_reach_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (chain, token) = admin_chain(hits.clone()).await;

        chain
            .call(request(
                "/api/v1/admin/articles/versions/6f1c1f0e-8a53-4c1b-9d1e-2b8c3a4d5e6f",
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uuid_guard_wants_canonical_form() {
        let hits = Arc::new(AtomicUsize::new(0));
        let chain = compose(counting(hits.clone()), vec![Arc::new(WithUuid) as Arc<dyn Guard>]);

        assert!(chain.call(request("/v/6f1c1f0e8a534c1b9d1e2b8c3a4d5e6f", None)).await.is_err());
        assert!(chain.call(request("/v/", None)).await.is_err());
        assert!(chain
            .call(request("/v/6F1C1F0E-8A53-4C1B-9D1E-2B8C3A4D5E6F", None))
            .await
            .is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
