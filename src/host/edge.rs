//! Stateless per-invocation host.
//!
//! Takes one fully buffered `http::Request<Bytes>` and returns one
//! `http::Response<Bytes>`, the shape serverless and edge runtimes hand to
//! a function. An optional budget bounds each invocation; past it the reply
//! is SERVER_ERROR.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::host::dispatch::{absolute_url, carries_body, malformed_request, Dispatcher};
use crate::pipeline::response::NormalizedResponse;

#[derive(Debug, Clone)]
pub struct EdgeHost {
    dispatcher: Arc<Dispatcher>,
    budget: Option<Duration>,
}

impl EdgeHost {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            budget: None,
        }
    }

    /// Limit every invocation to `budget`.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub async fn invoke(&self, request: http::Request<Bytes>) -> http::Response<Bytes> {
        let deadline = self.budget.map(|budget| Instant::now() + budget);
        let (parts, body) = request.into_parts();

        let url = match absolute_url(&parts.headers, &parts.uri) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(uri = %parts.uri, error = %e, "Cannot reconstruct request URL");
                return into_http(malformed_request());
            }
        };

        let body = carries_body(&parts.method).then_some(body);

        let response = self
            .dispatcher
            .dispatch_parts(&parts.method, url, parts.headers, body, deadline)
            .await;

        into_http(response)
    }
}

fn into_http(response: NormalizedResponse) -> http::Response<Bytes> {
    let (status, headers, body) = response.into_parts();
    let mut reply = http::Response::new(body);
    *reply.status_mut() = status;
    *reply.headers_mut() = headers;
    reply
}
