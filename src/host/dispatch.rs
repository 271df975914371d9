//! Host-agnostic dispatch.
//!
//! # Responsibilities
//! - Reconstruct the absolute URL from host-provided parts
//! - Match the route, bind path parameters, invoke the composed handler
//! - Render every outcome as a [`NormalizedResponse`]
//!
//! # Design Decisions
//! - The only place that decides the wire form of a failure
//! - Unknown failures are logged in full and masked as SERVER_ERROR
//! - An exhausted deadline is an unknown failure, not a distinct status

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::uri::Authority;
use http::{header, HeaderMap, Uri};
use url::Url;

use crate::errors::{ApiError, BAD_REQUEST, RESOURCE_NOT_FOUND, SERVER_ERROR};
use crate::observability::metrics;
use crate::pipeline::request::{Method, NormalizedRequest};
use crate::pipeline::response::{HandlerResult, NormalizedResponse};
use crate::routing::RouteTable;

const UNMATCHED_ROUTE: &str = "unmatched";
const DEFAULT_HOST: &str = "localhost";

/// Build the absolute URL of an inbound request.
///
/// The scheme comes from `x-forwarded-proto` (`http` or `https`, default
/// `http`), the authority from `Host` or the request target (default
/// `localhost`). Path and query always come from the request target, so
/// headers can never change the routed path.
pub fn absolute_url(headers: &HeaderMap, uri: &Uri) -> Result<Url, url::ParseError> {
    let scheme = match headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()) {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    let authority = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.parse::<Authority>().ok())
        .or_else(|| uri.authority().cloned());

    let base = authority.and_then(|a| Url::parse(&format!("{scheme}://{a}/")).ok());
    let mut url = match base {
        Some(url) => url,
        None => Url::parse(&format!("{scheme}://{DEFAULT_HOST}/"))?,
    };

    url.set_path(uri.path());
    url.set_query(uri.query());
    Ok(url)
}

/// Whether a host attaches the request body for `method`.
pub fn carries_body(method: &http::Method) -> bool {
    !matches!(*method, http::Method::GET | http::Method::HEAD)
}

/// Routes normalized requests through the frozen route table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Dispatch a request given in host-native parts.
    ///
    /// Methods a handler cannot bind (HEAD, OPTIONS, ...) take the
    /// no-route path.
    pub async fn dispatch_parts(
        &self,
        native: &http::Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
        deadline: Option<Instant>,
    ) -> NormalizedResponse {
        let Ok(method) = Method::try_from(native) else {
            tracing::debug!(method = %native, path = %url.path(), "Unsupported method");
            metrics::record_request(native.as_str(), UNMATCHED_ROUTE, 404, Instant::now());
            return NormalizedResponse::error(&RESOURCE_NOT_FOUND.definition());
        };

        let mut req = NormalizedRequest::new(method, url, headers, body);
        if let Some(deadline) = deadline {
            req = req.with_deadline(deadline);
        }
        self.dispatch(req).await
    }

    /// Match, invoke and render.
    pub async fn dispatch(&self, req: NormalizedRequest) -> NormalizedResponse {
        let start = Instant::now();
        let method = req.method();

        let Some((entry, params)) = self.table.find(method, req.path()) else {
            tracing::debug!(method = %method, path = %req.path(), "No route matched");
            metrics::record_request(method.as_str(), UNMATCHED_ROUTE, 404, start);
            return NormalizedResponse::error(&RESOURCE_NOT_FOUND.definition());
        };

        let route = entry.pattern.to_string();
        let deadline = req.deadline();
        let req = req.with_params(params);

        tracing::debug!(method = %method, route = %route, "Dispatching");

        let result = match deadline {
            Some(deadline) => {
                let deadline = tokio::time::Instant::from_std(deadline);
                match tokio::time::timeout_at(deadline, entry.handler.call(req)).await {
                    Ok(result) => result,
                    Err(_) => Err(ApiError::internal("invocation deadline exceeded")),
                }
            }
            None => entry.handler.call(req).await,
        };

        let response = render(result, method, &route);
        metrics::record_request(method.as_str(), &route, response.status().as_u16(), start);
        response
    }
}

fn render(result: HandlerResult, method: Method, route: &str) -> NormalizedResponse {
    let err = match result {
        Ok(output) => return output.into_response(),
        Err(err) => err,
    };

    match err.classify() {
        Some(def) => {
            if let ApiError::Store(source) = &err {
                tracing::error!(method = %method, route = %route, error = %source, "Store failure");
            } else {
                tracing::debug!(method = %method, route = %route, code = %def.code, "Request failed");
            }
            NormalizedResponse::error(&def)
        }
        None => {
            tracing::error!(method = %method, route = %route, error = ?err, "Unhandled error");
            NormalizedResponse::error(&SERVER_ERROR.definition())
        }
    }
}

/// Reply used when a host cannot even normalize the request.
pub fn malformed_request() -> NormalizedResponse {
    NormalizedResponse::error(&BAD_REQUEST.definition())
}
