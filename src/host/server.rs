//! Long-running HTTP server host.
//!
//! # Responsibilities
//! - Create the Axum Router with a single dispatching fallback
//! - Wire up middleware (tracing, request ID)
//! - Normalize axum requests and translate normalized responses back
//! - Serve until the shutdown signal, then drain
//!
//! # Design Decisions
//! - Axum does no routing of its own; the route table decides everything
//! - The request timeout becomes a per-request deadline, so a timeout
//!   still answers with a `{code, message}` body
//! - The body limit is enforced while buffering, for the same reason

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::host::dispatch::{absolute_url, carries_body, malformed_request, Dispatcher};
use crate::lifecycle::{shutdown, Application};
use crate::pipeline::response::NormalizedResponse;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Per-server state injected into the dispatching handler.
#[derive(Clone)]
struct ServerState {
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
    request_timeout: Duration,
}

/// Axum-backed host.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    pub fn new(app: &Application) -> Self {
        let state = ServerState {
            dispatcher: app.dispatcher.clone(),
            max_body_bytes: app.config.listener.max_body_bytes,
            request_timeout: Duration::from_secs(app.config.timeouts.request_secs),
        };

        Self {
            router: Self::build_router(state),
            config: app.config.clone(),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: ServerState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        });

        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(trace)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn dispatch_handler(State(state): State<ServerState>, request: Request) -> Response {
    let deadline = Instant::now() + state.request_timeout;
    let (parts, body) = request.into_parts();

    let url = match absolute_url(&parts.headers, &parts.uri) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Cannot reconstruct request URL");
            return into_axum(malformed_request());
        }
    };

    let body = if carries_body(&parts.method) {
        match axum::body::to_bytes(body, state.max_body_bytes).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(path = %url.path(), error = %e, "Request body rejected");
                return into_axum(malformed_request());
            }
        }
    } else {
        None
    };

    let response = state
        .dispatcher
        .dispatch_parts(&parts.method, url, parts.headers, body, Some(deadline))
        .await;

    into_axum(response)
}

fn into_axum(response: NormalizedResponse) -> Response {
    let (status, headers, body) = response.into_parts();
    let mut reply = Response::new(Body::from(body));
    *reply.status_mut() = status;
    *reply.headers_mut() = headers;
    reply
}
