//! Quillpress: the request pipeline of a small CMS backend.
//!
//! # Data Flow
//! ```text
//! host (axum server or edge invocation)
//!     → host::dispatch (normalize, match route)
//!     → pipeline::middleware (guards, then handler from api/)
//!     → services → store
//!     → host::dispatch (render outcome or {code, message})
//! ```

// Core pipeline
pub mod errors;
pub mod pipeline;
pub mod routing;

// Hosts and handler definitions
pub mod api;
pub mod guards;
pub mod host;

// Domain
pub mod services;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use host::{Dispatcher, EdgeHost, HttpServer};
pub use lifecycle::{bootstrap, Application, Shutdown};
