//! Host adapters.
//!
//! # Data Flow
//! ```text
//! axum request  ──▶ server.rs ─┐
//!                              ├─▶ dispatch.rs (normalize, match, invoke, render)
//! http::Request ──▶ edge.rs  ──┘
//! ```
//!
//! # Design Decisions
//! - Only this module touches host-native request and response types
//! - Both hosts share one [`Dispatcher`], so outcomes are identical across them

pub mod dispatch;
pub mod edge;
pub mod server;

pub use dispatch::Dispatcher;
pub use edge::EdgeHost;
pub use server::HttpServer;
