//! Host-agnostic request pipeline.
//!
//! # Data Flow
//! ```text
//! host-native request
//!     → request.rs (NormalizedRequest)
//!     → middleware.rs (guards in declared order, then the handler)
//!     → response.rs (HandlerOutput → NormalizedResponse)
//!     → host-native reply
//! ```

pub mod middleware;
pub mod request;
pub mod response;

pub use middleware::{compose, handler_fn, Guard, Handler, Next};
pub use request::{Method, NormalizedRequest, PathParams};
pub use response::{HandlerOutput, HandlerResult, NormalizedResponse, ResponseBody};
