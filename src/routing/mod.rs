//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     HandlerUnit[] (source path + method bindings)
//!     → pattern.rs (source path → RoutePattern)
//!     → table.rs (reject duplicates, sort by specificity)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → table.rs (first entry whose method and pattern match)
//!     → Return: entry + bound path params, or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the hot path (segment-wise matching only)
//! - Deterministic: same input always matches same route

pub mod pattern;
pub mod table;

pub use pattern::{file_path_to_route, PatternError, RoutePattern, Segment, API_ROOT};
pub use table::{HandlerUnit, RouteEntry, RouteError, RouteTable};
