//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Resolve handler-definition units into (method, pattern) → handler entries
//! - Reject duplicate or ambiguous registrations at startup
//! - Look up the entry for a request method and path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Entries are kept in specificity order, so lookup is independent of
//!   registration order
//! - A duplicate binding is a fatal configuration error, never last-write-wins

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::pipeline::middleware::Handler;
use crate::pipeline::request::{Method, PathParams};
use crate::routing::pattern::{file_path_to_route, PatternError, RoutePattern, Segment};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("{method} {pattern} (from `{path}`) conflicts with {method} {existing} (from `{existing_path}`)")]
    Duplicate {
        method: Method,
        pattern: String,
        path: String,
        existing: String,
        existing_path: String,
    },
}

/// One handler-definition unit: a path in the API tree plus its
/// per-method bindings.
pub struct HandlerUnit {
    path: String,
    bindings: Vec<(Method, Arc<dyn Handler>)>,
}

impl HandlerUnit {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, method: Method, handler: Arc<dyn Handler>) -> Self {
        self.bindings.push((method, handler));
        self
    }

    pub fn get(self, handler: Arc<dyn Handler>) -> Self {
        self.bind(Method::Get, handler)
    }

    pub fn post(self, handler: Arc<dyn Handler>) -> Self {
        self.bind(Method::Post, handler)
    }

    pub fn put(self, handler: Arc<dyn Handler>) -> Self {
        self.bind(Method::Put, handler)
    }

    pub fn delete(self, handler: Arc<dyn Handler>) -> Self {
        self.bind(Method::Delete, handler)
    }

    pub fn patch(self, handler: Arc<dyn Handler>) -> Self {
        self.bind(Method::Patch, handler)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for HandlerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<Method> = self.bindings.iter().map(|(m, _)| *m).collect();
        f.debug_struct("HandlerUnit")
            .field("path", &self.path)
            .field("methods", &methods)
            .finish()
    }
}

#[derive(Clone)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: Arc<dyn Handler>,
    source: String,
}

impl RouteEntry {
    /// The handler-definition path this entry was resolved from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.method, self.pattern)
    }
}

/// Pattern with parameter names erased: `/api/a/:x` and `/api/a/:y` share a shape.
fn shape(pattern: &RoutePattern) -> Vec<Segment> {
    pattern
        .segments()
        .iter()
        .map(|s| match s {
            Segment::Literal(_) => s.clone(),
            Segment::Param(_) => Segment::Param(String::new()),
            Segment::CatchAll(_) => Segment::CatchAll(String::new()),
        })
        .collect()
}

/// The process-wide routing table.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Resolve every unit. Any malformed path or conflicting binding aborts.
    pub fn resolve(units: Vec<HandlerUnit>) -> Result<Self, RouteError> {
        let mut seen: HashMap<(Method, Vec<Segment>), (String, String)> = HashMap::new();
        let mut entries = Vec::new();

        for unit in units {
            let pattern = file_path_to_route(&unit.path)?;
            for (method, handler) in unit.bindings {
                let key = (method, shape(&pattern));
                if let Some((existing, existing_path)) = seen.get(&key) {
                    return Err(RouteError::Duplicate {
                        method,
                        pattern: pattern.to_string(),
                        path: unit.path.clone(),
                        existing: existing.clone(),
                        existing_path: existing_path.clone(),
                    });
                }
                seen.insert(key, (pattern.to_string(), unit.path.clone()));

                entries.push(RouteEntry {
                    method,
                    pattern: pattern.clone(),
                    handler,
                    source: unit.path.clone(),
                });
            }
        }

        entries.sort_by(|a, b| {
            a.pattern
                .specificity_cmp(&b.pattern)
                .then_with(|| a.method.cmp(&b.method))
        });

        for entry in &entries {
            tracing::info!(method = %entry.method, pattern = %entry.pattern, source = %entry.source, "Route registered");
        }

        Ok(Self { entries })
    }

    /// Most specific entry matching `method` and `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<(&RouteEntry, PathParams)> {
        self.entries
            .iter()
            .filter(|e| e.method == method)
            .find_map(|e| e.pattern.match_path(path).map(|params| (e, params)))
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::middleware::handler_fn;
    use crate::pipeline::response::HandlerResult;
    use serde_json::json;

    fn tagged(tag: &'static str) -> Arc<dyn Handler> {
        handler_fn(move |_req| async move { HandlerResult::Ok(json!({ "tag": tag }).into()) })
    }

    fn table() -> RouteTable {
        RouteTable::resolve(vec![
            HandlerUnit::new("src/api/articles/index.rs").get(tagged("list")),
            HandlerUnit::new("src/api/articles/[slug].rs")
                .get(tagged("show"))
                .delete(tagged("remove")),
            HandlerUnit::new("src/api/articles/latest.rs").get(tagged("latest")),
            HandlerUnit::new("src/api/files/[...path].rs").get(tagged("file")),
        ])
        .unwrap()
    }

    #[test]
    fn test_one_entry_per_binding() {
        let table = table();
        assert_eq!(table.len(), 5);
        let rendered: Vec<String> = table.entries().iter().map(|e| format!("{e:?}")).collect();
        assert!(rendered.contains(&"[GET] /api/articles/:slug".to_string()));
        assert!(rendered.contains(&"[DELETE] /api/articles/:slug".to_string()));
        assert!(!rendered.iter().any(|r| r.starts_with("[POST]")));
    }

    #[test]
    fn test_find_prefers_literal_over_param() {
        let table = table();
        let (entry, params) = table.find(Method::Get, "/api/articles/latest").unwrap();
        assert_eq!(entry.pattern.to_string(), "/api/articles/latest");
        assert!(params.is_empty());

        let (entry, params) = table.find(Method::Get, "/api/articles/hello").unwrap();
        assert_eq!(entry.pattern.to_string(), "/api/articles/:slug");
        assert_eq!(params.get("slug"), Some("hello"));
    }

    #[test]
    fn test_find_respects_method() {
        let table = table();
        assert!(table.find(Method::Delete, "/api/articles/hello").is_some());
        assert!(table.find(Method::Post, "/api/articles/hello").is_none());
        assert!(table.find(Method::Delete, "/api/articles").is_none());
    }

    #[test]
    fn test_catch_all_lookup() {
        let table = table();
        let (_, params) = table.find(Method::Get, "/api/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("path"), Some("a/b/c.txt"));
        assert!(table.find(Method::Get, "/api/files").is_none());
    }

    #[test]
    fn test_order_is_independent_of_registration() {
        let reversed = RouteTable::resolve(vec![
            HandlerUnit::new("src/api/files/[...path].rs").get(tagged("file")),
            HandlerUnit::new("src/api/articles/latest.rs").get(tagged("latest")),
            HandlerUnit::new("src/api/articles/[slug].rs")
                .delete(tagged("remove"))
                .get(tagged("show")),
            HandlerUnit::new("src/api/articles/index.rs").get(tagged("list")),
        ])
        .unwrap();

        let a: Vec<String> = table().entries().iter().map(|e| format!("{e:?}")).collect();
        let b: Vec<String> = reversed.entries().iter().map(|e| format!("{e:?}")).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let err = RouteTable::resolve(vec![
            HandlerUnit::new("src/api/series/index.rs").get(tagged("a")),
            HandlerUnit::new("src/api/series.rs").get(tagged("b")),
        ])
        .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { method: Method::Get, .. }));
    }

    #[test]
    fn test_ambiguous_params_are_rejected() {
        let err = RouteTable::resolve(vec![
            HandlerUnit::new("src/api/users/[id].rs").get(tagged("a")),
            HandlerUnit::new("src/api/users/[name].rs").get(tagged("b")),
        ])
        .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_same_pattern_different_methods_is_fine() {
        let table = RouteTable::resolve(vec![
            HandlerUnit::new("src/api/series/index.rs").get(tagged("a")),
            HandlerUnit::new("src/api/series.rs").post(tagged("b")),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_malformed_unit_aborts() {
        let err = RouteTable::resolve(vec![
            HandlerUnit::new("src/api/[...rest]/tail.rs").get(tagged("a")),
        ])
        .unwrap_err();
        assert!(matches!(err, RouteError::Pattern(PatternError::CatchAllNotLast { .. })));
    }
}
