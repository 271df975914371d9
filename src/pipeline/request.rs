//! Host-agnostic request model.
//!
//! # Responsibilities
//! - Carry method, absolute URL, headers and optional body
//! - Expose path decomposition (bound route parameters, last segment)
//! - Parse the body lazily as JSON on demand
//!
//! # Design Decisions
//! - Immutable once handed to the chain; the dispatcher binds path
//!   parameters before any guard runs
//! - Headers use `http::HeaderMap` (case-insensitive, multi-valued)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{ApiError, BAD_REQUEST};

/// Methods a handler definition may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Method names are case-sensitive.
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// Named values bound from dynamic and catch-all segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A normalized inbound request, valid for the duration of one call.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    params: PathParams,
    deadline: Option<Instant>,
}

impl NormalizedRequest {
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            params: PathParams::default(),
            deadline: None,
        }
    }

    /// Bind the path parameters produced by route matching.
    pub fn with_params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    /// Attach a per-invocation time budget.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Final path segment, percent-decoded. `None` for an empty segment.
    pub fn last_segment(&self) -> Option<String> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .map(percent_decode)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Parse the body as JSON. An absent or malformed body is a BAD_REQUEST.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let bytes = self
            .body
            .as_ref()
            .ok_or_else(|| ApiError::from(BAD_REQUEST))?;
        serde_json::from_slice(bytes).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting malformed JSON body");
            ApiError::from(BAD_REQUEST)
        })
    }
}

/// Decode `%XX` escapes; invalid UTF-8 is replaced lossily.
pub(crate) fn percent_decode(segment: &str) -> String {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn request(path: &str, body: Option<&str>) -> NormalizedRequest {
        let url = Url::parse(&format!("http://localhost{path}")).unwrap();
        NormalizedRequest::new(
            Method::Post,
            url,
            HeaderMap::new(),
            body.map(|b| Bytes::from(b.to_string())),
        )
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("PATCH".parse::<Method>(), Ok(Method::Patch));
        assert!("HEAD".parse::<Method>().is_err());
        assert!(Method::try_from(&http::Method::OPTIONS).is_err());
    }

    #[test]
    fn test_lowercase_extension_method_is_unsupported() {
        let native = http::Method::from_bytes(b"get").unwrap();
        assert_ne!(native, http::Method::GET);
        assert_eq!(Method::try_from(&native), Err(UnsupportedMethod("get".into())));
        assert!("post".parse::<Method>().is_err());
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(request("/api/articles/hello-world", None).last_segment().as_deref(), Some("hello-world"));
        assert_eq!(request("/api/articles/a%20b", None).last_segment().as_deref(), Some("a b"));
        assert_eq!(request("/api/articles/", None).last_segment(), None);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-adm-token", "abc".parse().unwrap());
        let req = NormalizedRequest::new(
            Method::Get,
            Url::parse("http://localhost/").unwrap(),
            headers,
            None,
        );
        assert_eq!(req.header("X-Adm-Token"), Some("abc"));
    }

    #[test]
    fn test_json_body() {
        #[derive(Debug, Deserialize)]
        struct Body {
            #[serde(rename = "userId")]
            user_id: String,
        }

        let parsed: Body = request("/", Some(r#"{"userId":"u1"}"#)).json().unwrap();
        assert_eq!(parsed.user_id, "u1");

        let err = request("/", Some("{not json")).json::<Body>().unwrap_err();
        assert_eq!(err.classify().map(|d| d.status), Some(400));

        let err = request("/", None).json::<Body>().unwrap_err();
        assert_eq!(err.classify().map(|d| d.code), Some("BAD_REQUEST".to_string()));
    }
}
