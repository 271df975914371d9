//! Host-agnostic response model.
//!
//! # Design Decisions
//! - Handlers return a tagged [`HandlerOutput`]: either a full response or a
//!   bare JSON value, so the host translation is an exhaustive match
//! - A response is consumed exactly once by [`NormalizedResponse::into_parts`]

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ApiError, ErrorDefinition};

/// Response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl NormalizedResponse {
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        let mut headers = HeaderMap::new();
        let content_type = match &body {
            ResponseBody::Json(_) => Some("application/json"),
            ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
            ResponseBody::Empty => None,
        };
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 with a serialized JSON body.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, ApiError> {
        Ok(Self::new(
            StatusCode::OK,
            ResponseBody::Json(serde_json::to_value(payload)?),
        ))
    }

    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status, ResponseBody::Text(text.into()))
    }

    /// The `{code, message}` rendering of a failure.
    pub fn error(def: &ErrorDefinition) -> Self {
        let status = StatusCode::from_u16(def.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, ResponseBody::Json(def.body()))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Serialize for the wire.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        let bytes = match self.body {
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Text(text) => Bytes::from(text),
            ResponseBody::Empty => Bytes::new(),
        };
        (self.status, self.headers, bytes)
    }
}

/// What a handler or guard produced.
#[derive(Debug, Clone)]
pub enum HandlerOutput {
    Response(NormalizedResponse),
    /// A bare value, sent as a 200 JSON body.
    Value(Value),
}

impl HandlerOutput {
    pub fn into_response(self) -> NormalizedResponse {
        match self {
            HandlerOutput::Response(response) => response,
            HandlerOutput::Value(value) => NormalizedResponse::new(StatusCode::OK, ResponseBody::Json(value)),
        }
    }
}

impl From<NormalizedResponse> for HandlerOutput {
    fn from(response: NormalizedResponse) -> Self {
        HandlerOutput::Response(response)
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Value(value)
    }
}

pub type HandlerResult = Result<HandlerOutput, ApiError>;
