//! Error taxonomy and classification.
//!
//! # Responsibilities
//! - Hold the closed registry of API-documented failures
//! - Classify raised errors as known (rendered verbatim) or unknown
//!   (logged, replaced by SERVER_ERROR)
//!
//! # Design Decisions
//! - Identity of a definition is its code string
//! - Handlers and guards raise by value; only the host boundary renders

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::store::StoreError;

/// A user-facing failure: machine code, human message, HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDefinition {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ErrorDefinition {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// The `{code, message}` wire body.
    pub fn body(&self) -> Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Registry entry; the static form of [`ErrorDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Known {
    pub code: &'static str,
    pub message: &'static str,
    pub status: u16,
}

impl Known {
    pub fn definition(&self) -> ErrorDefinition {
        ErrorDefinition::new(self.code, self.message, self.status)
    }
}

pub const ARTICLE_NOT_FOUND: Known = Known {
    code: "ARTICLE_NOT_FOUND",
    message: "The requested article could not be found.",
    status: 404,
};

pub const RESOURCE_NOT_FOUND: Known = Known {
    code: "RESOURCE_NOT_FOUND",
    message: "The requested resource could not be found.",
    status: 404,
};

pub const USER_UNAUTHORIZED: Known = Known {
    code: "USER_UNAUTHORIZED",
    message: "You do not have permission to access this resource.",
    status: 401,
};

pub const INVALID_INPUT: Known = Known {
    code: "INVALID_INPUT",
    message: "The provided input is invalid.",
    status: 400,
};

pub const BAD_REQUEST: Known = Known {
    code: "BAD_REQUEST",
    message: "The request is malformed or missing required fields.",
    status: 400,
};

pub const DATABASE_ERROR: Known = Known {
    code: "DATABASE_ERROR",
    message: "An error occurred while accessing the database.",
    status: 500,
};

pub const SERVER_ERROR: Known = Known {
    code: "SERVER_ERROR",
    message: "An unexpected server error occurred. Please try again later.",
    status: 500,
};

/// The closed registry. Built at compile time, never extended.
pub const REGISTRY: &[Known] = &[
    ARTICLE_NOT_FOUND,
    RESOURCE_NOT_FOUND,
    USER_UNAUTHORIZED,
    INVALID_INPUT,
    BAD_REQUEST,
    DATABASE_ERROR,
    SERVER_ERROR,
];

/// Look up a registered definition by code.
pub fn lookup(code: &str) -> Option<&'static Known> {
    REGISTRY.iter().find(|k| k.code == code)
}

/// True iff `value` has string `code`, string `message`, numeric `status`,
/// and `code` is registered.
pub fn is_known_error(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let code = obj.get("code").and_then(Value::as_str);
    let has_message = obj.get("message").is_some_and(Value::is_string);
    let has_status = obj.get("status").is_some_and(Value::is_number);

    match code {
        Some(code) => has_message && has_status && lookup(code).is_some(),
        None => false,
    }
}

/// Errors raised by handlers and guards.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A definition raised by value. Only registered codes render verbatim.
    #[error("{}: {}", .0.code, .0.message)]
    Defined(ErrorDefinition),

    /// An arbitrary structured value; rendered verbatim only if it is a known error.
    #[error("raised value: {0}")]
    Value(Value),

    /// Data store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// Resolve to the definition that may be shown to the client, or `None`
    /// when the failure is unexpected and must be masked.
    pub fn classify(&self) -> Option<ErrorDefinition> {
        match self {
            ApiError::Defined(def) => lookup(&def.code).map(|_| def.clone()),
            ApiError::Value(value) if is_known_error(value) => {
                serde_json::from_value(value.clone()).ok()
            }
            ApiError::Value(_) => None,
            ApiError::Store(_) => Some(DATABASE_ERROR.definition()),
            ApiError::Internal(_) => None,
        }
    }
}

impl From<Known> for ApiError {
    fn from(known: Known) -> Self {
        ApiError::Defined(known.definition())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("json: {err}"))
    }
}
