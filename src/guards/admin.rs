//! Admin token guard.
//!
//! A request passes iff `X-Adm-Token` is present AND names an active token.
//! Any rejection answers RESOURCE_NOT_FOUND so protected routes are not
//! revealed to unauthenticated callers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::RESOURCE_NOT_FOUND;
use crate::pipeline::middleware::{Guard, Next};
use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;
use crate::services::AdminService;

pub const ADMIN_TOKEN_HEADER: &str = "X-Adm-Token";

pub struct AdminRequired {
    admin: Arc<AdminService>,
}

impl AdminRequired {
    pub fn new(admin: Arc<AdminService>) -> Self {
        Self { admin }
    }
}

#[async_trait]
impl Guard for AdminRequired {
    async fn handle(&self, req: NormalizedRequest, next: Next<'_>) -> HandlerResult {
        let Some(token) = req.header(ADMIN_TOKEN_HEADER).filter(|t| !t.is_empty()) else {
            tracing::debug!(path = %req.path(), "Admin token missing");
            return Err(RESOURCE_NOT_FOUND.into());
        };

        if !self.admin.validate_token(token).await? {
            tracing::warn!(path = %req.path(), "Admin token rejected");
            return Err(RESOURCE_NOT_FOUND.into());
        }

        next.run(req).await
    }

    fn name(&self) -> &'static str {
        "admin_required"
    }
}
