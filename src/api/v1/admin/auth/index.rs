use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::{ApiError, BAD_REQUEST};
use crate::pipeline::middleware::handler_fn;
use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;
use crate::routing::HandlerUnit;
use crate::services::{AdminService, Services};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenRequest {
    user_id: Option<String>,
    password: Option<String>,
}

pub fn unit(services: &Services) -> HandlerUnit {
    let admin = services.admin.clone();
    HandlerUnit::new(file!()).post(handler_fn(move |req| post(admin.clone(), req)))
}

/// Issue an admin token for an existing user. When a password is supplied
/// it must match the user's stored credential.
async fn post(admin: Arc<AdminService>, req: NormalizedRequest) -> HandlerResult {
    let body: CreateTokenRequest = req.json()?;

    let user_id = body
        .user_id
        .as_deref()
        .and_then(|raw| Uuid::try_parse(raw).ok())
        .ok_or_else(|| ApiError::from(BAD_REQUEST))?;

    if admin.get_user(user_id).await?.is_none() {
        tracing::debug!(user_id = %user_id, "Token requested for unknown user");
        return Err(BAD_REQUEST.into());
    }

    if let Some(password) = body.password.as_deref() {
        if !admin.credential_check(user_id, password).await? {
            tracing::warn!(user_id = %user_id, "Token request with wrong credentials");
            return Err(BAD_REQUEST.into());
        }
    }

    let token = admin.create_token(user_id).await?;
    Ok(json!({ "token": token }).into())
}
