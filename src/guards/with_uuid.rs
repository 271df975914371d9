//! UUID-shape guard for the final path segment.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::BAD_REQUEST;
use crate::pipeline::middleware::{Guard, Next};
use crate::pipeline::request::NormalizedRequest;
use crate::pipeline::response::HandlerResult;

/// Only the canonical `8-4-4-4-12` form is accepted.
const HYPHENATED_LEN: usize = 36;

pub struct WithUuid;

#[async_trait]
impl Guard for WithUuid {
    async fn handle(&self, req: NormalizedRequest, next: Next<'_>) -> HandlerResult {
        let valid = req
            .last_segment()
            .is_some_and(|segment| segment.len() == HYPHENATED_LEN && Uuid::try_parse(&segment).is_ok());
        if !valid {
            return Err(BAD_REQUEST.into());
        }
        next.run(req).await
    }

    fn name(&self) -> &'static str {
        "with_uuid"
    }
}
