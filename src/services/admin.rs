//! Admin users and access tokens.

use std::sync::Arc;

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use chrono::{Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use crate::store::{AdminToken, ContentStore, StoreResult, User};

/// Opaque password check against a stored hash.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Argon2 PHC-string verification.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

pub struct AdminService {
    store: Arc<dyn ContentStore>,
    verifier: Arc<dyn CredentialVerifier>,
    token_ttl: Duration,
}

impl AdminService {
    pub fn new(
        store: Arc<dyn ContentStore>,
        verifier: Arc<dyn CredentialVerifier>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            store,
            verifier,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// True iff the token exists, has not expired and is not revoked.
    pub async fn validate_token(&self, token: &str) -> StoreResult<bool> {
        let record = self.store.find_admin_token(token).await?;
        Ok(record.is_some_and(|t| t.is_active_at(Utc::now())))
    }

    pub async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        self.store.find_user(user_id).await
    }

    /// False for unknown users and wrong passwords alike.
    pub async fn credential_check(&self, user_id: Uuid, password: &str) -> StoreResult<bool> {
        let Some(user) = self.store.find_user(user_id).await? else {
            return Ok(false);
        };
        Ok(self.verifier.verify(password, &user.password_hash))
    }

    /// Issue a fresh token for `user_id`: 32 random bytes, hex encoded.
    pub async fn create_token(&self, user_id: Uuid) -> StoreResult<String> {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let token = hex::encode(raw);

        let now = Utc::now();
        self.store
            .insert_admin_token(AdminToken {
                id: Uuid::new_v4(),
                user_id,
                token: token.clone(),
                created_at: now,
                expires_at: now + self.token_ttl,
                last_active_at: None,
                revoked: false,
            })
            .await?;

        tracing::info!(user_id = %user_id, ttl_hours = self.token_ttl.num_hours(), "Admin token issued");
        Ok(token)
    }
}
