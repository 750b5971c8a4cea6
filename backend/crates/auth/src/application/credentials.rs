//! Credential Service
//!
//! Mints, persists, verifies and revokes the session credential pair.
//!
//! A session is valid iff BOTH hold:
//! (a) the token's signature and expiry check out (pure, no store call),
//! (b) the store entry `session:<subject>:<auth_key>` equals the
//!     presented token.
//! Deleting the entry therefore revokes the session server-side without
//! any token blacklist.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::application::config::AuthConfig;
use crate::domain::entity::credentials::{
    Credentials, TokenPayload, session_key, session_prefix,
};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Credential issuing/verifying service
pub struct CredentialService<S>
where
    S: SessionStore + Clone + Send + Sync + 'static,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CredentialService<S>
where
    S: SessionStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    /// Mint a fresh credential pair for `subject`
    ///
    /// Does not persist anything; the session only becomes authoritative
    /// once [`persist`](Self::persist) stores it.
    pub fn issue(&self, subject: &UserId) -> Credentials {
        let now_ms = Utc::now().timestamp_millis();
        let expires_at_ms = now_ms + self.config.session_ttl.as_millis() as i64;

        let payload = TokenPayload {
            sub: *subject.as_uuid(),
            iat: now_ms,
            exp: expires_at_ms,
        };

        let session_token = self.encode_token(&payload);
        let auth_key = URL_SAFE_NO_PAD.encode(platform::crypto::random_bytes(24));

        Credentials {
            session_token,
            auth_key,
            expires_at_ms,
        }
    }

    /// Store the pair server-side, making the session authoritative
    pub async fn persist(&self, credentials: &Credentials, subject: &UserId) -> AuthResult<()> {
        let remaining_ms = credentials.expires_at_ms - Utc::now().timestamp_millis();
        let ttl = std::time::Duration::from_millis(remaining_ms.max(0) as u64);

        self.store
            .put(
                &session_key(subject, &credentials.auth_key),
                &credentials.session_token,
                ttl,
            )
            .await
    }

    /// Check signature and expiry only (no store round-trip)
    ///
    /// Fails closed: any malformed, expired or wrongly-signed token is
    /// `SessionInvalid`, never a panic or a raw decode error.
    pub fn verify(&self, token: &str) -> AuthResult<TokenPayload> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(AuthError::SessionInvalid)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.config.token_secret)
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::SessionInvalid)?;

        mac.verify_slice(&signature)
            .map_err(|_| AuthError::SessionInvalid)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::SessionInvalid)?;

        let payload: TokenPayload =
            serde_json::from_slice(&payload_bytes).map_err(|_| AuthError::SessionInvalid)?;

        if payload.is_expired() {
            return Err(AuthError::SessionInvalid);
        }

        Ok(payload)
    }

    /// Compare the presented token against the stored one
    ///
    /// Any mismatch — including "not found", i.e. already revoked — is
    /// simply `false`, not an error.
    pub async fn check_active(
        &self,
        subject: &UserId,
        auth_key: &str,
        session_token: &str,
    ) -> AuthResult<bool> {
        let stored = self.store.get(&session_key(subject, auth_key)).await?;

        Ok(match stored {
            Some(value) => {
                platform::crypto::constant_time_eq(value.as_bytes(), session_token.as_bytes())
            }
            None => false,
        })
    }

    /// Revoke one login (sign-out of the current device)
    pub async fn revoke_one(&self, subject: &UserId, auth_key: &str) -> AuthResult<()> {
        self.store.delete(&session_key(subject, auth_key)).await?;

        tracing::info!(subject = %subject, "Session revoked");
        Ok(())
    }

    /// Revoke every login of a subject (ban, password change, sign-out-everywhere)
    pub async fn revoke_all(&self, subject: &UserId) -> AuthResult<u64> {
        let revoked = self.store.delete_by_prefix(&session_prefix(subject)).await?;

        tracing::info!(subject = %subject, sessions_revoked = revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Sign a token payload: `base64url(json) "." base64url(hmac)`
    fn encode_token(&self, payload: &TokenPayload) -> String {
        let payload_json =
            serde_json::to_vec(payload).expect("TokenPayload serialization cannot fail");
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);

        let mut mac = Hmac::<Sha256>::new_from_slice(&self.config.token_secret)
            .expect("HMAC can take key of any size");
        mac.update(payload_b64.as_bytes());
        let signature = mac.finalize().into_bytes();

        format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(signature))
    }
}
