//! OTP Service
//!
//! Issues and verifies one-time codes. At most one code is outstanding
//! per phone; a second request while one is live fails with the
//! remaining TTL so the client can render a countdown.
//!
//! SMS dispatch is an external collaborator; here issuing a code only
//! logs the event.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::credentials::otp_key;
use crate::domain::repository::{PutOutcome, SessionStore, UserRepository};
use crate::domain::value_object::{otp_code::OtpCode, phone::Phone};
use crate::error::{AuthError, AuthResult};

/// Outcome of an OTP verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerdict {
    /// No live code for this phone (never requested, or TTL elapsed)
    Expired,
    /// A live code exists but the presented one does not match;
    /// the stored code is NOT consumed, retry is allowed within the TTL
    Mismatch,
    /// Code matched and was consumed
    Matched,
}

/// OTP issuing/verifying service
pub struct OtpService<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> OtpService<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            store,
            config,
        }
    }

    /// Issue a code for `phone`
    ///
    /// Fails `PhoneBanned` for banned numbers and `OtpAlreadySent` (with
    /// the remaining TTL) while a previous code is still live. The
    /// existence check and the reservation are one atomic store call, so
    /// two concurrent requests cannot both issue a code.
    pub async fn request(&self, phone: &Phone) -> AuthResult<OtpCode> {
        if self.user_repo.is_phone_banned(phone).await? {
            return Err(AuthError::PhoneBanned);
        }

        let code = OtpCode::generate();

        let outcome = self
            .store
            .put_if_absent(&otp_key(phone.as_str()), code.as_str(), self.config.otp_ttl)
            .await?;

        match outcome {
            PutOutcome::Stored => {
                // SMS dispatch is out of scope; the code is returned to the
                // caller and the event is logged.
                tracing::info!(phone = %phone, ttl_secs = self.config.otp_ttl.as_secs(), "OTP issued");
                Ok(code)
            }
            PutOutcome::Exists { remaining } => Err(AuthError::OtpAlreadySent {
                remaining_secs: remaining.as_secs(),
            }),
        }
    }

    /// Verify a presented code
    pub async fn verify(&self, phone: &Phone, presented: &str) -> AuthResult<OtpVerdict> {
        let key = otp_key(phone.as_str());

        let stored = match self.store.get(&key).await? {
            Some(value) => OtpCode::from_stored(value),
            None => return Ok(OtpVerdict::Expired),
        };

        if !stored.matches(presented) {
            return Ok(OtpVerdict::Mismatch);
        }

        // Consume on success only
        self.store.delete(&key).await?;

        tracing::info!(phone = %phone, "OTP verified");
        Ok(OtpVerdict::Matched)
    }
}
