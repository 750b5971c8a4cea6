//! Credentials Entity
//!
//! The session credential pair handed to a client after sign-in:
//! a signed, time-limited session token plus a random per-login auth
//! key. The pair is only authoritative while the session store holds
//! `session:<subject>:<auth_key>` mapping to the exact token value, so
//! deleting that entry revokes the session before the token expires.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::user_id::UserId;

/// Credential pair issued at sign-in
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Signed session token (client-held, also stored server-side)
    pub session_token: String,
    /// Random per-login key pairing the token to one revocable entry
    pub auth_key: String,
    /// Token expiry (Unix timestamp ms), mirrors the token's `exp`
    pub expires_at_ms: i64,
}

/// Claims encoded inside the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Subject (user UUID)
    pub sub: Uuid,
    /// Issued at (Unix timestamp ms)
    pub iat: i64,
    /// Expires at (Unix timestamp ms)
    pub exp: i64,
}

impl TokenPayload {
    pub fn subject_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.exp
    }
}

/// Session store key for one credential pair
pub fn session_key(subject: &UserId, auth_key: &str) -> String {
    format!("session:{}:{}", subject.as_uuid(), auth_key)
}

/// Session store key prefix covering every login of one subject
pub fn session_prefix(subject: &UserId) -> String {
    format!("session:{}:", subject.as_uuid())
}

/// OTP store key for one phone number
pub fn otp_key(phone: &str) -> String {
    format!("otp:{}", phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_layout() {
        let subject = UserId::new();
        let key = session_key(&subject, "abc");
        assert!(key.starts_with(&session_prefix(&subject)));
        assert!(key.ends_with(":abc"));
    }

    #[test]
    fn test_payload_expiry() {
        let now = Utc::now().timestamp_millis();

        let live = TokenPayload { sub: Uuid::new_v4(), iat: now, exp: now + 60_000 };
        assert!(!live.is_expired());

        let expired = TokenPayload { sub: Uuid::new_v4(), iat: now - 120_000, exp: now - 60_000 };
        assert!(expired.is_expired());
    }

    #[test]
    fn test_otp_key_layout() {
        assert_eq!(otp_key("09123456789"), "otp:09123456789");
    }
}
