//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session token cookie name
    pub session_cookie_name: String,
    /// Auth key cookie name
    pub auth_key_cookie_name: String,
    /// Secret for HMAC-signing session tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Secret for HMAC-signing cookie values at the transport layer
    pub cookie_secret: [u8; 32],
    /// Session lifetime; also the cookies' Max-Age and the store TTL
    pub session_ttl: Duration,
    /// OTP lifetime
    pub otp_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "_session".to_string(),
            auth_key_cookie_name: "_auth_key".to_string(),
            token_secret: [0u8; 32],
            cookie_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            otp_ttl: Duration::from_secs(120),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut token_secret = [0u8; 32];
        let mut cookie_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut token_secret);
        rand::rng().fill_bytes(&mut cookie_secret);
        Self {
            token_secret,
            cookie_secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
