//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// OTP
// ============================================================================

/// OTP request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpRequest {
    pub phone: String,
}

/// OTP response
///
/// SMS dispatch is an external collaborator; the code is returned to the
/// caller directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpResponse {
    pub code: String,
    pub ttl_secs: u64,
}

/// OTP verification (sign in / sign up)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Password sign in request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordSignInRequest {
    pub phone: String,
    pub password: String,
}

/// Sign in response (OTP and password paths)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub public_id: String,
    /// True if this sign-in created the account
    pub created: bool,
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub expires_at_ms: Option<i64>,
}

// ============================================================================
// Password
// ============================================================================

/// Set/change password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    pub password: String,
}
