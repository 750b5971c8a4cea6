//! OTP Code Value Object
//!
//! Fixed-length numeric one-time code. Generation uses the platform
//! CSPRNG; comparison is constant-time so a mismatched verify leaks
//! nothing about the stored code.

use std::fmt;

use platform::crypto::{constant_time_eq, numeric_code};

/// Number of digits in a generated code
pub const OTP_CODE_LEN: usize = 6;

/// One-time verification code
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        Self(numeric_code(OTP_CODE_LEN))
    }

    /// Wrap a stored code value
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Check a user-presented code against this one
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), presented.trim().as_bytes())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never log the code itself
        write!(f, "OtpCode(***)")
    }
}
