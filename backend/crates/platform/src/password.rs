//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Optional pepper (application-wide secret)

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains invalid characters (control characters)
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation
    ///
    /// Unicode is normalized using NFKC before validation; length is
    /// counted in Unicode code points, not bytes.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        // NIST: Unicode NFKC normalization before processing
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        if normalized.chars().any(|c| c.is_control()) {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        Ok(Self(normalized))
    }

    /// Access the normalized password bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClearTextPassword(***)")
    }
}

// ============================================================================
// Hashing / Verification
// ============================================================================

fn argon2_with_pepper(pepper: Option<&[u8]>) -> Result<Argon2<'_>, PasswordHashError> {
    match pepper {
        Some(secret) => Argon2::new_with_secret(
            secret,
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::default(),
        )
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string())),
        None => Ok(Argon2::default()),
    }
}

/// Hash a password with Argon2id, producing a PHC-format string
pub fn hash_password(
    password: &ClearTextPassword,
    pepper: Option<&[u8]>,
) -> Result<String, PasswordHashError> {
    let argon2 = argon2_with_pepper(pepper)?;
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
}

/// Verify a password against a PHC-format hash
///
/// A wrong password returns `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(
    password: &ClearTextPassword,
    hash: &str,
    pepper: Option<&[u8]>,
) -> Result<bool, PasswordHashError> {
    let argon2 = argon2_with_pepper(pepper)?;
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordHashError::HashingFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_too_short() {
        let err = ClearTextPassword::new("short".to_string()).unwrap_err();
        assert!(matches!(err, PasswordPolicyError::TooShort { .. }));
    }

    #[test]
    fn test_policy_whitespace_only() {
        let err = ClearTextPassword::new("        ".to_string()).unwrap_err();
        assert_eq!(err, PasswordPolicyError::EmptyOrWhitespace);
    }

    #[test]
    fn test_policy_control_characters() {
        let err = ClearTextPassword::new("pass\u{0000}word".to_string()).unwrap_err();
        assert_eq!(err, PasswordPolicyError::InvalidCharacter);
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let hash = hash_password(&password, None).unwrap();

        assert!(verify_password(&password, &hash, None).unwrap());

        let wrong = ClearTextPassword::new("incorrect horse".to_string()).unwrap();
        assert!(!verify_password(&wrong, &hash, None).unwrap());
    }

    #[test]
    fn test_pepper_changes_verification() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let pepper = b"application-wide-secret";
        let hash = hash_password(&password, Some(pepper)).unwrap();

        assert!(verify_password(&password, &hash, Some(pepper)).unwrap());
        assert!(!verify_password(&password, &hash, None).unwrap());
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        assert_eq!(format!("{:?}", password), "ClearTextPassword(***)");
    }
}
