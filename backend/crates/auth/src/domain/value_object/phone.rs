//! Phone Value Object
//!
//! Normalized mobile phone number used as the login identifier.
//! Accepts local (`09…`) and international (`+989…`, `00989…`) notation
//! and canonicalizes to the local 11-digit form so that the same number
//! always maps to the same user and OTP key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phone validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Phone number contains invalid characters")]
    InvalidCharacter,

    #[error("Phone number has invalid length")]
    InvalidLength,

    #[error("Phone number has an unrecognized prefix")]
    InvalidPrefix,
}

/// Canonical mobile phone number (11 digits, `09` prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse and canonicalize a phone number
    pub fn new(raw: &str) -> Result<Self, PhoneError> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();

        let digits = match compact.strip_prefix('+') {
            Some(rest) => rest.to_string(),
            None => compact,
        };

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }

        // Canonical local form: 09XXXXXXXXX
        let local = if let Some(rest) = digits.strip_prefix("0098") {
            format!("0{}", rest)
        } else if let Some(rest) = digits.strip_prefix("98") {
            format!("0{}", rest)
        } else {
            digits
        };

        if local.len() != 11 {
            return Err(PhoneError::InvalidLength);
        }
        if !local.starts_with("09") {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(local))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Phone::new(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_form_accepted() {
        let phone = Phone::new("09123456789").unwrap();
        assert_eq!(phone.as_str(), "09123456789");
    }

    #[test]
    fn test_international_forms_canonicalized() {
        assert_eq!(Phone::new("+989123456789").unwrap().as_str(), "09123456789");
        assert_eq!(Phone::new("989123456789").unwrap().as_str(), "09123456789");
        assert_eq!(Phone::new("00989123456789").unwrap().as_str(), "09123456789");
    }

    #[test]
    fn test_whitespace_and_dashes_stripped() {
        assert_eq!(Phone::new("0912 345-6789").unwrap().as_str(), "09123456789");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert_eq!(Phone::new("0912345678a").unwrap_err(), PhoneError::InvalidCharacter);
        assert_eq!(Phone::new("0912345678").unwrap_err(), PhoneError::InvalidLength);
        assert_eq!(Phone::new("08123456789").unwrap_err(), PhoneError::InvalidPrefix);
    }
}
