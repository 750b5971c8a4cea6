//! User Status Value Object
//!
//! Two states only: a banned account cannot sign in, cannot request an
//! OTP, and has all of its sessions revoked at the moment of the ban.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserStatus {
    /// Normal active account - can sign in and use all features
    #[default]
    Active = 0,

    /// Banned account - cannot sign in or request codes
    Banned = 1,
}

impl UserStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Get string code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Banned => "banned",
        }
    }

    /// Check if sign-in is allowed
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[inline]
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => Self::Active,
            1 => Self::Banned,
            _ => {
                tracing::error!("Invalid UserStatus id: {}", id);
                unreachable!("Invalid UserStatus id: {}", id)
            }
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_login() {
        assert!(UserStatus::Active.can_login());
        assert!(!UserStatus::Banned.can_login());
    }

    #[test]
    fn test_ids_roundtrip() {
        assert_eq!(UserStatus::from_id(UserStatus::Active.id()), UserStatus::Active);
        assert_eq!(UserStatus::from_id(UserStatus::Banned.id()), UserStatus::Banned);
    }
}
