//! User Entity
//!
//! Core user profile entity. The phone number is the login identifier;
//! a password credential is optional (set after the first OTP sign-in).

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    phone::Phone, public_id::PublicId, user_id::UserId, user_role::UserRole,
    user_status::UserStatus,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// Canonical phone number (unique, for sign-in and OTP delivery)
    pub phone: Phone,
    /// Display name
    pub user_name: String,
    /// Role (User, Admin)
    pub user_role: UserRole,
    /// Status (Active, Banned)
    pub user_status: UserStatus,
    /// Argon2id password hash, if the user has set a password
    pub password_hash: Option<String>,
    /// Last successful sign-in time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(phone: Phone, user_name: String) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            phone,
            user_name,
            user_role: UserRole::default(),
            user_status: UserStatus::default(),
            password_hash: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful sign-in
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Check if user can sign in
    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    /// Set or replace the password hash
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = Some(hash);
        self.updated_at = Utc::now();
    }

    /// Update user status
    pub fn set_status(&mut self, status: UserStatus) {
        self.user_status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(Phone::new("09123456789").unwrap(), "Sara".to_string())
    }

    #[test]
    fn test_new_user_defaults() {
        let user = sample_user();
        assert_eq!(user.user_role, UserRole::User);
        assert_eq!(user.user_status, UserStatus::Active);
        assert!(user.password_hash.is_none());
        assert!(user.can_login());
    }

    #[test]
    fn test_banned_user_cannot_login() {
        let mut user = sample_user();
        user.set_status(UserStatus::Banned);
        assert!(!user.can_login());
    }

    #[test]
    fn test_record_login() {
        let mut user = sample_user();
        assert!(user.last_login_at.is_none());
        user.record_login();
        assert!(user.last_login_at.is_some());
    }
}
