//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entity::user::User;
use crate::domain::value_object::{phone::Phone, public_id::PublicId, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user together with their (empty) cart
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by public ID
    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    /// Find user by phone number
    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>>;

    /// Check whether a phone number is on the ban list
    async fn is_phone_banned(&self, phone: &Phone) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Outcome of a conditional put into the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The entry was stored
    Stored,
    /// An unexpired entry already exists; carries its remaining lifetime
    Exists { remaining: Duration },
}

/// Key-value store with per-entry TTL, backing sessions and OTP codes
///
/// Entries past their expiry are invisible to reads; physical removal is
/// the housekeeping job's business. Only the credential and OTP issuers
/// touch this store.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Store (or overwrite) an entry with a TTL
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;

    /// Store an entry only if no live entry exists at `key`
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> AuthResult<PutOutcome>;

    /// Read a live entry
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Delete an entry (absent is not an error)
    async fn delete(&self, key: &str) -> AuthResult<()>;

    /// Delete every entry whose key starts with `prefix`, returning the count
    async fn delete_by_prefix(&self, prefix: &str) -> AuthResult<u64>;

    /// Physically remove expired entries, returning the count
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
