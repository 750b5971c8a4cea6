//! Sign Out Use Case
//!
//! Deletes the server-side session entry; the client cookies are
//! cleared by the presentation layer regardless of the outcome here.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionStore + Clone + Send + Sync + 'static,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    /// Revoke the current login only
    pub async fn execute(&self, subject: &UserId, auth_key: &str) -> AuthResult<()> {
        CredentialService::new(self.store.clone(), self.config.clone())
            .revoke_one(subject, auth_key)
            .await
    }

    /// Revoke every login of the subject
    pub async fn execute_all(&self, subject: &UserId) -> AuthResult<u64> {
        CredentialService::new(self.store.clone(), self.config.clone())
            .revoke_all(subject)
            .await
    }
}
