//! Set Password Use Case
//!
//! Sets or replaces the user's password credential. Replacing a
//! password revokes every session of the subject, then re-persists the
//! session that performed the change so the user is not logged out of
//! the device they are holding.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::domain::entity::credentials::Credentials;
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Set password use case
pub struct SetPasswordUseCase<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SetPasswordUseCase<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            store,
            config,
        }
    }

    /// Set/replace the password and revoke all other sessions
    ///
    /// `current` is the credential pair of the session performing the
    /// change; it is re-persisted after the blanket revocation.
    pub async fn execute(
        &self,
        mut user: User,
        new_password: String,
        current: &Credentials,
    ) -> AuthResult<()> {
        let password = ClearTextPassword::new(new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        let hash = platform::password::hash_password(&password, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        user.set_password_hash(hash);
        self.user_repo.update(&user).await?;

        let credential_service = CredentialService::new(self.store.clone(), self.config.clone());
        credential_service.revoke_all(&user.user_id).await?;
        credential_service.persist(current, &user.user_id).await?;

        tracing::info!(public_id = %user.public_id, "Password changed, other sessions revoked");
        Ok(())
    }
}
