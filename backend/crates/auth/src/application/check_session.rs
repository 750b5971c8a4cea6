//! Check Session Use Case
//!
//! Resolves a presented credential pair to a user, running the full
//! gate sequence: token verification (pure), subject load, store check.
//! Any failure is `Unauthorized`-class; the middleware decides whether
//! that short-circuits the request or degrades to anonymous.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::domain::entity::credentials::TokenPayload;
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> CheckSessionUseCase<U, S>
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

    /// Resolve the credential pair to its user and token claims
    pub async fn resolve(
        &self,
        session_token: &str,
        auth_key: &str,
    ) -> AuthResult<(User, TokenPayload)> {
        let credential_service = CredentialService::new(self.store.clone(), self.config.clone());

        let payload = credential_service.verify(session_token)?;
        let subject = payload.subject_id();

        let user = self
            .user_repo
            .find_by_id(&subject)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !credential_service
            .check_active(&subject, auth_key, session_token)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok((user, payload))
    }

    /// Best-effort variant: `None` instead of an error
    pub async fn resolve_soft(
        &self,
        session_token: &str,
        auth_key: &str,
    ) -> Option<(User, TokenPayload)> {
        self.resolve(session_token, auth_key).await.ok()
    }
}
