//! Sign In Use Cases
//!
//! OTP sign-in (which doubles as sign-up for unknown phones) and
//! password sign-in. Both end in the same way: mint a credential pair,
//! persist it, hand it to the presentation layer for cookie transport.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::application::otp::{OtpService, OtpVerdict};
use crate::domain::entity::credentials::Credentials;
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::phone::Phone;
use crate::error::{AuthError, AuthResult};

/// OTP sign-in input
pub struct OtpSignInInput {
    pub phone: Phone,
    pub code: String,
}

/// Password sign-in input
pub struct PasswordSignInInput {
    pub phone: Phone,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// Credential pair for cookie transport
    pub credentials: Credentials,
    /// Public ID of the signed-in user
    pub public_id: String,
    /// True if this sign-in created the account (OTP path only)
    pub created: bool,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
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

    /// Sign in with a one-time code; creates the account on first use
    pub async fn execute_otp(&self, input: OtpSignInInput) -> AuthResult<SignInOutput> {
        let otp = OtpService::new(
            self.user_repo.clone(),
            self.store.clone(),
            self.config.clone(),
        );

        match otp.verify(&input.phone, &input.code).await? {
            OtpVerdict::Expired => return Err(AuthError::OtpExpired),
            OtpVerdict::Mismatch => return Err(AuthError::OtpMismatch),
            OtpVerdict::Matched => {}
        }

        let (user, created) = match self.user_repo.find_by_phone(&input.phone).await? {
            Some(user) => (user, false),
            None => {
                if self.user_repo.is_phone_banned(&input.phone).await? {
                    return Err(AuthError::PhoneBanned);
                }

                let user = User::new(input.phone.clone(), input.phone.as_str().to_string());
                self.user_repo.create(&user).await?;

                tracing::info!(public_id = %user.public_id, "User signed up");
                (user, true)
            }
        };

        self.finish_sign_in(user, created).await
    }

    /// Sign in with phone + password
    pub async fn execute_password(&self, input: PasswordSignInInput) -> AuthResult<SignInOutput> {
        let user = self
            .user_repo
            .find_by_phone(&input.phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountBanned);
        }

        // A user that never set a password cannot use this path
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::new(input.password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let valid = platform::password::verify_password(&password, hash, self.config.pepper())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.finish_sign_in(user, false).await
    }

    async fn finish_sign_in(&self, mut user: User, created: bool) -> AuthResult<SignInOutput> {
        if !user.can_login() {
            return Err(AuthError::AccountBanned);
        }

        user.record_login();
        self.user_repo.update(&user).await?;

        let credential_service = CredentialService::new(self.store.clone(), self.config.clone());
        let credentials = credential_service.issue(&user.user_id);
        credential_service.persist(&credentials, &user.user_id).await?;

        tracing::info!(public_id = %user.public_id, created, "User signed in");

        Ok(SignInOutput {
            credentials,
            public_id: user.public_id.to_string(),
            created,
        })
    }
}
