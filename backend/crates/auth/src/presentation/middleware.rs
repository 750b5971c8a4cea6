//! Auth Middleware
//!
//! Request-level gate resolving a credential cookie pair to an identity.
//! `require_auth` short-circuits with 401; `maybe_auth` degrades to
//! anonymous and lets handlers decide what identity unlocks.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::credentials::Credentials;
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthGateState<R>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Resolved request identity, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub public_id: String,
    pub phone: String,
    pub user_name: String,
    pub role: UserRole,
    /// Credential pair that authenticated this request
    pub session_token: String,
    pub auth_key: String,
    pub expires_at_ms: i64,
}

impl AuthUser {
    fn from_user(user: &User, session_token: String, auth_key: String, expires_at_ms: i64) -> Self {
        Self {
            user_id: user.user_id,
            public_id: user.public_id.to_string(),
            phone: user.phone.as_str().to_string(),
            user_name: user.user_name.clone(),
            role: user.user_role,
            session_token,
            auth_key,
            expires_at_ms,
        }
    }

    /// The credential pair as issued (for re-persisting after revocation)
    pub fn credentials(&self) -> Credentials {
        Credentials {
            session_token: self.session_token.clone(),
            auth_key: self.auth_key.clone(),
            expires_at_ms: self.expires_at_ms,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Anonymous-tolerant identity, stored by `maybe_auth`
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// Extract and transport-verify both credential cookies
///
/// Returns `(session_token, auth_key)` only when both cookies are
/// present and carry valid transport signatures.
pub fn extract_credentials(headers: &HeaderMap, config: &AuthConfig) -> Option<(String, String)> {
    let session_cookie = platform::cookie::extract_cookie(headers, &config.session_cookie_name)?;
    let auth_key_cookie = platform::cookie::extract_cookie(headers, &config.auth_key_cookie_name)?;

    let session_token = platform::cookie::verify_value(&config.cookie_secret, &session_cookie)?;
    let auth_key = platform::cookie::verify_value(&config.cookie_secret, &auth_key_cookie)?;

    Some((session_token, auth_key))
}

async fn resolve_identity<R>(
    state: &AuthGateState<R>,
    headers: &HeaderMap,
) -> Result<AuthUser, AuthError>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let (session_token, auth_key) =
        extract_credentials(headers, &state.config).ok_or(AuthError::SessionInvalid)?;

    let use_case =
        CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let (user, payload) = use_case.resolve(&session_token, &auth_key).await?;

    Ok(AuthUser::from_user(&user, session_token, auth_key, payload.exp))
}

/// Middleware that requires a valid session
pub async fn require_auth<R>(
    State(state): State<AuthGateState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    match resolve_identity(&state, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Middleware that resolves identity when present but never rejects
pub async fn maybe_auth<R>(
    State(state): State<AuthGateState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let identity = resolve_identity(&state, req.headers()).await.ok();
    req.extensions_mut().insert(MaybeAuthUser(identity));

    next.run(req).await
}
