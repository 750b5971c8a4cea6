//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, OtpService, OtpSignInInput, PasswordSignInInput, SetPasswordUseCase,
    SignInUseCase, SignOutUseCase,
};
use crate::domain::entity::credentials::Credentials;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::phone::Phone;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    PasswordSignInRequest, RequestOtpRequest, RequestOtpResponse, SessionStatusResponse,
    SetPasswordRequest, SignInResponse, VerifyOtpRequest,
};
use crate::presentation::middleware::extract_credentials;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// OTP
// ============================================================================

/// POST /api/auth/otp/request
pub async fn request_otp<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RequestOtpRequest>,
) -> AuthResult<Json<RequestOtpResponse>>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let phone = Phone::new(&req.phone)?;

    let use_case = OtpService::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let code = use_case.request(&phone).await?;

    Ok(Json(RequestOtpResponse {
        code: code.as_str().to_string(),
        ttl_secs: state.config.otp_ttl.as_secs(),
    }))
}

/// POST /api/auth/otp/verify
///
/// Verifying a code signs the user in; an unknown phone is signed up
/// first. Sets both credential cookies on success.
pub async fn verify_otp<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let phone = Phone::new(&req.phone)?;

    let use_case = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let output = use_case
        .execute_otp(OtpSignInInput {
            phone,
            code: req.code,
        })
        .await?;

    let status = if output.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        set_credential_cookies(&state.config, &output.credentials),
        Json(SignInResponse {
            public_id: output.public_id,
            created: output.created,
        }),
    ))
}

// ============================================================================
// Password Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn password_sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<PasswordSignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let phone = Phone::new(&req.phone)?;

    let use_case = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let output = use_case
        .execute_password(PasswordSignInInput {
            phone,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::OK,
        set_credential_cookies(&state.config, &output.credentials),
        Json(SignInResponse {
            public_id: output.public_id,
            created: false,
        }),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
///
/// Best-effort: the server-side entry is removed when the cookies still
/// resolve, and the cookies are cleared either way.
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    if let Some((session_token, auth_key)) = extract_credentials(&headers, &state.config) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());

        // Token verification yields the subject without a store call;
        // failures just mean there is nothing to revoke.
        let credential_service = crate::application::CredentialService::new(
            state.repo.clone(),
            state.config.clone(),
        );
        if let Ok(payload) = credential_service.verify(&session_token) {
            let _ = use_case.execute(&payload.subject_id(), &auth_key).await;
        }
    }

    Ok((
        StatusCode::NO_CONTENT,
        clear_credential_cookies(&state.config),
    ))
}

/// POST /api/auth/signout/all
///
/// Requires a valid session; revokes every login of the subject.
pub async fn sign_out_all<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let (session_token, auth_key) =
        extract_credentials(&headers, &state.config).ok_or(AuthError::SessionInvalid)?;

    let check = CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let (user, _) = check.resolve(&session_token, &auth_key).await?;

    let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute_all(&user.user_id).await?;

    Ok((
        StatusCode::NO_CONTENT,
        clear_credential_cookies(&state.config),
    ))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let resolved = match extract_credentials(&headers, &state.config) {
        Some((session_token, auth_key)) => {
            let check = CheckSessionUseCase::new(
                state.repo.clone(),
                state.repo.clone(),
                state.config.clone(),
            );
            check.resolve_soft(&session_token, &auth_key).await
        }
        None => None,
    };

    match resolved {
        Some((user, payload)) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(user.public_id.to_string()),
            user_name: Some(user.user_name.clone()),
            user_role: Some(user.user_role.code().to_string()),
            expires_at_ms: Some(payload.exp),
        })),
        None => Ok(Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            user_name: None,
            user_role: None,
            expires_at_ms: None,
        })),
    }
}

// ============================================================================
// Password
// ============================================================================

/// PUT /api/auth/password
///
/// Sets/replaces the password; every other session is revoked.
pub async fn set_password<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<SetPasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let (session_token, auth_key) =
        extract_credentials(&headers, &state.config).ok_or(AuthError::SessionInvalid)?;

    let check = CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let (user, payload) = check.resolve(&session_token, &auth_key).await?;

    let current = Credentials {
        session_token,
        auth_key,
        expires_at_ms: payload.exp,
    };

    let use_case =
        SetPasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    use_case.execute(user, req.password, &current).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn cookie_config(config: &AuthConfig, name: &str) -> platform::cookie::CookieConfig {
    platform::cookie::CookieConfig {
        name: name.to_string(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.session_ttl.as_secs() as i64),
    }
}

/// Build both Set-Cookie headers with transport-signed values
fn set_credential_cookies(
    config: &AuthConfig,
    credentials: &Credentials,
) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    let session = cookie_config(config, &config.session_cookie_name).build_set_cookie(
        &platform::cookie::sign_value(&config.cookie_secret, &credentials.session_token),
    );
    let auth_key = cookie_config(config, &config.auth_key_cookie_name).build_set_cookie(
        &platform::cookie::sign_value(&config.cookie_secret, &credentials.auth_key),
    );

    AppendHeaders([
        (header::SET_COOKIE, session),
        (header::SET_COOKIE, auth_key),
    ])
}

/// Build both expired Set-Cookie headers
fn clear_credential_cookies(
    config: &AuthConfig,
) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            cookie_config(config, &config.session_cookie_name).build_delete_cookie(),
        ),
        (
            header::SET_COOKIE,
            cookie_config(config, &config.auth_key_cookie_name).build_delete_cookie(),
        ),
    ])
}
