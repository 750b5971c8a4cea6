//! Unit tests for the auth crate
//!
//! Use cases run against in-memory implementations of the repository
//! and session-store traits; no database is required.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, CredentialService, OtpService, OtpSignInInput, OtpVerdict,
    PasswordSignInInput, SetPasswordUseCase, SignInUseCase, SignOutUseCase,
};
use crate::domain::entity::credentials::otp_key;
use crate::domain::entity::user::User;
use crate::domain::repository::{PutOutcome, SessionStore, UserRepository};
use crate::domain::value_object::{
    phone::Phone, public_id::PublicId, user_id::UserId, user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// In-memory doubles
// ============================================================================

/// In-memory user repository + session store
#[derive(Clone, Default)]
struct MemAuthRepo {
    users: Arc<Mutex<HashMap<uuid::Uuid, User>>>,
    banned: Arc<Mutex<Vec<String>>>,
    /// key -> (value, expires_at_ms)
    entries: Arc<Mutex<HashMap<String, (String, i64)>>>,
}

impl MemAuthRepo {
    fn ban(&self, phone: &str) {
        self.banned.lock().unwrap().push(phone.to_string());
    }

    /// Force an entry to look expired (for TTL tests)
    fn backdate(&self, key: &str) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.1 = Utc::now().timestamp_millis() - 1;
        }
    }

    fn live_entry_count(&self) -> usize {
        let now = Utc::now().timestamp_millis();
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|(_, exp)| *exp > now)
            .count()
    }
}

impl UserRepository for MemAuthRepo {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users
            .lock()
            .unwrap()
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(user_id.as_uuid()).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.public_id == *public_id)
            .cloned())
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.phone == *phone)
            .cloned())
    }

    async fn is_phone_banned(&self, phone: &Phone) -> AuthResult<bool> {
        let listed = self
            .banned
            .lock()
            .unwrap()
            .iter()
            .any(|p| p == phone.as_str());
        let banned_user = self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.phone == *phone && u.user_status == UserStatus::Banned);
        Ok(listed || banned_user)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.users
            .lock()
            .unwrap()
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }
}

impl SessionStore for MemAuthRepo {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl.as_millis() as i64;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at_ms));
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> AuthResult<PutOutcome> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().unwrap();

        if let Some((_, exp)) = entries.get(key) {
            if *exp > now_ms {
                return Ok(PutOutcome::Exists {
                    remaining: Duration::from_millis((exp - now_ms) as u64),
                });
            }
        }

        let expires_at_ms = now_ms + ttl.as_millis() as i64;
        entries.insert(key.to_string(), (value.to_string(), expires_at_ms));
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let now_ms = Utc::now().timestamp_millis();
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, exp)| *exp > now_ms)
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> AuthResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, (_, exp)| *exp > now_ms);
        Ok((before - entries.len()) as u64)
    }
}

fn test_setup() -> (Arc<MemAuthRepo>, Arc<AuthConfig>) {
    (
        Arc::new(MemAuthRepo::default()),
        Arc::new(AuthConfig::development()),
    )
}

fn phone() -> Phone {
    Phone::new("09123456789").unwrap()
}

// ============================================================================
// OTP tests
// ============================================================================

mod otp_tests {
    use super::*;

    #[tokio::test]
    async fn second_request_within_ttl_conflicts_with_countdown() {
        let (repo, config) = test_setup();
        let otp = OtpService::new(repo.clone(), repo.clone(), config);

        otp.request(&phone()).await.unwrap();

        let err = otp.request(&phone()).await.unwrap_err();
        match err {
            AuthError::OtpAlreadySent { remaining_secs } => {
                assert!(remaining_secs > 0);
                assert!(remaining_secs <= 120);
            }
            other => panic!("expected OtpAlreadySent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn expired_code_allows_a_new_request() {
        let (repo, config) = test_setup();
        let otp = OtpService::new(repo.clone(), repo.clone(), config);

        otp.request(&phone()).await.unwrap();
        repo.backdate(&otp_key(phone().as_str()));

        assert!(otp.request(&phone()).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_code_is_not_consumed() {
        let (repo, config) = test_setup();
        let otp = OtpService::new(repo.clone(), repo.clone(), config);

        let code = otp.request(&phone()).await.unwrap();

        // A mismatch leaves the stored code untouched
        assert_eq!(
            otp.verify(&phone(), "000000").await.unwrap(),
            OtpVerdict::Mismatch
        );

        // The correct code still verifies within the TTL window
        assert_eq!(
            otp.verify(&phone(), code.as_str()).await.unwrap(),
            OtpVerdict::Matched
        );
    }

    #[tokio::test]
    async fn matched_code_is_consumed() {
        let (repo, config) = test_setup();
        let otp = OtpService::new(repo.clone(), repo.clone(), config);

        let code = otp.request(&phone()).await.unwrap();
        assert_eq!(
            otp.verify(&phone(), code.as_str()).await.unwrap(),
            OtpVerdict::Matched
        );

        // Consumed: a replay of the same code reports expired
        assert_eq!(
            otp.verify(&phone(), code.as_str()).await.unwrap(),
            OtpVerdict::Expired
        );

        // And a fresh request is allowed immediately after consumption
        assert!(otp.request(&phone()).await.is_ok());
    }

    #[tokio::test]
    async fn never_requested_reports_expired() {
        let (repo, config) = test_setup();
        let otp = OtpService::new(repo.clone(), repo.clone(), config);

        assert_eq!(
            otp.verify(&phone(), "123456").await.unwrap(),
            OtpVerdict::Expired
        );
    }

    #[tokio::test]
    async fn banned_phone_cannot_request() {
        let (repo, config) = test_setup();
        repo.ban(phone().as_str());

        let otp = OtpService::new(repo.clone(), repo.clone(), config);
        assert!(matches!(
            otp.request(&phone()).await.unwrap_err(),
            AuthError::PhoneBanned
        ));
    }
}

// ============================================================================
// Credential tests
// ============================================================================

mod credential_tests {
    use super::*;

    #[tokio::test]
    async fn issue_verify_roundtrip() {
        let (repo, config) = test_setup();
        let service = CredentialService::new(repo.clone(), config);

        let subject = UserId::new();
        let credentials = service.issue(&subject);

        let payload = service.verify(&credentials.session_token).unwrap();
        assert_eq!(payload.sub, *subject.as_uuid());
        assert_eq!(payload.exp, credentials.expires_at_ms);
        assert!(!payload.is_expired());
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let (repo, config) = test_setup();
        let service = CredentialService::new(repo.clone(), config);

        let credentials = service.issue(&UserId::new());
        let token = &credentials.session_token;

        // Flip one character of the payload segment
        let mut tampered: Vec<char> = token.chars().collect();
        tampered[0] = if tampered[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = tampered.into_iter().collect();

        assert!(matches!(
            service.verify(&tampered).unwrap_err(),
            AuthError::SessionInvalid
        ));

        // Garbage never panics, it fails closed
        assert!(service.verify("not-a-token").is_err());
        assert!(service.verify("").is_err());
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let (repo, _) = test_setup();
        let issuing = CredentialService::new(repo.clone(), Arc::new(AuthConfig::development()));
        let verifying = CredentialService::new(repo.clone(), Arc::new(AuthConfig::development()));

        let credentials = issuing.issue(&UserId::new());
        assert!(verifying.verify(&credentials.session_token).is_err());
    }

    #[tokio::test]
    async fn check_active_requires_persisted_entry() {
        let (repo, config) = test_setup();
        let service = CredentialService::new(repo.clone(), config);

        let subject = UserId::new();
        let credentials = service.issue(&subject);

        // Not persisted yet
        assert!(
            !service
                .check_active(&subject, &credentials.auth_key, &credentials.session_token)
                .await
                .unwrap()
        );

        service.persist(&credentials, &subject).await.unwrap();
        assert!(
            service
                .check_active(&subject, &credentials.auth_key, &credentials.session_token)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn revoke_all_invalidates_every_login() {
        let (repo, config) = test_setup();
        let service = CredentialService::new(repo.clone(), config);

        let subject = UserId::new();
        let first = service.issue(&subject);
        let second = service.issue(&subject);
        service.persist(&first, &subject).await.unwrap();
        service.persist(&second, &subject).await.unwrap();

        let revoked = service.revoke_all(&subject).await.unwrap();
        assert_eq!(revoked, 2);

        // Tokens are still unexpired and well-signed, yet no longer active
        assert!(service.verify(&first.session_token).is_ok());
        assert!(
            !service
                .check_active(&subject, &first.auth_key, &first.session_token)
                .await
                .unwrap()
        );
        assert!(
            !service
                .check_active(&subject, &second.auth_key, &second.session_token)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn revoke_one_leaves_other_logins_alive() {
        let (repo, config) = test_setup();
        let service = CredentialService::new(repo.clone(), config);

        let subject = UserId::new();
        let first = service.issue(&subject);
        let second = service.issue(&subject);
        service.persist(&first, &subject).await.unwrap();
        service.persist(&second, &subject).await.unwrap();

        service.revoke_one(&subject, &first.auth_key).await.unwrap();

        assert!(
            !service
                .check_active(&subject, &first.auth_key, &first.session_token)
                .await
                .unwrap()
        );
        assert!(
            service
                .check_active(&subject, &second.auth_key, &second.session_token)
                .await
                .unwrap()
        );
    }
}

// ============================================================================
// Sign-in flow tests
// ============================================================================

mod sign_in_tests {
    use super::*;

    async fn request_and_take_code(repo: &Arc<MemAuthRepo>, config: &Arc<AuthConfig>) -> String {
        let otp = OtpService::new(repo.clone(), repo.clone(), config.clone());
        otp.request(&phone()).await.unwrap().as_str().to_string()
    }

    #[tokio::test]
    async fn first_otp_sign_in_creates_the_account() {
        let (repo, config) = test_setup();
        let code = request_and_take_code(&repo, &config).await;

        let use_case = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());
        let output = use_case
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        assert!(output.created);
        assert_eq!(repo.users.lock().unwrap().len(), 1);
        assert_eq!(repo.live_entry_count(), 1); // persisted session

        // Second sign-in reuses the account
        let code = request_and_take_code(&repo, &config).await;
        let output = use_case
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();
        assert!(!output.created);
        assert_eq!(repo.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wrong_or_missing_code_fails() {
        let (repo, config) = test_setup();
        let use_case = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());

        // No code outstanding
        let err = use_case
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code: "123456".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OtpExpired));

        // Outstanding but mismatched; no account is created
        request_and_take_code(&repo, &config).await;
        let err = use_case
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code: "000000".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OtpMismatch));
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_gate_resolves_and_respects_revocation() {
        let (repo, config) = test_setup();
        let code = request_and_take_code(&repo, &config).await;

        let sign_in = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());
        let output = sign_in
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        let check = CheckSessionUseCase::new(repo.clone(), repo.clone(), config.clone());
        let (user, payload) = check
            .resolve(
                &output.credentials.session_token,
                &output.credentials.auth_key,
            )
            .await
            .unwrap();
        assert_eq!(user.phone, phone());
        assert_eq!(payload.exp, output.credentials.expires_at_ms);

        // Server-side revocation defeats the still-valid token
        let sign_out = SignOutUseCase::new(repo.clone(), config.clone());
        sign_out.execute_all(&user.user_id).await.unwrap();

        let err = check
            .resolve(
                &output.credentials.session_token,
                &output.credentials.auth_key,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn password_sign_in_requires_a_set_password() {
        let (repo, config) = test_setup();

        // Provision an account through the OTP path
        let code = request_and_take_code(&repo, &config).await;
        let sign_in = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());
        sign_in
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        // No password set yet
        let err = sign_in
            .execute_password(PasswordSignInInput {
                phone: phone(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        // Set a password directly on the entity
        let mut user = repo.find_by_phone(&phone()).await.unwrap().unwrap();
        let cleartext =
            platform::password::ClearTextPassword::new("correct horse battery".to_string())
                .unwrap();
        user.set_password_hash(
            platform::password::hash_password(&cleartext, config.pepper()).unwrap(),
        );
        repo.update(&user).await.unwrap();

        // Wrong password rejected, right password accepted
        assert!(matches!(
            sign_in
                .execute_password(PasswordSignInInput {
                    phone: phone(),
                    password: "incorrect horse".to_string(),
                })
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        ));
        assert!(
            sign_in
                .execute_password(PasswordSignInInput {
                    phone: phone(),
                    password: "correct horse battery".to_string(),
                })
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn password_change_revokes_other_sessions_only() {
        let (repo, config) = test_setup();

        // Two concurrent logins
        let code = request_and_take_code(&repo, &config).await;
        let sign_in = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());
        let first = sign_in
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        let code = request_and_take_code(&repo, &config).await;
        let second = sign_in
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        // The second device changes the password
        let user = repo.find_by_phone(&phone()).await.unwrap().unwrap();
        let use_case = SetPasswordUseCase::new(repo.clone(), repo.clone(), config.clone());
        use_case
            .execute(
                user,
                "correct horse battery".to_string(),
                &second.credentials,
            )
            .await
            .unwrap();

        let service = CredentialService::new(repo.clone(), config.clone());
        let user = repo.find_by_phone(&phone()).await.unwrap().unwrap();

        // The first device is signed out, the changing one stays in
        assert!(
            !service
                .check_active(
                    &user.user_id,
                    &first.credentials.auth_key,
                    &first.credentials.session_token
                )
                .await
                .unwrap()
        );
        assert!(
            service
                .check_active(
                    &user.user_id,
                    &second.credentials.auth_key,
                    &second.credentials.session_token
                )
                .await
                .unwrap()
        );

        // And the new password signs in
        assert!(
            sign_in
                .execute_password(PasswordSignInInput {
                    phone: phone(),
                    password: "correct horse battery".to_string(),
                })
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn banned_account_cannot_sign_in() {
        let (repo, config) = test_setup();

        let code = request_and_take_code(&repo, &config).await;
        let sign_in = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());
        sign_in
            .execute_otp(OtpSignInInput {
                phone: phone(),
                code,
            })
            .await
            .unwrap();

        let mut user = repo.find_by_phone(&phone()).await.unwrap().unwrap();
        user.set_status(UserStatus::Banned);
        repo.update(&user).await.unwrap();

        // Banned accounts cannot even request a new code
        let otp = OtpService::new(repo.clone(), repo.clone(), config.clone());
        assert!(matches!(
            otp.request(&phone()).await.unwrap_err(),
            AuthError::PhoneBanned
        ));
    }
}
