//! PostgreSQL Repository Implementations
//!
//! `PgAuthRepository` backs both the user repository and the
//! session/OTP key-value store. The store lives in the `cache_entries`
//! table; expiry is enforced at read time (`expires_at_ms` predicate)
//! and expired rows are physically removed by the housekeeping job.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{PutOutcome, SessionStore, UserRepository};
use crate::domain::value_object::{
    phone::Phone, public_id::PublicId, user_id::UserId, user_role::UserRole,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository and session store
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        // A user's cart is created together with the user: a missing cart
        // later in the checkout path is an operator-attention error state.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                phone,
                user_name,
                user_role,
                user_status,
                password_hash,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(user.phone.as_str())
        .bind(&user.user_name)
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.password_hash.as_deref())
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO carts (cart_id, user_id, items, updated_at)
            VALUES ($1, $2, '{}', $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id.as_uuid())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(public_id = %user.public_id, "User and cart created");
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                public_id,
                phone,
                user_name,
                user_role,
                user_status,
                password_hash,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                public_id,
                phone,
                user_name,
                user_role,
                user_status,
                password_hash,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE public_id = $1
            "#,
        )
        .bind(public_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                public_id,
                phone,
                user_name,
                user_role,
                user_status,
                password_hash,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn is_phone_banned(&self, phone: &Phone) -> AuthResult<bool> {
        // Ban list covers both standalone entries and banned accounts
        let banned = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM banned_phones WHERE phone = $1)
                OR EXISTS(SELECT 1 FROM users WHERE phone = $1 AND user_status = $2)
            "#,
        )
        .bind(phone.as_str())
        .bind(UserStatus::Banned.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(banned)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                user_role = $3,
                user_status = $4,
                password_hash = $5,
                last_login_at = $6,
                updated_at = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.user_name)
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.password_hash.as_deref())
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

impl SessionStore for PgAuthRepository {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let expires_at_ms = Utc::now().timestamp_millis() + ttl.as_millis() as i64;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (cache_key, cache_value, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (cache_key) DO UPDATE
                SET cache_value = EXCLUDED.cache_value,
                    expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> AuthResult<PutOutcome> {
        let now_ms = Utc::now().timestamp_millis();
        let expires_at_ms = now_ms + ttl.as_millis() as i64;

        // One round-trip: the insert wins outright, or replaces an
        // expired entry; a live entry leaves rows_affected at 0.
        let inserted = sqlx::query(
            r#"
            INSERT INTO cache_entries (cache_key, cache_value, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (cache_key) DO UPDATE
                SET cache_value = EXCLUDED.cache_value,
                    expires_at_ms = EXCLUDED.expires_at_ms
                WHERE cache_entries.expires_at_ms <= $4
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at_ms)
        .bind(now_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            return Ok(PutOutcome::Stored);
        }

        let live_expiry = sqlx::query_scalar::<_, i64>(
            "SELECT expires_at_ms FROM cache_entries WHERE cache_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match live_expiry {
            Some(exp) if exp > now_ms => Ok(PutOutcome::Exists {
                remaining: Duration::from_millis((exp - now_ms) as u64),
            }),
            // The blocking entry vanished between the two statements
            _ => {
                self.put(key, value, ttl).await?;
                Ok(PutOutcome::Stored)
            }
        }
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT cache_value FROM cache_entries WHERE cache_key = $1 AND expires_at_ms > $2",
        )
        .bind(key)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM cache_entries WHERE cache_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM cache_entries WHERE cache_key LIKE $1 || '%'")
            .bind(prefix)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM cache_entries WHERE expires_at_ms <= $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            tracing::info!(entries_deleted = deleted, "Cleaned up expired cache entries");
        }

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    phone: String,
    user_name: String,
    user_role: i16,
    user_status: i16,
    password_hash: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Corrupt public_id: {}", e)))?;
        let phone = Phone::new(&self.phone)
            .map_err(|_| AuthError::Internal("Corrupt phone number".to_string()))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            phone,
            user_name: self.user_name,
            user_role: UserRole::from_id(self.user_role),
            user_status: UserStatus::from_id(self.user_status),
            password_hash: self.password_hash,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
