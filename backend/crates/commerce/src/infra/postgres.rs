//! PostgreSQL Repository Implementations
//!
//! All increment-style mutations (discount redemption, short-id
//! allocation) are single statements with store-enforced conditions;
//! there is deliberately no read-modify-write pair anywhere in this
//! file.

use auth::domain::value_object::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{CartId, CourseId, DiscountId, OrderId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::cart::Cart;
use crate::domain::entity::course::Course;
use crate::domain::entity::course_access::GrantSource;
use crate::domain::entity::discount::Discount;
use crate::domain::entity::order::{Order, OrderStatus};
use crate::domain::repository::{
    CartRepository, CounterKind, CourseAccessRepository, CourseRepository, DiscountRepository,
    OrderRepository, RedeemOutcome, ShortIdAllocator,
};
use crate::error::CommerceResult;

/// PostgreSQL-backed commerce repository
#[derive(Clone)]
pub struct PgCommerceRepository {
    pool: PgPool,
}

impl PgCommerceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Course Repository Implementation
// ============================================================================

impl CourseRepository for PgCommerceRepository {
    async fn find_course(&self, course_id: &CourseId) -> CommerceResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT course_id, short_id, title, price, discount_percent, created_at
            FROM courses
            WHERE course_id = $1
            "#,
        )
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CourseRow::into_course))
    }

    async fn find_courses(&self, course_ids: &[CourseId]) -> CommerceResult<Vec<Course>> {
        let ids: Vec<Uuid> = course_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT course_id, short_id, title, price, discount_percent, created_at
            FROM courses
            WHERE course_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseRow::into_course).collect())
    }
}

// ============================================================================
// Cart Repository Implementation
// ============================================================================

impl CartRepository for PgCommerceRepository {
    async fn find_cart(&self, user_id: &UserId) -> CommerceResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT cart_id, user_id, items, updated_at
            FROM carts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CartRow::into_cart))
    }

    async fn update_cart_items(&self, cart_id: &CartId, items: &[CourseId]) -> CommerceResult<()> {
        let ids: Vec<Uuid> = items.iter().map(|id| *id.as_uuid()).collect();

        sqlx::query("UPDATE carts SET items = $2, updated_at = $3 WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .bind(&ids)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear_cart(&self, user_id: &UserId) -> CommerceResult<()> {
        sqlx::query("UPDATE carts SET items = '{}', updated_at = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Discount Repository Implementation
// ============================================================================

impl DiscountRepository for PgCommerceRepository {
    async fn redeem(&self, code: &str) -> CommerceResult<RedeemOutcome> {
        let now = Utc::now();

        // Increment-if-under-cap: the predicate and the increment are one
        // statement, so concurrent redemptions near the cap cannot race
        // past it.
        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            UPDATE discounts
            SET uses = uses + 1
            WHERE code = $1
              AND uses < max_uses
              AND (expires_at IS NULL OR expires_at > $2)
            RETURNING discount_id, code, percent, course_id, max_uses, uses, expires_at, created_at
            "#,
        )
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(RedeemOutcome::Redeemed(row.into_discount()));
        }

        // Classify the rejection without consuming anything
        match self.find_discount(code).await? {
            None => Ok(RedeemOutcome::NotFound),
            Some(discount) if discount.is_expired() => Ok(RedeemOutcome::Expired),
            Some(_) => Ok(RedeemOutcome::Exhausted),
        }
    }

    async fn release(&self, code: &str) -> CommerceResult<()> {
        sqlx::query("UPDATE discounts SET uses = GREATEST(uses - 1, 0) WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_discount(&self, code: &str) -> CommerceResult<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>(
            r#"
            SELECT discount_id, code, percent, course_id, max_uses, uses, expires_at, created_at
            FROM discounts
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DiscountRow::into_discount))
    }

    async fn delete_expired_discounts(&self) -> CommerceResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM discounts WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted > 0 {
            tracing::info!(discounts_deleted = deleted, "Cleaned up expired discounts");
        }

        Ok(deleted)
    }
}

// ============================================================================
// Order Repository Implementation
// ============================================================================

impl OrderRepository for PgCommerceRepository {
    async fn create_order(&self, order: &Order) -> CommerceResult<()> {
        let items: Vec<Uuid> = order.items.iter().map(|id| *id.as_uuid()).collect();

        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id,
                short_id,
                user_id,
                items,
                amount,
                status,
                authority,
                discount_code,
                created_at,
                paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.order_id.as_uuid())
        .bind(order.short_id)
        .bind(order.user_id.as_uuid())
        .bind(&items)
        .bind(order.amount)
        .bind(order.status.id())
        .bind(&order.authority)
        .bind(order.discount_code.as_deref())
        .bind(order.created_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_paying_by_authority(&self, authority: &str) -> CommerceResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT order_id, short_id, user_id, items, amount, status, authority,
                   discount_code, created_at, paid_at
            FROM orders
            WHERE authority = $1 AND status = $2
            "#,
        )
        .bind(authority)
        .bind(OrderStatus::Paying.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderRow::into_order))
    }

    async fn find_by_short_id(&self, short_id: i64) -> CommerceResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT order_id, short_id, user_id, items, amount, status, authority,
                   discount_code, created_at, paid_at
            FROM orders
            WHERE short_id = $1
            "#,
        )
        .bind(short_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderRow::into_order))
    }

    async fn mark_successful(&self, order_id: &OrderId) -> CommerceResult<()> {
        // Guarded by the PAYING predicate: a replayed flip is a no-op
        sqlx::query(
            "UPDATE orders SET status = $2, paid_at = $3 WHERE order_id = $1 AND status = $4",
        )
        .bind(order_id.as_uuid())
        .bind(OrderStatus::Successful.id())
        .bind(Utc::now())
        .bind(OrderStatus::Paying.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fail_stale_orders(&self, cutoff: DateTime<Utc>) -> CommerceResult<u64> {
        let failed = sqlx::query(
            "UPDATE orders SET status = $1 WHERE status = $2 AND created_at < $3",
        )
        .bind(OrderStatus::Failed.id())
        .bind(OrderStatus::Paying.id())
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if failed > 0 {
            tracing::info!(orders_failed = failed, "Failed stale PAYING orders");
        }

        Ok(failed)
    }
}

// ============================================================================
// Course Access Repository Implementation
// ============================================================================

impl CourseAccessRepository for PgCommerceRepository {
    async fn grant_courses(
        &self,
        user_id: &UserId,
        course_ids: &[CourseId],
        source: GrantSource,
    ) -> CommerceResult<u64> {
        let ids: Vec<Uuid> = course_ids.iter().map(|id| *id.as_uuid()).collect();

        // Duplicate (user, course) pairs are benign no-ops per row
        let granted = sqlx::query(
            r#"
            INSERT INTO course_access (user_id, course_id, source, granted_at)
            SELECT $1, unnest($2::uuid[]), $3, $4
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&ids)
        .bind(source.id())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(granted)
    }

    async fn has_access(&self, user_id: &UserId, course_id: &CourseId) -> CommerceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM course_access WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Short-ID Allocator Implementation
// ============================================================================

impl ShortIdAllocator for PgCommerceRepository {
    async fn allocate(&self, kind: CounterKind) -> CommerceResult<i64> {
        // Upsert-increment returning the new value; the statement is the
        // serialization point, there is no read-then-write window.
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO counters (counter_kind, counter_value)
            VALUES ($1, 1)
            ON CONFLICT (counter_kind) DO UPDATE
                SET counter_value = counters.counter_value + 1
            RETURNING counter_value
            "#,
        )
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn rollback(&self, kind: CounterKind) -> CommerceResult<()> {
        sqlx::query(
            "UPDATE counters SET counter_value = GREATEST(counter_value - 1, 0) WHERE counter_kind = $1",
        )
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CourseRow {
    course_id: Uuid,
    short_id: i64,
    title: String,
    price: i64,
    discount_percent: i16,
    created_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self) -> Course {
        Course {
            course_id: CourseId::from_uuid(self.course_id),
            short_id: self.short_id,
            title: self.title,
            price: self.price,
            discount_percent: self.discount_percent,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    cart_id: Uuid,
    user_id: Uuid,
    items: Vec<Uuid>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self) -> Cart {
        Cart {
            cart_id: CartId::from_uuid(self.cart_id),
            user_id: UserId::from_uuid(self.user_id),
            items: self.items.into_iter().map(CourseId::from_uuid).collect(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DiscountRow {
    discount_id: Uuid,
    code: String,
    percent: i16,
    course_id: Option<Uuid>,
    max_uses: i32,
    uses: i32,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl DiscountRow {
    fn into_discount(self) -> Discount {
        Discount {
            discount_id: DiscountId::from_uuid(self.discount_id),
            code: self.code,
            percent: self.percent,
            course_id: self.course_id.map(CourseId::from_uuid),
            max_uses: self.max_uses,
            uses: self.uses,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    short_id: i64,
    user_id: Uuid,
    items: Vec<Uuid>,
    amount: i64,
    status: i16,
    authority: String,
    discount_code: Option<String>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self) -> Order {
        Order {
            order_id: OrderId::from_uuid(self.order_id),
            short_id: self.short_id,
            user_id: UserId::from_uuid(self.user_id),
            items: self.items.into_iter().map(CourseId::from_uuid).collect(),
            amount: self.amount,
            status: OrderStatus::from_id(self.status),
            authority: self.authority,
            discount_code: self.discount_code,
            created_at: self.created_at,
            paid_at: self.paid_at,
        }
    }
}
