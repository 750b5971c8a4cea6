//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//!
//! The discount redemption and counter operations are specified as
//! single atomic store operations; implementations must not expand them
//! into read-then-write pairs, or concurrent checkouts lose updates.

use auth::domain::value_object::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{CartId, CourseId, OrderId};

use crate::domain::entity::{
    cart::Cart, course::Course, course_access::GrantSource, discount::Discount, order::Order,
};
use crate::error::CommerceResult;

/// Course repository trait (commerce view of the content repository)
#[trait_variant::make(CourseRepository: Send)]
pub trait LocalCourseRepository {
    /// Find course by ID
    async fn find_course(&self, course_id: &CourseId) -> CommerceResult<Option<Course>>;

    /// Find many courses by ID, in no particular order
    async fn find_courses(&self, course_ids: &[CourseId]) -> CommerceResult<Vec<Course>>;
}

/// Cart repository trait
#[trait_variant::make(CartRepository: Send)]
pub trait LocalCartRepository {
    /// Find a user's cart
    async fn find_cart(&self, user_id: &UserId) -> CommerceResult<Option<Cart>>;

    /// Persist a cart's item list
    async fn update_cart_items(&self, cart_id: &CartId, items: &[CourseId]) -> CommerceResult<()>;

    /// Empty a user's cart; an already-empty cart is a no-op
    async fn clear_cart(&self, user_id: &UserId) -> CommerceResult<()>;
}

/// Outcome of a discount redemption attempt
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    /// Slot reserved; carries the discount as of the increment
    Redeemed(Discount),
    /// No such code
    NotFound,
    /// `uses` reached `max_uses`; nothing was consumed
    Exhausted,
    /// Past `expires_at`; nothing was consumed
    Expired,
}

/// Discount repository trait
#[trait_variant::make(DiscountRepository: Send)]
pub trait LocalDiscountRepository {
    /// Atomically redeem one use of `code`
    ///
    /// Increment-if-under-cap in a single store operation: a rejected
    /// attempt (cap reached, expired, unknown code) consumes nothing.
    async fn redeem(&self, code: &str) -> CommerceResult<RedeemOutcome>;

    /// Return a redemption slot consumed by a checkout that later failed
    async fn release(&self, code: &str) -> CommerceResult<()>;

    /// Find a discount by code without consuming anything
    async fn find_discount(&self, code: &str) -> CommerceResult<Option<Discount>>;

    /// Best-effort cleanup of expired discounts, returning the count
    async fn delete_expired_discounts(&self) -> CommerceResult<u64>;
}

/// Order repository trait
#[trait_variant::make(OrderRepository: Send)]
pub trait LocalOrderRepository {
    /// Persist a new order
    async fn create_order(&self, order: &Order) -> CommerceResult<()>;

    /// Find the PAYING order correlated with a gateway authority
    async fn find_paying_by_authority(&self, authority: &str) -> CommerceResult<Option<Order>>;

    /// Find order by its human-facing short id
    async fn find_by_short_id(&self, short_id: i64) -> CommerceResult<Option<Order>>;

    /// Flip a PAYING order to SUCCESSFUL; a replay is a no-op
    async fn mark_successful(&self, order_id: &OrderId) -> CommerceResult<()>;

    /// Fail PAYING orders created before `cutoff`, returning the count
    async fn fail_stale_orders(&self, cutoff: DateTime<Utc>) -> CommerceResult<u64>;
}

/// Course access repository trait
#[trait_variant::make(CourseAccessRepository: Send)]
pub trait LocalCourseAccessRepository {
    /// Grant access to every course in `course_ids`
    ///
    /// Idempotent: already-granted pairs are skipped, not errors.
    /// Returns the number of newly created grants.
    async fn grant_courses(
        &self,
        user_id: &UserId,
        course_ids: &[CourseId],
        source: GrantSource,
    ) -> CommerceResult<u64>;

    /// Check whether a user holds a grant for a course
    async fn has_access(&self, user_id: &UserId, course_id: &CourseId) -> CommerceResult<bool>;
}

/// Entity kinds with a human-facing short-id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Orders,
    Courses,
    Users,
    Sessions,
    Tickets,
    Blogs,
}

impl CounterKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Orders => "orders",
            CounterKind::Courses => "courses",
            CounterKind::Users => "users",
            CounterKind::Sessions => "sessions",
            CounterKind::Tickets => "tickets",
            CounterKind::Blogs => "blogs",
        }
    }
}

/// Monotonic short-id allocator, one sequence per entity kind
#[trait_variant::make(ShortIdAllocator: Send)]
pub trait LocalShortIdAllocator {
    /// Atomically increment the sequence and return the new value
    async fn allocate(&self, kind: CounterKind) -> CommerceResult<i64>;

    /// Roll back an allocation that was never persisted to an entity
    async fn rollback(&self, kind: CounterKind) -> CommerceResult<()>;
}
