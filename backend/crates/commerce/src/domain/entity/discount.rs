//! Discount Entity
//!
//! A redeemable percentage code with a usage cap. The `uses <= max_uses`
//! invariant is enforced by the store at redemption time (conditional
//! increment), never by a read-then-check in application code.

use chrono::{DateTime, Utc};
use kernel::id::{CourseId, DiscountId};

/// Discount entity
#[derive(Debug, Clone)]
pub struct Discount {
    /// Internal UUID identifier
    pub discount_id: DiscountId,
    /// Unique redemption code
    pub code: String,
    /// Percent off (0-100)
    pub percent: i16,
    /// Optional scope: only this course's line is discounted
    pub course_id: Option<CourseId>,
    /// Usage cap
    pub max_uses: i32,
    /// Times redeemed so far
    pub uses: i32,
    /// Expiry; cleanup is best-effort, the cap check is authoritative
    pub expires_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Discount {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn discount(expires_at: Option<DateTime<Utc>>) -> Discount {
        Discount {
            discount_id: DiscountId::new(),
            code: "SAVE10".to_string(),
            percent: 10,
            course_id: None,
            max_uses: 5,
            uses: 0,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_expired() {
        assert!(!discount(None).is_expired());
        assert!(!discount(Some(Utc::now() + Duration::hours(1))).is_expired());
        assert!(discount(Some(Utc::now() - Duration::hours(1))).is_expired());
    }
}
