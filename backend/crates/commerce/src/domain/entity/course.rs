//! Course Entity
//!
//! The purchasable unit. Only the commerce-relevant slice of a course
//! lives here; the content side (chapters, media, comments) belongs to
//! the content repository.

use chrono::{DateTime, Utc};
use kernel::id::CourseId;

/// Course entity (commerce view)
#[derive(Debug, Clone)]
pub struct Course {
    /// Internal UUID identifier
    pub course_id: CourseId,
    /// Human-facing short identifier
    pub short_id: i64,
    /// Title, used in payment descriptions
    pub title: String,
    /// List price in the integer currency unit
    pub price: i64,
    /// Per-item discount percent (0-100)
    pub discount_percent: i16,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// A course is effectively free when its price is zero or its own
    /// discount reaches 100%; claiming it bypasses the cart entirely.
    pub fn is_free(&self) -> bool {
        self.price == 0 || self.discount_percent >= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(price: i64, discount_percent: i16) -> Course {
        Course {
            course_id: CourseId::new(),
            short_id: 1,
            title: "Rust from scratch".to_string(),
            price,
            discount_percent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_free() {
        assert!(course(0, 0).is_free());
        assert!(course(1000, 100).is_free());
        assert!(!course(1000, 99).is_free());
        assert!(!course(1, 0).is_free());
    }
}
