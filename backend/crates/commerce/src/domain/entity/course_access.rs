//! Course Access Grant
//!
//! The record proving a user may consume a course. The (user, course)
//! pair is unique; a duplicate grant from any path is a benign no-op.

use auth::domain::value_object::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::CourseId;

/// How a grant came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum GrantSource {
    /// Verified order
    Order = 0,
    /// Direct administrative grant
    Admin = 1,
    /// Free-course claim (price 0 or 100%-discounted)
    Free = 2,
}

impl GrantSource {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => GrantSource::Order,
            1 => GrantSource::Admin,
            2 => GrantSource::Free,
            _ => {
                tracing::error!("Invalid GrantSource id: {}", id);
                unreachable!("Invalid GrantSource id: {}", id)
            }
        }
    }
}

/// Course access grant
#[derive(Debug, Clone)]
pub struct CourseAccess {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub source: GrantSource,
    pub granted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ids_roundtrip() {
        for source in [GrantSource::Order, GrantSource::Admin, GrantSource::Free] {
            assert_eq!(GrantSource::from_id(source.id()), source);
        }
    }
}
