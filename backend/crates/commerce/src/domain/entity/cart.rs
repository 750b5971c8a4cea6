//! Cart Entity
//!
//! One cart per user, created together with the user. Items are a set
//! of course references; duplicates are rejected before insert.

use auth::domain::value_object::user_id::UserId;
use chrono::{DateTime, Utc};
use kernel::id::{CartId, CourseId};

/// Cart entity
#[derive(Debug, Clone)]
pub struct Cart {
    /// Internal UUID identifier
    pub cart_id: CartId,
    /// Owning user
    pub user_id: UserId,
    /// Course references, no duplicates
    pub items: Vec<CourseId>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn contains(&self, course_id: &CourseId) -> bool {
        self.items.contains(course_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a course; returns false if it was already present
    pub fn add(&mut self, course_id: CourseId) -> bool {
        if self.contains(&course_id) {
            return false;
        }
        self.items.push(course_id);
        self.updated_at = Utc::now();
        true
    }

    /// Remove a course; absent items are silently ignored
    pub fn remove(&mut self, course_id: &CourseId) {
        self.items.retain(|item| item != course_id);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart {
            cart_id: CartId::new(),
            user_id: UserId::new(),
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut cart = cart();
        let course = CourseId::new();

        assert!(cart.add(course));
        assert!(!cart.add(course));
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = cart();
        let course = CourseId::new();
        cart.add(course);

        cart.remove(&course);
        assert!(cart.is_empty());

        // Removing an absent item is not an error
        cart.remove(&course);
        assert!(cart.is_empty());
    }
}
