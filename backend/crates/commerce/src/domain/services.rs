//! Pricing Rules
//!
//! Pure functions over cart snapshots; no I/O, no side effects.
//! All arithmetic is on the integer currency unit; percentages floor
//! toward zero, so a payable amount can never go negative.

use crate::domain::entity::{course::Course, discount::Discount};

/// Priced cart snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartPricing {
    /// Sum of list prices
    pub total_price: i64,
    /// Sum of per-item discounts
    pub discount: i64,
    /// `total_price - discount`
    pub payable_amount: i64,
}

/// Per-item discount: `price * percent / 100`, floored
pub fn item_discount(price: i64, percent: i16) -> i64 {
    price * i64::from(percent.clamp(0, 100)) / 100
}

/// What one course line costs after its own discount
pub fn line_payable(course: &Course) -> i64 {
    course.price - item_discount(course.price, course.discount_percent)
}

/// Price a cart snapshot
pub fn price_courses(courses: &[Course]) -> CartPricing {
    let total_price: i64 = courses.iter().map(|c| c.price).sum();
    let discount: i64 = courses
        .iter()
        .map(|c| item_discount(c.price, c.discount_percent))
        .sum();

    CartPricing {
        total_price,
        discount,
        payable_amount: total_price - discount,
    }
}

/// Amount a discount code takes off an already-priced cart
///
/// An unscoped code discounts the whole payable amount; a scoped code
/// discounts only its course's line. `None` means the scoped course is
/// not in the cart and the code does not apply.
pub fn code_discount_amount(
    courses: &[Course],
    pricing: &CartPricing,
    discount: &Discount,
) -> Option<i64> {
    match discount.course_id {
        None => Some(item_discount(pricing.payable_amount, discount.percent)),
        Some(scope) => courses
            .iter()
            .find(|c| c.course_id == scope)
            .map(|course| item_discount(line_payable(course), discount.percent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kernel::id::{CourseId, DiscountId};

    fn course(price: i64, discount_percent: i16) -> Course {
        Course {
            course_id: CourseId::new(),
            short_id: 1,
            title: "test".to_string(),
            price,
            discount_percent,
            created_at: Utc::now(),
        }
    }

    fn code(percent: i16, course_id: Option<CourseId>) -> Discount {
        Discount {
            discount_id: DiscountId::new(),
            code: "SAVE".to_string(),
            percent,
            course_id,
            max_uses: 5,
            uses: 0,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_discount() {
        assert_eq!(item_discount(1000, 10), 100);
        assert_eq!(item_discount(1000, 0), 0);
        assert_eq!(item_discount(1000, 100), 1000);
        // Out-of-range percentages are clamped, not amplified
        assert_eq!(item_discount(1000, 120), 1000);
        assert_eq!(item_discount(1000, -5), 0);
        // Integer flooring
        assert_eq!(item_discount(999, 10), 99);
    }

    #[test]
    fn test_price_courses_identity() {
        let courses = vec![course(1000, 10), course(500, 0), course(200, 50)];
        let pricing = price_courses(&courses);

        assert_eq!(pricing.total_price, 1700);
        assert_eq!(pricing.discount, 200);
        assert_eq!(pricing.payable_amount, pricing.total_price - pricing.discount);
        assert!(pricing.payable_amount >= 0);
    }

    #[test]
    fn test_price_courses_empty() {
        let pricing = price_courses(&[]);
        assert_eq!(pricing.total_price, 0);
        assert_eq!(pricing.payable_amount, 0);
    }

    #[test]
    fn test_payable_never_negative() {
        // 100% item discounts drive the payable to exactly zero
        let courses = vec![course(1000, 100), course(1, 100)];
        let pricing = price_courses(&courses);
        assert_eq!(pricing.payable_amount, 0);
    }

    #[test]
    fn test_unscoped_code_discounts_whole_cart() {
        let courses = vec![course(1000, 10)];
        let pricing = price_courses(&courses);
        assert_eq!(pricing.payable_amount, 900);

        // The documented scenario: (1000 - 100) * 0.9 = 810
        let amount = code_discount_amount(&courses, &pricing, &code(10, None)).unwrap();
        assert_eq!(pricing.payable_amount - amount, 810);
    }

    #[test]
    fn test_scoped_code_discounts_one_line() {
        let target = course(1000, 0);
        let scope = target.course_id;
        let courses = vec![target, course(500, 0)];
        let pricing = price_courses(&courses);

        let amount = code_discount_amount(&courses, &pricing, &code(10, Some(scope))).unwrap();
        assert_eq!(amount, 100); // 10% of the 1000 line only
    }

    #[test]
    fn test_scoped_code_misses_cart() {
        let courses = vec![course(500, 0)];
        let pricing = price_courses(&courses);

        let absent = CourseId::new();
        assert!(code_discount_amount(&courses, &pricing, &code(10, Some(absent))).is_none());
    }
}
