//! Domain Layer
//!
//! Contains entities, pricing rules, and repository/gateway traits.

pub mod entity;
pub mod gateway;
pub mod repository;
pub mod services;

// Re-exports
pub use entity::{cart::Cart, course::Course, discount::Discount, order::Order};
pub use gateway::PaymentGateway;
pub use repository::{
    CartRepository, CounterKind, CourseAccessRepository, CourseRepository, DiscountRepository,
    OrderRepository, ShortIdAllocator,
};
