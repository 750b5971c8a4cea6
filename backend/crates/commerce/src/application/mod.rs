//! Application Layer
//!
//! Use cases for cart management, checkout, payment verification,
//! order inspection and administrative grants.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod grant;
pub mod orders;
pub mod verify;

pub use cart::{AddCartItemOutcome, AddCartItemUseCase, RemoveCartItemUseCase};
pub use checkout::{CheckoutInput, CheckoutOutput, CheckoutUseCase};
pub use grant::GrantCourseUseCase;
pub use orders::GetOrderUseCase;
pub use verify::{VerifyOutcome, VerifyPaymentUseCase};
