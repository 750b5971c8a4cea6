//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod credentials;
pub mod otp;
pub mod password;
pub mod sign_in;
pub mod sign_out;

pub use check_session::CheckSessionUseCase;
pub use credentials::CredentialService;
pub use otp::{OtpService, OtpVerdict};
pub use password::SetPasswordUseCase;
pub use sign_in::{OtpSignInInput, PasswordSignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
