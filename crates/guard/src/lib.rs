//! Guard service implementations for Shieldline.
//!
//! All guards implement the `shieldline_core::GuardService` trait.

pub mod ai_guard;

pub use ai_guard::AiGuardClient;
