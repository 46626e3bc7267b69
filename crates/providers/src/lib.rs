//! Completion service implementations for Shieldline.
//!
//! All backends implement the `shieldline_core::CompletionService` trait.

pub mod anthropic;

pub use anthropic::AnthropicClient;
