//! # Shieldline Core
//!
//! Domain types, service traits, and error definitions for the Shieldline
//! guarded messages client. This crate has no transport dependencies; it
//! defines the model the other crates implement against.
//!
//! Both collaborators of the guarded client are traits here:
//! - [`GuardService`] checks text and may block or transform it
//! - [`CompletionService`] turns a request into a [`Message`]
//!
//! Implementations live in `shieldline-guard` and `shieldline-providers`.

pub mod completion;
pub mod error;
pub mod guard;
pub mod message;

// Re-export key types at crate root for ergonomics
pub use completion::CompletionService;
pub use error::{BlockedContentError, Error, GuardServiceError, ProviderError, Result};
pub use guard::{GuardContext, GuardResult, GuardService, GuardStage};
pub use message::{
    ContentBlock, InputContent, InputMessage, Message, MessageRequest, Role, StopReason, Usage,
};
