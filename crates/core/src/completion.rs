//! CompletionService trait — the abstraction over a Messages API backend.
//!
//! A completion service takes a [`MessageRequest`] and returns the generated
//! [`Message`]. Transport, authentication and retries are its own business.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::{Message, MessageRequest};

/// The core CompletionService trait.
///
/// The guarded client calls `create_message()` without knowing which backend
/// is behind it.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// A human-readable name for this backend (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get the complete response.
    async fn create_message(
        &self,
        request: MessageRequest,
    ) -> std::result::Result<Message, ProviderError>;
}
