//! # Shieldline
//!
//! A Messages API client that runs every prompt and every response through a
//! content-safety guard. Blocked content never reaches the model (input stage)
//! or the caller (output stage); redacted content replaces the original.
//!
//! ```no_run
//! use shieldline::{AppConfig, GuardedMessageClient, InputMessage};
//!
//! # async fn run() -> shieldline::Result<()> {
//! let config = AppConfig::load()?;
//! let client = GuardedMessageClient::from_config(&config)?;
//!
//! let request = client.new_request().message(InputMessage::user("Hello"));
//! let message = client.create_message(request).await?;
//! println!("{}", message.first_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
#[cfg(test)]
mod test_helpers;

pub use client::GuardedMessageClient;
pub use shieldline_config::AppConfig;
pub use shieldline_core::{
    BlockedContentError, CompletionService, ContentBlock, Error, GuardContext, GuardResult,
    GuardService, GuardServiceError, GuardStage, InputContent, InputMessage, Message,
    MessageRequest, ProviderError, Result, Role, StopReason, Usage,
};
pub use shieldline_security::{AuditLogger, AuditOutcome};
