//! GuardService trait — the abstraction over content-safety checks.
//!
//! A guard inspects a piece of text and returns a verdict: pass it through,
//! hand back a transformed (e.g. redacted) version, or block it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GuardServiceError;

/// Which side of the completion call a check runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardStage {
    /// Outbound prompt, before the completion call
    Input,
    /// Model response, after the completion call
    Output,
}

impl std::fmt::Display for GuardStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardStage::Input => write!(f, "input"),
            GuardStage::Output => write!(f, "output"),
        }
    }
}

/// Policy metadata sent alongside the text. Opaque to the decision logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardContext {
    pub stage: GuardStage,

    /// Named guard policy to apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl GuardContext {
    pub fn new(stage: GuardStage) -> Self {
        Self {
            stage,
            recipe: None,
            recipient: None,
            source: None,
        }
    }

    pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = Some(recipe.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// The verdict of a single guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    pub blocked: bool,
    pub transformed: bool,
    /// The (possibly modified) text
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl GuardResult {
    /// Pass `text` through unchanged.
    pub fn pass(text: impl Into<String>) -> Self {
        Self {
            blocked: false,
            transformed: false,
            text: text.into(),
            summary: None,
        }
    }

    /// Pass, replacing the content with `text`.
    pub fn transformed(text: impl Into<String>) -> Self {
        Self {
            blocked: false,
            transformed: true,
            text: text.into(),
            summary: None,
        }
    }

    pub fn blocked() -> Self {
        Self {
            blocked: true,
            transformed: false,
            text: String::new(),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// The core GuardService trait.
///
/// Implementations: the AI Guard HTTP client, scripted doubles in tests.
#[async_trait]
pub trait GuardService: Send + Sync {
    /// A human-readable name for this guard (e.g., "ai-guard").
    fn name(&self) -> &str;

    /// Check `text` under the policy described by `context`.
    async fn guard_text(
        &self,
        text: &str,
        context: &GuardContext,
    ) -> std::result::Result<GuardResult, GuardServiceError>;
}
