//! The guarded messages client.
//!
//! Each `create_message` call is a straight sequence: guard the prompt, call
//! the completion service, guard the reply. Either guard check can end the
//! call with a [`BlockedContentError`]; nothing is retried.

use std::sync::Arc;

use shieldline_config::{AnthropicConfig, AppConfig, GuardConfig};
use shieldline_core::error::{BlockedContentError, Error, Result};
use shieldline_core::guard::{GuardContext, GuardResult, GuardStage};
use shieldline_core::message::{Message, MessageRequest};
use shieldline_core::{CompletionService, GuardService};
use shieldline_guard::AiGuardClient;
use shieldline_providers::AnthropicClient;
use shieldline_security::{AuditEvent, AuditLogger, AuditOutcome};
use tracing::{debug, warn};

/// Wraps a completion service with input and output guard checks.
pub struct GuardedMessageClient {
    guard: Arc<dyn GuardService>,
    completion: Arc<dyn CompletionService>,
    input_recipe: String,
    output_recipe: String,
    recipient: Option<String>,
    source: Option<String>,
    default_model: String,
    default_max_tokens: u32,
    audit: Option<Arc<AuditLogger>>,
}

impl GuardedMessageClient {
    /// Create a client around explicit guard and completion services.
    pub fn new(guard: Arc<dyn GuardService>, completion: Arc<dyn CompletionService>) -> Self {
        let guard_defaults = GuardConfig::default();
        let anthropic_defaults = AnthropicConfig::default();
        Self {
            guard,
            completion,
            input_recipe: guard_defaults.input_recipe,
            output_recipe: guard_defaults.output_recipe,
            recipient: None,
            source: None,
            default_model: anthropic_defaults.default_model,
            default_max_tokens: anthropic_defaults.default_max_tokens,
            audit: None,
        }
    }

    /// Build the HTTP guard and Anthropic clients from configuration.
    ///
    /// A missing credential surfaces as the service's own `NotConfigured` error.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let guard = AiGuardClient::from_config(&config.guard)?;
        let completion = AnthropicClient::from_config(&config.anthropic)?;

        Ok(Self::new(Arc::new(guard), Arc::new(completion))
            .with_input_recipe(&config.guard.input_recipe)
            .with_output_recipe(&config.guard.output_recipe)
            .with_defaults(&config.anthropic.default_model, config.anthropic.default_max_tokens))
    }

    /// Recipe applied to prompts.
    pub fn with_input_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.input_recipe = recipe.into();
        self
    }

    /// Recipe applied to model responses.
    pub fn with_output_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.output_recipe = recipe.into();
        self
    }

    /// Recipient identifier passed to every guard check.
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Source identifier passed to every guard check.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Model and token limit used by [`new_request`](Self::new_request).
    pub fn with_defaults(mut self, model: impl Into<String>, max_tokens: u32) -> Self {
        self.default_model = model.into();
        self.default_max_tokens = max_tokens;
        self
    }

    /// Record every verdict and completion call in `audit`.
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// An empty request carrying the configured model and token limit.
    pub fn new_request(&self) -> MessageRequest {
        MessageRequest::new(&self.default_model, self.default_max_tokens)
    }

    /// Guard, forward, guard, return.
    ///
    /// The prompt is the latest user message's first text block, or for a
    /// turn made only of tool results, the first tool result's text. The reply
    /// is the first text block of the returned message. Everything else in the
    /// request and the reply passes through unchanged. A request with no user
    /// text is rejected before anything is sent.
    pub async fn create_message(&self, mut request: MessageRequest) -> Result<Message> {
        let prompt = request
            .latest_user_text()
            .ok_or_else(|| Error::InvalidRequest("request has no user text to guard".into()))?
            .to_string();

        let verdict = self.check(GuardStage::Input, &prompt).await?;
        if verdict.transformed {
            if let Some(slot) = request.latest_user_text_mut() {
                *slot = verdict.text;
            }
        }

        let model = request.model.clone();
        debug!(backend = self.completion.name(), model = %model, "Forwarding guarded request");
        let mut message = match self.completion.create_message(request).await {
            Ok(message) => {
                self.record_call(&model, AuditOutcome::Passed, None);
                message
            }
            Err(e) => {
                self.record_call(&model, AuditOutcome::Failed, Some(e.to_string()));
                return Err(e.into());
            }
        };

        // A reply without text is still checked, as the empty string.
        let reply = message.first_text().unwrap_or_default().to_string();
        let verdict = self.check(GuardStage::Output, &reply).await?;
        if verdict.transformed {
            if let Some(slot) = message.first_text_mut() {
                *slot = verdict.text;
            }
        }

        Ok(message)
    }

    fn context(&self, stage: GuardStage) -> GuardContext {
        let recipe = match stage {
            GuardStage::Input => &self.input_recipe,
            GuardStage::Output => &self.output_recipe,
        };
        GuardContext {
            stage,
            recipe: Some(recipe.clone()),
            recipient: self.recipient.clone(),
            source: self.source.clone(),
        }
    }

    /// One guard check; a block becomes an error.
    async fn check(&self, stage: GuardStage, text: &str) -> Result<GuardResult> {
        let context = self.context(stage);
        let recipe = context.recipe.as_deref().unwrap_or_default();

        let result = match self.guard.guard_text(text, &context).await {
            Ok(result) => result,
            Err(e) => {
                self.record_check(stage, recipe, AuditOutcome::Failed, Some(e.to_string()));
                return Err(e.into());
            }
        };

        if result.blocked {
            warn!(guard = self.guard.name(), stage = %stage, "Content blocked by guard");
            self.record_check(stage, recipe, AuditOutcome::Blocked, result.summary.clone());
            let mut err = BlockedContentError::new(stage);
            err.summary = result.summary;
            return Err(err.into());
        }

        let outcome = if result.transformed {
            AuditOutcome::Transformed
        } else {
            AuditOutcome::Passed
        };
        debug!(guard = self.guard.name(), stage = %stage, outcome = ?outcome, "Guard check passed");
        self.record_check(stage, recipe, outcome, None);

        Ok(result)
    }

    fn record_check(
        &self,
        stage: GuardStage,
        recipe: &str,
        outcome: AuditOutcome,
        details: Option<String>,
    ) {
        if let Some(audit) = &self.audit {
            audit.log(
                AuditEvent::GuardCheck { stage },
                self.guard.name(),
                recipe,
                outcome,
                details,
            );
        }
    }

    fn record_call(&self, model: &str, outcome: AuditOutcome, details: Option<String>) {
        if let Some(audit) = &self.audit {
            audit.log(
                AuditEvent::CompletionCall { model: model.to_string() },
                self.completion.name(),
                model,
                outcome,
                details,
            );
        }
    }
}

impl std::fmt::Debug for GuardedMessageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedMessageClient")
            .field("guard", &self.guard.name())
            .field("completion", &self.completion.name())
            .field("input_recipe", &self.input_recipe)
            .field("output_recipe", &self.output_recipe)
            .field("audit", &self.audit.is_some())
            .finish()
    }
}
