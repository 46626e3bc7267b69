//! AI Guard text-guard client.
//!
//! Calls `POST {base_url}/v1/text/guard` with a Bearer service token. The
//! service answers with a response envelope whose `result` carries the
//! verdict and, when the recipe redacted something, the rewritten text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shieldline_config::GuardConfig;
use shieldline_core::error::GuardServiceError;
use shieldline_core::guard::{GuardContext, GuardResult};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://ai-guard.aws.us.pangea.cloud";
const SUCCESS: &str = "Success";

/// HTTP client for the AI Guard service.
pub struct AiGuardClient {
    name: String,
    base_url: String,
    token: String,
    debug: bool,
    client: reqwest::Client,
}

impl AiGuardClient {
    /// Create a new client with a service token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_timeout(token, std::time::Duration::from_secs(30))
    }

    fn with_timeout(token: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            name: "ai-guard".into(),
            base_url: DEFAULT_BASE_URL.into(),
            token: token.into(),
            debug: false,
            client,
        }
    }

    /// Build from configuration. Fails if no token is available.
    pub fn from_config(config: &GuardConfig) -> Result<Self, GuardServiceError> {
        let token = config.token.clone().ok_or_else(|| {
            GuardServiceError::NotConfigured(
                "no AI Guard token (set PANGEA_AI_GUARD_TOKEN or [guard].token)".into(),
            )
        })?;

        Ok(
            Self::with_timeout(token, std::time::Duration::from_secs(config.timeout_secs))
                .with_base_url(config.endpoint()),
        )
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Ask the service to include detector debug output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Turn a decoded envelope into a verdict.
    fn into_guard_result(
        envelope: GuardEnvelope,
        original: &str,
    ) -> Result<GuardResult, GuardServiceError> {
        if envelope.status != SUCCESS {
            return Err(GuardServiceError::Rejected {
                status: envelope.status,
                summary: envelope.summary.unwrap_or_default(),
            });
        }

        let result = envelope.result.ok_or_else(|| {
            GuardServiceError::InvalidResponse("successful response without a result".into())
        })?;

        let text = match (result.transformed, result.prompt_text) {
            (_, Some(text)) => text,
            (true, None) => {
                return Err(GuardServiceError::InvalidResponse(
                    "transformed verdict without prompt_text".into(),
                ));
            }
            (false, None) => original.to_string(),
        };

        Ok(GuardResult {
            blocked: result.blocked,
            transformed: result.transformed,
            text,
            summary: envelope.summary,
        })
    }
}

#[async_trait]
impl shieldline_core::GuardService for AiGuardClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn guard_text(
        &self,
        text: &str,
        context: &GuardContext,
    ) -> std::result::Result<GuardResult, GuardServiceError> {
        let url = format!("{}/v1/text/guard", self.base_url);
        let body = GuardRequest {
            text,
            recipe: context.recipe.as_deref(),
            debug: self.debug,
            recipient: context.recipient.as_deref(),
            source: context.source.as_deref(),
        };

        debug!(
            guard = "ai-guard",
            stage = %context.stage,
            recipe = ?context.recipe,
            "Sending guard request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GuardServiceError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GuardServiceError::RateLimited);
        }
        if status == 401 || status == 403 {
            return Err(GuardServiceError::AuthenticationFailed(
                "Invalid AI Guard token".into(),
            ));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| GuardServiceError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, "AI Guard API error");
            // Error responses still use the envelope when the service produced them.
            return Err(match serde_json::from_str::<GuardEnvelope>(&raw) {
                Ok(envelope) => GuardServiceError::Rejected {
                    status: envelope.status,
                    summary: envelope.summary.unwrap_or_default(),
                },
                Err(_) => GuardServiceError::ApiError {
                    status_code: status,
                    message: raw,
                },
            });
        }

        let envelope: GuardEnvelope = serde_json::from_str(&raw).map_err(|e| {
            GuardServiceError::InvalidResponse(format!("Failed to parse AI Guard response: {e}"))
        })?;

        Self::into_guard_result(envelope, text)
    }
}

// --- AI Guard API types ---

#[derive(Debug, Serialize)]
struct GuardRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipe: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    debug: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GuardEnvelope {
    status: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    result: Option<TextGuardResult>,
}

#[derive(Debug, Deserialize)]
struct TextGuardResult {
    #[serde(default)]
    prompt_text: Option<String>,
    #[serde(default)]
    blocked: bool,
    #[serde(default)]
    transformed: bool,
}
