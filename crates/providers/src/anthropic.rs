//! Anthropic Messages API client.
//!
//! Uses Anthropic's Messages API directly:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - Request and response bodies map one-to-one onto the core message types

use async_trait::async_trait;
use shieldline_config::AnthropicConfig;
use shieldline_core::error::ProviderError;
use shieldline_core::message::{Message, MessageRequest};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Anthropic native Messages API client.
pub struct AnthropicClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, std::time::Duration::from_secs(300))
    }

    fn with_timeout(api_key: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build from configuration. Fails if no API key is available.
    pub fn from_config(config: &AnthropicConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "no Anthropic API key (set ANTHROPIC_API_KEY or [anthropic].api_key)".into(),
            )
        })?;

        Ok(
            Self::with_timeout(api_key, std::time::Duration::from_secs(config.timeout_secs))
                .with_base_url(&config.base_url),
        )
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn retry_after(response: &reqwest::Response) -> u64 {
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
    }
}

#[async_trait]
impl shieldline_core::CompletionService for AnthropicClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_message(
        &self,
        request: MessageRequest,
    ) -> std::result::Result<Message, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);

        debug!(provider = "anthropic", model = %request.model, "Sending message request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: Self::retry_after(&response),
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        response
            .json::<Message>()
            .await
            .map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Anthropic response: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use shieldline_core::CompletionService;
    use shieldline_core::message::InputMessage;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Replies with the first user message echoed back, if the auth headers are right.
    async fn echo(
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let authed = headers.get("x-api-key").map(|v| v == "sk-ant-test").unwrap_or(false)
            && headers.get("anthropic-version").map(|v| v == ANTHROPIC_VERSION).unwrap_or(false);
        if !authed {
            return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
        }

        let echoed = body["messages"][0]["content"].as_str().unwrap_or("").to_string();
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": "msg_01",
                "type": "message",
                "model": body["model"],
                "role": "assistant",
                "content": [{"type": "text", "text": format!("echo: {echoed}")}],
                "stop_reason": "end_turn",
                "stop_sequence": null,
                "usage": {"input_tokens": 10, "output_tokens": 5}
            })),
        )
    }

    fn hello_request() -> MessageRequest {
        MessageRequest::new("claude-sonnet-4-20250514", 1024).message(InputMessage::user("Hello"))
    }

    #[test]
    fn constructor() {
        let client = AnthropicClient::new("sk-ant-test");
        assert_eq!(client.name(), "anthropic");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let client = AnthropicClient::new("sk-ant-test").with_base_url("https://custom.proxy.com/");
        assert_eq!(client.base_url, "https://custom.proxy.com");
    }

    #[test]
    fn from_config_requires_key() {
        let config = AnthropicConfig::default();
        assert!(matches!(
            AnthropicClient::from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));

        let config = AnthropicConfig {
            api_key: Some("sk-ant-test".into()),
            base_url: "http://localhost:8080/".into(),
            ..AnthropicConfig::default()
        };
        let client = AnthropicClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn create_message_round_trip() {
        let base = serve(Router::new().route("/v1/messages", post(echo))).await;
        let client = AnthropicClient::new("sk-ant-test").with_base_url(base);

        let message = client.create_message(hello_request()).await.unwrap();
        assert_eq!(message.first_text(), Some("echo: Hello"));
        assert_eq!(message.model, "claude-sonnet-4-20250514");
        assert_eq!(message.usage.total(), 15);
    }

    #[tokio::test]
    async fn bad_key_maps_to_authentication_failed() {
        let base = serve(Router::new().route("/v1/messages", post(echo))).await;
        let client = AnthropicClient::new("sk-ant-wrong").with_base_url(base);

        let err = client.create_message(hello_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async {
                (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "12")], "slow down")
            }),
        );
        let base = serve(router).await;
        let client = AnthropicClient::new("sk-ant-test").with_base_url(base);

        let err = client.create_message(hello_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 12 }));
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }),
        );
        let base = serve(router).await;
        let client = AnthropicClient::new("sk-ant-test").with_base_url(base);

        match client.create_message(hello_request()).await.unwrap_err() {
            ProviderError::ApiError { status_code, message } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "overloaded");
            }
            other => panic!("Expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = AnthropicClient::new("sk-ant-test").with_base_url("http://127.0.0.1:1");
        let err = client.create_message(hello_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
