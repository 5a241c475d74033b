use crate::domain::model::{ContentBlock, MessagesRequest, MessagesResponse};
use crate::domain::ports::{ChatClient, ConfigProvider};
use crate::utils::error::{ChirpyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

/// Anthropic Messages API 客戶端，每次呼叫只送一次請求
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config
            .api_key()
            .map(str::to_string)
            .ok_or_else(|| ChirpyError::MissingConfigError {
                field: "api_key".to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint().to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        tracing::debug!(
            "Sending {} message(s) to {} (model: {}, max_tokens: {}, temperature: {})",
            request.messages.len(),
            self.endpoint,
            request.model,
            request.max_tokens,
            request.temperature
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChirpyError::ApiStatusError {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| ChirpyError::ResponseParsingError {
                message: format!("Unexpected Messages API payload: {}", e),
            })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "Token usage - input: {}, output: {}",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        Ok(parsed)
    }
}

impl MessagesResponse {
    /// 串接所有文字區塊，也就是要印給使用者看的原始回覆
    pub fn text(&self) -> Result<String> {
        let texts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Unsupported => None,
            })
            .collect();

        if texts.is_empty() {
            return Err(ChirpyError::ResponseParsingError {
                message: format!("Response {} contains no text content", self.id),
            });
        }

        Ok(texts.concat())
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if parsed.error.kind.is_empty() => parsed.error.message,
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.kind),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
