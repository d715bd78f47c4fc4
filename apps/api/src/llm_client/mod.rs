/// LLM Client — the single point of entry for all Anthropic API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// The client is deliberately single-shot: plan and chat calls sit on the
/// user-facing request path, so a retry loop here would double perceived
/// latency. The audit store is the only place that retries.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in this service.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Provider architecture tag recorded in usage metadata.
pub const ARCHITECTURE: &str = "anthropic-messages";
const MAX_TOKENS: u32 = 4096;

// Published per-million-token pricing for MODEL, used for the cost field in
// usage metadata. Estimates only; billing truth lives with the provider.
const INPUT_COST_PER_MTOK: f64 = 3.0;
const OUTPUT_COST_PER_MTOK: f64 = 15.0;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A single turn in a conversation, borrowed from the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    pub fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }

    pub fn assistant(content: &'a str) -> Self {
        Self {
            role: "assistant",
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage<'a>],
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Token accounting reported by the provider for one call.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed LLM call: extracted text plus token accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Estimated dollar cost of one call from its token counts.
pub fn estimate_cost(usage: &Usage) -> f64 {
    (f64::from(usage.input_tokens) * INPUT_COST_PER_MTOK
        + f64::from(usage.output_tokens) * OUTPUT_COST_PER_MTOK)
        / 1_000_000.0
}

/// The provider seam: one completion call in, extracted text plus usage out.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>` so the plan engine
/// and persona chat can be driven with a scripted provider in tests.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage<'_>],
    ) -> Result<Completion, LlmError>;
}

/// The single LLM client shared by the plan engine and the persona chat.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    /// Makes one call to the Messages API and returns the extracted text
    /// plus usage. No retries — see the module doc.
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage<'_>],
    ) -> Result<Completion, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured provider error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ApiResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            api_response.usage.input_tokens, api_response.usage.output_tokens
        );

        let text = api_response
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
            .ok_or(LlmError::EmptyContent)?
            .to_string();

        Ok(Completion {
            text,
            usage: api_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_cost_zero_tokens() {
        let usage = Usage {
            input_tokens: 0,
            output_tokens: 0,
        };
        assert_eq!(estimate_cost(&usage), 0.0);
    }

    #[test]
    fn test_estimate_cost_weighs_output_heavier() {
        let input_heavy = Usage {
            input_tokens: 1000,
            output_tokens: 0,
        };
        let output_heavy = Usage {
            input_tokens: 0,
            output_tokens: 1000,
        };
        assert!(estimate_cost(&output_heavy) > estimate_cost(&input_heavy));
    }

    #[test]
    fn test_estimate_cost_per_million() {
        let usage = Usage {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
        };
        let cost = estimate_cost(&usage);
        assert!((cost - (INPUT_COST_PER_MTOK + OUTPUT_COST_PER_MTOK)).abs() < 1e-9);
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
    }
}
