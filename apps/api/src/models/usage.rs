use serde::{Deserialize, Serialize};

use crate::llm_client::{estimate_cost, Usage, ARCHITECTURE, MODEL};

/// Token counts for one LLM call, as surfaced to API callers and the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

/// Usage metadata attached to every plan and chat result.
///
/// The legacy provider-helper shape carried no metadata at all; callers that
/// hit that shape substitute [`UsageMetadata::unknown`] with a latency they
/// measured themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub latency_ms: u64,
    pub model: String,
    pub architecture: String,
    pub cost_usd: f64,
    pub tokens: TokenUsage,
}

impl UsageMetadata {
    /// Sentinel metadata for a provider response that carried none.
    pub fn unknown(latency_ms: u64) -> Self {
        Self {
            latency_ms,
            model: "unknown".to_string(),
            architecture: "unknown".to_string(),
            cost_usd: 0.0,
            tokens: TokenUsage {
                input: 0,
                output: 0,
                total: 0,
            },
        }
    }

    /// Builds metadata from provider token accounting and a measured latency.
    pub fn from_usage(usage: &Usage, latency_ms: u64) -> Self {
        Self {
            latency_ms,
            model: MODEL.to_string(),
            architecture: ARCHITECTURE.to_string(),
            cost_usd: estimate_cost(usage),
            tokens: TokenUsage {
                input: usage.input_tokens,
                output: usage.output_tokens,
                total: usage.input_tokens + usage.output_tokens,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_uses_sentinel_values() {
        let metadata = UsageMetadata::unknown(1234);
        assert_eq!(metadata.latency_ms, 1234);
        assert_eq!(metadata.model, "unknown");
        assert_eq!(metadata.architecture, "unknown");
        assert_eq!(metadata.cost_usd, 0.0);
        assert_eq!(metadata.tokens.total, 0);
    }

    #[test]
    fn test_from_usage_totals_tokens() {
        let usage = Usage {
            input_tokens: 120,
            output_tokens: 480,
        };
        let metadata = UsageMetadata::from_usage(&usage, 900);
        assert_eq!(metadata.tokens.input, 120);
        assert_eq!(metadata.tokens.output, 480);
        assert_eq!(metadata.tokens.total, 600);
        assert_eq!(metadata.model, MODEL);
        assert!(metadata.cost_usd > 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let metadata = UsageMetadata::unknown(5);
        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value.get("latencyMs").is_some());
        assert!(value.get("costUsd").is_some());
        assert!(value["tokens"].get("input").is_some());
    }

    #[test]
    fn test_round_trips_through_json() {
        let usage = Usage {
            input_tokens: 10,
            output_tokens: 20,
        };
        let metadata = UsageMetadata::from_usage(&usage, 42);
        let json = serde_json::to_string(&metadata).unwrap();
        let recovered: UsageMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, metadata);
    }
}
