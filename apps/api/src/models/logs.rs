//! Persisted audit-record types and their write-side constructors.
//!
//! Rows are append-only: once written they are never updated or deleted by
//! this service. The constructors own the "exactly one of plan/error"
//! invariant — the schema itself does not enforce it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::chat::persona::ChatReply;
use crate::plan::engine::PlanResult;

/// One persisted plan-generation attempt, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlanLogRow {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub company_name: Option<String>,
    /// Raw pre-scrape input: the original URL when the caller supplied one.
    pub job_description: Option<String>,
    pub job_description_length: Option<i32>,
    pub is_url: Option<bool>,
    pub plan: Option<String>,
    pub plan_length: Option<i32>,
    pub job_fit: Option<String>,
    pub job_fit_length: Option<i32>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
}

/// One persisted chatbot attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatLogRow {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
    pub message_length: Option<i32>,
    /// Count of prior conversation turns, not characters.
    pub conversation_history_length: Option<i32>,
    pub response: Option<String>,
    pub response_length: Option<i32>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
}

/// Aggregate row counts across both tables. Zeroed when the store is down.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub plan_generator: LogTotal,
    pub chatbot: LogTotal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogTotal {
    pub total: i64,
}

/// A plan-generation record ready to append. `id` and `timestamp` are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPlanLog {
    pub company_name: String,
    pub job_description: String,
    pub is_url: bool,
    pub plan: Option<String>,
    pub job_fit: Option<String>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
}

impl NewPlanLog {
    pub fn success(
        company_name: &str,
        job_description: &str,
        is_url: bool,
        result: &PlanResult,
    ) -> Self {
        Self {
            company_name: company_name.to_string(),
            job_description: job_description.to_string(),
            is_url,
            plan: Some(result.plan.clone()),
            job_fit: Some(result.job_fit.clone()),
            metadata: serde_json::to_value(&result.metadata).ok(),
            error: None,
        }
    }

    pub fn failure(company_name: &str, job_description: &str, is_url: bool, error: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            job_description: job_description.to_string(),
            is_url,
            plan: None,
            job_fit: None,
            metadata: None,
            error: Some(error.to_string()),
        }
    }
}

/// A chatbot record ready to append.
#[derive(Debug, Clone)]
pub struct NewChatLog {
    pub message: String,
    pub conversation_history_length: i32,
    pub response: Option<String>,
    pub metadata: Option<Value>,
    pub error: Option<String>,
}

impl NewChatLog {
    pub fn success(message: &str, history_turns: usize, reply: &ChatReply) -> Self {
        Self {
            message: message.to_string(),
            conversation_history_length: history_turns as i32,
            response: Some(reply.response.clone()),
            metadata: serde_json::to_value(&reply.metadata).ok(),
            error: None,
        }
    }

    pub fn failure(message: &str, history_turns: usize, error: &str) -> Self {
        Self {
            message: message.to_string(),
            conversation_history_length: history_turns as i32,
            response: None,
            metadata: None,
            error: Some(error.to_string()),
        }
    }
}

/// Character count as stored in the derived `*_length` columns.
pub fn text_len(text: &str) -> i32 {
    text.chars().count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usage::UsageMetadata;

    fn sample_result() -> PlanResult {
        PlanResult {
            plan: "Day 1-30: learn the codebase.".to_string(),
            job_fit: "Strong match on backend systems.".to_string(),
            metadata: UsageMetadata::unknown(10),
        }
    }

    #[test]
    fn test_success_record_has_plan_and_no_error() {
        let record = NewPlanLog::success("Acme", "Build rockets", false, &sample_result());
        assert!(record.plan.is_some());
        assert!(record.job_fit.is_some());
        assert!(record.metadata.is_some());
        assert!(record.error.is_none());
    }

    #[test]
    fn test_failure_record_has_error_and_no_plan() {
        let record = NewPlanLog::failure(
            "Acme",
            "https://jobs.example.com/123",
            true,
            "Provider error: timeout",
        );
        assert!(record.plan.is_none());
        assert!(record.job_fit.is_none());
        assert!(record.metadata.is_none());
        assert_eq!(record.error.as_deref(), Some("Provider error: timeout"));
        assert!(record.is_url);
    }

    #[test]
    fn test_failure_record_keeps_original_url_input() {
        let url = "https://jobs.example.com/123";
        let record = NewPlanLog::failure("Acme", url, true, "scrape blocked");
        assert_eq!(record.job_description, url);
    }

    #[test]
    fn test_chat_history_length_counts_turns() {
        let record = NewChatLog::failure("hello", 4, "provider down");
        assert_eq!(record.conversation_history_length, 4);
        assert!(record.response.is_none());
    }

    #[test]
    fn test_text_len_counts_chars_not_bytes() {
        assert_eq!(text_len("héllo"), 5);
        assert_eq!(text_len(""), 0);
    }

    #[test]
    fn test_plan_row_serializes_camel_case() {
        let row = PlanLogRow {
            id: 1,
            timestamp: Utc::now(),
            company_name: Some("Acme".to_string()),
            job_description: Some("Build rockets".to_string()),
            job_description_length: Some(13),
            is_url: Some(false),
            plan: Some("plan".to_string()),
            plan_length: Some(4),
            job_fit: Some("fit".to_string()),
            job_fit_length: Some(3),
            metadata: None,
            error: None,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert!(value.get("companyName").is_some());
        assert!(value.get("jobDescriptionLength").is_some());
        assert!(value.get("isUrl").is_some());
    }
}
