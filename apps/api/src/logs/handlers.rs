//! Axum route handler for the admin log read path.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::logs::DEFAULT_LIMIT;
use crate::models::logs::{ChatLogRow, LogStats, PlanLogRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminLogsQuery {
    pub key: Option<String>,
    #[serde(default = "default_log_type", rename = "type")]
    pub log_type: String,
    /// Kept as a raw string so a malformed value falls back to the default
    /// instead of failing the whole request with a 400.
    pub limit: Option<String>,
    pub stats: Option<String>,
}

fn default_log_type() -> String {
    "all".to_string()
}

/// Lenient limit parsing: absent, empty, or non-numeric values all mean the
/// default bound.
fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLogsResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub counts: LogCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<LogStats>,
    pub logs: LogSections,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogCounts {
    pub plan_generator: usize,
    pub chatbot: usize,
}

/// Only the requested sections are present in the response body.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_generator: Option<Vec<PlanLogRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatbot: Option<Vec<ChatLogRow>>,
}

/// GET /admin-logs
///
/// Query params: `key` (or `x-admin-key` header), `type` (plan|chatbot|all),
/// `limit`, `stats=true`. An unconfigured admin key is a server configuration
/// error (500), distinct from a bad credential (401), so operators can tell
/// misconfiguration from an intrusion attempt.
pub async fn handle_admin_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminLogsQuery>,
) -> Result<Json<AdminLogsResponse>, AppError> {
    let presented = query
        .key
        .as_deref()
        .or_else(|| headers.get("x-admin-key").and_then(|v| v.to_str().ok()));

    verify_admin_key(presented, state.config.admin_log_key.as_deref())?;

    let limit = parse_limit(query.limit.as_deref());
    let mut sections = LogSections::default();

    if matches!(query.log_type.as_str(), "plan" | "all") {
        sections.plan_generator = Some(state.logs.list_plan(limit).await);
    }
    if matches!(query.log_type.as_str(), "chatbot" | "all") {
        sections.chatbot = Some(state.logs.list_chat(limit).await);
    }

    let stats = if query.stats.as_deref() == Some("true") {
        Some(state.logs.stats().await)
    } else {
        None
    };

    let counts = LogCounts {
        plan_generator: sections.plan_generator.as_ref().map_or(0, Vec::len),
        chatbot: sections.chatbot.as_ref().map_or(0, Vec::len),
    };

    Ok(Json(AdminLogsResponse {
        success: true,
        timestamp: Utc::now(),
        counts,
        stats,
        logs: sections,
    }))
}

/// Compares the presented credential against the configured key in constant
/// time, so response timing leaks nothing about prefix matches.
pub(crate) fn verify_admin_key(
    presented: Option<&str>,
    configured: Option<&str>,
) -> Result<(), AppError> {
    let Some(configured) = configured else {
        return Err(AppError::Config(
            "ADMIN_LOG_KEY environment variable is not set".to_string(),
        ));
    };
    let Some(presented) = presented else {
        return Err(AppError::Unauthorized);
    };
    if bool::from(presented.as_bytes().ct_eq(configured.as_bytes())) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_key_is_accepted() {
        assert!(verify_admin_key(Some("s3cret"), Some("s3cret")).is_ok());
    }

    #[test]
    fn test_wrong_key_is_unauthorized() {
        let err = verify_admin_key(Some("guess"), Some("s3cret")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        let err = verify_admin_key(None, Some("s3cret")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_unconfigured_key_is_config_error_even_with_credential() {
        let err = verify_admin_key(Some("anything"), None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_prefix_of_key_is_rejected() {
        let err = verify_admin_key(Some("s3cre"), Some("s3cret")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_limit_parses_numeric_values() {
        assert_eq!(parse_limit(Some("25")), 25);
        assert_eq!(parse_limit(Some(" 25 ")), 25);
    }

    #[test]
    fn test_malformed_limit_falls_back_to_default() {
        assert_eq!(parse_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_query_type_defaults_to_all() {
        let query: AdminLogsQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.log_type, "all");
        assert!(query.key.is_none());
        assert!(query.limit.is_none());
    }

    #[test]
    fn test_absent_sections_are_omitted_from_json() {
        let response = AdminLogsResponse {
            success: true,
            timestamp: Utc::now(),
            counts: LogCounts {
                plan_generator: 0,
                chatbot: 0,
            },
            stats: None,
            logs: LogSections {
                plan_generator: Some(Vec::new()),
                chatbot: None,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("stats").is_none());
        assert!(value["logs"].get("planGenerator").is_some());
        assert!(value["logs"].get("chatbot").is_none());
        assert!(value["counts"].get("planGenerator").is_some());
    }
}
