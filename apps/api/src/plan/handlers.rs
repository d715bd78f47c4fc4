//! Axum route handlers for the plan-generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::logs::NewPlanLog;
use crate::models::usage::UsageMetadata;
use crate::plan::engine::{self, PlanResult};
use crate::plan::fetcher::is_job_url;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCompanyRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCompanyResponse {
    pub plan: String,
    pub job_fit: String,
    pub metadata: UsageMetadata,
}

/// POST /analyze-company
///
/// Validates input, resolves URL-form job descriptions, runs the plan engine,
/// and appends exactly one audit record per post-validation attempt — success
/// or failure — without the response waiting on the write.
pub async fn handle_analyze_company(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCompanyRequest>,
) -> Result<Json<AnalyzeCompanyResponse>, AppError> {
    let (outcome, record) = analyze_attempt(&state, &request).await?;

    // Fire-and-forget: the audit write is diagnostic infrastructure and must
    // never delay or fail the response.
    let logs = state.logs.clone();
    tokio::spawn(async move { logs.append_plan(record).await });

    outcome.map(|result| {
        Json(AnalyzeCompanyResponse {
            plan: result.plan,
            job_fit: result.job_fit,
            metadata: result.metadata,
        })
    })
}

/// Validates the request, then runs one analysis attempt.
///
/// Validation failures return early with no record. Every attempt past
/// validation yields exactly one record describing its outcome, alongside the
/// outcome itself.
async fn analyze_attempt(
    state: &AppState,
    request: &AnalyzeCompanyRequest,
) -> Result<(Result<PlanResult, AppError>, NewPlanLog), AppError> {
    if request.company_name.trim().is_empty() || request.job_description.trim().is_empty() {
        // Fails before any attempt: no audit record for invalid input
        return Err(AppError::Validation(
            "Company name and job description are required".to_string(),
        ));
    }

    // Classified exactly once, before resolution. The audit record must
    // reflect the original input even after a URL is scraped into text.
    let is_url = is_job_url(&request.job_description);

    let outcome = analyze(state, request).await;

    let record = match &outcome {
        Ok(result) => {
            info!(
                "Plan generated for company (plan: {} chars, job fit: {} chars)",
                result.plan.chars().count(),
                result.job_fit.chars().count()
            );
            NewPlanLog::success(
                request.company_name.trim(),
                &request.job_description,
                is_url,
                result,
            )
        }
        Err(err) => {
            error!("Company analysis failed: {err}");
            NewPlanLog::failure(
                request.company_name.trim(),
                &request.job_description,
                is_url,
                &err.to_string(),
            )
        }
    };

    Ok((outcome, record))
}

async fn analyze(
    state: &AppState,
    request: &AnalyzeCompanyRequest,
) -> Result<PlanResult, AppError> {
    let job_description = state.fetcher.resolve(&request.job_description).await?;
    engine::generate(
        state.llm.as_ref(),
        request.company_name.trim(),
        &job_description,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{ChatMessage, Completion, CompletionProvider, LlmError, Usage};
    use crate::logs::InteractionLog;
    use crate::plan::fetcher::{ContentFetcher, JobScraper};
    use crate::plan::prompts::PLAN_SYSTEM;

    /// Provider that answers from a script instead of the network: a fixed
    /// plan or fit text on success, a provider error when `fail` is set.
    struct ScriptedProvider {
        fail: bool,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            system: &str,
            _messages: &[ChatMessage<'_>],
        ) -> Result<Completion, LlmError> {
            if self.fail {
                return Err(LlmError::Api {
                    status: 529,
                    message: "overloaded".to_string(),
                });
            }
            let text = if system == PLAN_SYSTEM {
                "Days 1-30: learn the codebase."
            } else {
                "Strong fit for the backend role."
            };
            Ok(Completion {
                text: text.to_string(),
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 20,
                },
            })
        }
    }

    struct StaticScraper(String);

    #[async_trait]
    impl JobScraper for StaticScraper {
        async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    const SCRAPED_JD: &str = "Senior Rust Engineer. You will build and operate \
        distributed backend services in production, owning reliability end to end.";

    fn test_state(provider_fails: bool) -> AppState {
        AppState {
            llm: Arc::new(ScriptedProvider {
                fail: provider_fails,
            }),
            fetcher: ContentFetcher::new(Arc::new(StaticScraper(SCRAPED_JD.to_string()))),
            logs: InteractionLog::disabled(),
            config: Config {
                database_url: None,
                anthropic_api_key: "test-key".to_string(),
                admin_log_key: None,
                port: 8080,
                rust_log: "info".to_string(),
            },
        }
    }

    fn request(company_name: &str, job_description: &str) -> AnalyzeCompanyRequest {
        AnalyzeCompanyRequest {
            company_name: company_name.to_string(),
            job_description: job_description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_validation_failure_yields_no_record() {
        let state = test_state(false);
        let err = analyze_attempt(&state, &request("  ", "Build rockets"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_successful_attempt_records_plan_without_error() {
        let state = test_state(false);
        let (outcome, record) = analyze_attempt(&state, &request("Acme", "Build rockets in Rust"))
            .await
            .unwrap();

        let result = outcome.unwrap();
        assert_eq!(record.company_name, "Acme");
        assert!(!record.is_url);
        assert_eq!(record.plan.as_deref(), Some(result.plan.as_str()));
        assert_eq!(record.job_fit.as_deref(), Some(result.job_fit.as_str()));
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_records_error_with_null_plan() {
        let state = test_state(true);
        let (outcome, record) = analyze_attempt(&state, &request("Acme", "Build rockets in Rust"))
            .await
            .unwrap();

        assert!(matches!(outcome, Err(AppError::Provider(_))));
        assert!(record.plan.is_none());
        assert!(record.job_fit.is_none());
        let error = record.error.expect("failure record carries the error");
        assert!(error.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_url_attempt_records_original_url_not_scraped_text() {
        let state = test_state(false);
        let url = "https://jobs.example.com/rust-123";
        let (outcome, record) = analyze_attempt(&state, &request("Acme", url))
            .await
            .unwrap();

        assert!(outcome.is_ok());
        assert!(record.is_url);
        assert_eq!(record.job_description, url);
    }

    #[test]
    fn test_request_accepts_camel_case_body() {
        let json = serde_json::json!({
            "companyName": "Acme",
            "jobDescription": "Build rockets"
        });
        let request: AnalyzeCompanyRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.company_name, "Acme");
        assert_eq!(request.job_description, "Build rockets");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: AnalyzeCompanyRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(request.company_name.is_empty());
        assert!(request.job_description.is_empty());
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = AnalyzeCompanyResponse {
            plan: "p".to_string(),
            job_fit: "f".to_string(),
            metadata: UsageMetadata::unknown(1),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("jobFit").is_some());
        assert!(value["metadata"].get("latencyMs").is_some());
    }
}
