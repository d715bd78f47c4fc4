//! PlanEngine — orchestrates the two concurrent LLM calls and normalizes
//! their results into one typed envelope.
//!
//! The plan and job-fit analyses are informationally independent but share
//! the same inputs, so they are dispatched together and awaited jointly.
//! Failure is all-or-nothing: if either call fails, no partial result is
//! returned to the caller.

use std::time::Instant;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionProvider};
use crate::models::usage::UsageMetadata;
use crate::plan::prompts::{
    CANDIDATE_PROFILE, JOB_FIT_PROMPT_TEMPLATE, JOB_FIT_SYSTEM, PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM,
};

/// The canonical result envelope. Everything downstream of the engine —
/// handlers, the audit log, the HTTP response — only ever sees this shape.
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub plan: String,
    pub job_fit: String,
    pub metadata: UsageMetadata,
}

/// Provider-adapter output for the plan call.
///
/// Earlier iterations of the provider helper returned a bare string with no
/// usage accounting; the current one returns text plus metadata. Tolerance
/// for both shapes lives in [`normalize_plan_output`] and nowhere else.
#[derive(Debug, Clone)]
pub enum PlanOutput {
    // Kept for the older helper contract; current adapters always enrich
    #[allow(dead_code)]
    Legacy(String),
    Enriched {
        plan: String,
        metadata: UsageMetadata,
    },
}

/// Runs both analyses concurrently and returns the normalized envelope.
pub async fn generate(
    llm: &dyn CompletionProvider,
    company_name: &str,
    job_description: &str,
) -> Result<PlanResult, AppError> {
    let started = Instant::now();

    let (plan_output, job_fit) = tokio::try_join!(
        generate_plan(llm, company_name, job_description),
        analyze_job_fit(llm, company_name, job_description),
    )?;

    let (plan, metadata) = normalize_plan_output(plan_output, started.elapsed().as_millis() as u64);

    Ok(PlanResult {
        plan,
        job_fit,
        metadata,
    })
}

/// Collapses either provider shape into `(plan, metadata)`. The legacy shape
/// carries no metadata, so the engine substitutes the sentinel with a
/// latency it measured itself.
pub fn normalize_plan_output(output: PlanOutput, elapsed_ms: u64) -> (String, UsageMetadata) {
    match output {
        PlanOutput::Enriched { plan, metadata } => (plan, metadata),
        PlanOutput::Legacy(plan) => (plan, UsageMetadata::unknown(elapsed_ms)),
    }
}

async fn generate_plan(
    llm: &dyn CompletionProvider,
    company_name: &str,
    job_description: &str,
) -> Result<PlanOutput, AppError> {
    let started = Instant::now();
    let prompt = build_plan_prompt(company_name, job_description);

    let completion = llm
        .complete(PLAN_SYSTEM, &[ChatMessage::user(&prompt)])
        .await
        .map_err(|e| AppError::Provider(format!("Plan generation failed: {e}")))?;

    let metadata =
        UsageMetadata::from_usage(&completion.usage, started.elapsed().as_millis() as u64);

    Ok(PlanOutput::Enriched {
        plan: completion.text,
        metadata,
    })
}

async fn analyze_job_fit(
    llm: &dyn CompletionProvider,
    company_name: &str,
    job_description: &str,
) -> Result<String, AppError> {
    let prompt = build_job_fit_prompt(company_name, job_description);

    let completion = llm
        .complete(JOB_FIT_SYSTEM, &[ChatMessage::user(&prompt)])
        .await
        .map_err(|e| AppError::Provider(format!("Job fit analysis failed: {e}")))?;

    Ok(completion.text)
}

fn build_plan_prompt(company_name: &str, job_description: &str) -> String {
    PLAN_PROMPT_TEMPLATE
        .replace("{company_name}", company_name)
        .replace("{job_description}", job_description)
}

fn build_job_fit_prompt(company_name: &str, job_description: &str) -> String {
    JOB_FIT_PROMPT_TEMPLATE
        .replace("{company_name}", company_name)
        .replace("{candidate_profile}", CANDIDATE_PROFILE)
        .replace("{job_description}", job_description)
}
