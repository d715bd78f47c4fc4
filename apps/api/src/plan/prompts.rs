// All LLM prompt constants for the plan-generation module.

/// System prompt for 90-day plan generation.
pub const PLAN_SYSTEM: &str =
    "You are a senior engineering leader helping a software engineer prepare \
    for a new role. Write concrete, actionable 90-day plans grounded in the \
    company and job description provided. Respond in well-structured markdown \
    with clear 30/60/90-day phases. Do not invent facts about the company.";

/// 90-day plan prompt template. Replace `{company_name}` and
/// `{job_description}` before sending.
pub const PLAN_PROMPT_TEMPLATE: &str = r#"Create a 90-day plan for joining {company_name} in the role described below.

Structure the plan in three phases:
- Days 1-30: learning, relationships, and early signals
- Days 31-60: first meaningful contributions
- Days 61-90: ownership and measurable impact

Each phase should name specific activities tied to the responsibilities and
technologies in the job description, not generic onboarding advice.

JOB DESCRIPTION:
{job_description}"#;

/// System prompt for job-fit analysis.
pub const JOB_FIT_SYSTEM: &str =
    "You are a candid technical recruiter assessing how well an engineer's \
    background fits a role. Be specific about strengths and gaps. Respond in \
    short markdown sections. Do not invent experience the profile does not claim.";

/// Job-fit prompt template. Replace `{company_name}`, `{job_description}`,
/// and `{candidate_profile}` before sending.
pub const JOB_FIT_PROMPT_TEMPLATE: &str = r#"Assess the fit between the candidate below and this role at {company_name}.

Cover:
1. Strong matches — requirements the candidate clearly meets, with evidence
2. Partial matches — adjacent experience that transfers
3. Gaps — requirements with no supporting evidence
4. Overall verdict — one paragraph, direct

CANDIDATE PROFILE:
{candidate_profile}

JOB DESCRIPTION:
{job_description}"#;

/// Background summary of the portfolio owner used by the job-fit call.
/// Mirrors the biographical content on the site itself.
pub const CANDIDATE_PROFILE: &str =
    "Software engineer with production experience across backend services \
    (Rust, Python, TypeScript), data pipelines, and applied machine learning. \
    Has shipped LLM-backed product features, owns infrastructure end to end on \
    small teams, and maintains this portfolio site and its serverless API.";
