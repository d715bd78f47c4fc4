//! ContentFetcher — resolves a job-description input that may be a URL into
//! plain text via the scraping collaborator.
//!
//! Many job boards block automated access, so a blocked or near-empty scrape
//! is surfaced as a user-actionable error telling the caller to paste the
//! text manually rather than as an opaque failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;

/// Extracted text shorter than this is treated as a failed extraction:
/// blocking pages typically yield near-empty content, not short-but-valid
/// descriptions.
pub const MIN_SCRAPED_LEN: usize = 50;

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(20);
const SCRAPE_USER_AGENT: &str = concat!("portfolio-api/", env!("CARGO_PKG_VERSION"));

const MANUAL_PASTE_HINT: &str =
    "Automated access is blocked on this site. Please copy and paste the job description text directly.";

/// A job-description input is a URL iff its trimmed value starts with an
/// http(s) scheme. Callers classify once, before any resolution, and carry
/// the flag forward — reclassifying scraped text would always read false.
pub fn is_job_url(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}

/// The scraping collaborator seam: URL in, readable text out.
///
/// Carried in `ContentFetcher` as `Arc<dyn JobScraper>` so tests can swap in
/// a mock without touching handler code.
#[async_trait]
pub trait JobScraper: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// Default scraper: plain HTTP GET, markup stripped, whitespace collapsed.
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(SCRAPE_TIMEOUT)
                .user_agent(SCRAPE_USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl JobScraper for HttpScraper {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(strip_markup(&body))
    }
}

/// Resolves raw-text inputs unchanged and URL inputs through the scraper.
#[derive(Clone)]
pub struct ContentFetcher {
    scraper: Arc<dyn JobScraper>,
}

impl ContentFetcher {
    pub fn new(scraper: Arc<dyn JobScraper>) -> Self {
        Self { scraper }
    }

    /// Returns the job-description text for `input`: pass-through for raw
    /// text, scraped content for URLs. Fails with `AppError::Scrape` when the
    /// collaborator errors or extracts fewer than [`MIN_SCRAPED_LEN`] chars.
    pub async fn resolve(&self, input: &str) -> Result<String, AppError> {
        if !is_job_url(input) {
            return Ok(input.to_string());
        }

        let url = input.trim();
        info!("Resolving job description from URL");

        let text = self
            .scraper
            .fetch(url)
            .await
            .map_err(|e| AppError::Scrape(format!("{e}. {MANUAL_PASTE_HINT}")))?;

        if text.trim().chars().count() < MIN_SCRAPED_LEN {
            return Err(AppError::Scrape(MANUAL_PASTE_HINT.to_string()));
        }

        Ok(text)
    }
}

/// Strips HTML markup: drops script/style blocks entirely, replaces other
/// tags with a space, and collapses whitespace runs.
fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut chars = html.chars().peekable();
    // Set while inside a <script> or <style> block, holding the tag name
    // whose closing tag ends the skip.
    let mut skip_until: Option<&str> = None;

    while let Some(c) = chars.next() {
        if c == '<' {
            let mut closing = false;
            if chars.peek() == Some(&'/') {
                closing = true;
                chars.next();
            }
            let mut name = String::new();
            while let Some(&n) = chars.peek() {
                if n.is_ascii_alphanumeric() {
                    name.push(n.to_ascii_lowercase());
                    chars.next();
                } else {
                    break;
                }
            }
            for n in chars.by_ref() {
                if n == '>' {
                    break;
                }
            }
            match skip_until {
                Some(target) if closing && name == target => skip_until = None,
                Some(_) => {}
                None if !closing && name == "script" => skip_until = Some("script"),
                None if !closing && name == "style" => skip_until = Some("style"),
                None => out.push(' '),
            }
        } else if skip_until.is_none() {
            out.push(c);
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
