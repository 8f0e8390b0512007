use crate::ratelimit::ExponentialBackoff;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Browser-like UA; the vendor sites serve block pages to obvious bots
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Bodies shorter than this are interstitials or stubs, not product pages
const MIN_BODY_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("block page served for {0}")]
    Blocked(String),

    #[error("empty or truncated body from {0}")]
    EmptyBody(String),

    #[error("no fetch strategy succeeded: {0}")]
    Exhausted(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// One way of turning a URL into page text. The static HTTP fetcher is
/// built in; rendered fallbacks (headless/headful browser bridges) are
/// supplied by the caller and slot into the same trait.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Strategy name for logs ("static", "headless", ...)
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// Block pages come back with HTTP 200 often enough that the body has to
/// be inspected
pub fn looks_blocked(html: &str) -> bool {
    let t = html.to_lowercase();
    t.contains("access denied") || t.contains("forbidden") || t.contains("edgesuite.net")
}

pub fn suspiciously_small(html: &str) -> bool {
    html.trim().len() < MIN_BODY_LEN
}

/// Plain HTTP GET with a hard per-request timeout
pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(StaticFetcher { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        StaticFetcher { client }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?
            .error_for_status()?;

        let html = response.text().await?;
        if looks_blocked(&html) {
            return Err(FetchError::Blocked(url.to_string()));
        }
        if suspiciously_small(&html) {
            return Err(FetchError::EmptyBody(url.to_string()));
        }
        Ok(html)
    }
}

/// The per-URL fetch attempt, one reusable escalation ladder instead of a
/// divergent copy per vendor:
///
/// `FETCH_STATIC` (two quick retries, jittered backoff)
///   -> on block page / failure: `FETCH_RENDERED` (each renderer in order)
///   -> all exhausted: error carrying the last failure
pub struct FetchLadder {
    primary: Box<dyn PageFetcher>,
    renderers: Vec<Box<dyn PageFetcher>>,
    retries: usize,
    backoff_ms: u64,
    backoff_max_ms: u64,
}

impl FetchLadder {
    pub fn new(primary: Box<dyn PageFetcher>) -> Self {
        FetchLadder {
            primary,
            renderers: Vec::new(),
            retries: 2,
            backoff_ms: 500,
            backoff_max_ms: 4_000,
        }
    }

    /// Append a rendered-fetch fallback; call order is escalation order
    /// (headless before headful)
    pub fn with_renderer(mut self, renderer: Box<dyn PageFetcher>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn with_retry_policy(mut self, retries: usize, backoff_ms: u64, backoff_max_ms: u64) -> Self {
        self.retries = retries;
        self.backoff_ms = backoff_ms;
        self.backoff_max_ms = backoff_max_ms;
        self
    }

    pub async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        let mut backoff = ExponentialBackoff::new(self.backoff_ms, self.backoff_max_ms, self.retries);
        let mut last_err: Option<FetchError> = None;

        loop {
            match self.primary.fetch(url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    tracing::debug!(strategy = self.primary.name(), url, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
            match backoff.next_backoff_jittered() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => break,
            }
        }

        for renderer in &self.renderers {
            tracing::debug!(strategy = renderer.name(), url, "escalating fetch");
            match renderer.fetch(url).await {
                Ok(html) => return Ok(html),
                Err(e) => {
                    tracing::debug!(strategy = renderer.name(), url, error = %e, "rendered fetch failed");
                    last_err = Some(e);
                }
            }
        }

        let reason = last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no fetch strategies configured".to_string());
        Err(FetchError::Exhausted(reason))
    }
}
