//! Content fetching from URLs, files, and stdin.
//!
//! [`Fetcher`] owns one HTTP client and applies the same rate limit and retry
//! policy to every [`PageSource`]. Local files and standard input need no
//! network and are always available.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::{EncyclodiffError, Result};

#[cfg(feature = "fetch")]
use {
    crate::page::PageRecord,
    crate::source::PageSource,
    reqwest::{Client, StatusCode},
    std::time::Instant,
    tokio::sync::Mutex,
    url::Url,
};

/// HTTP client configuration for fetching encyclopedia pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Attempts per URL before giving up.
    pub max_retries: u32,
    /// Minimum spacing between two requests made by the same fetcher.
    pub rate_limit_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Research Project) Encyclodiff/1.0".to_string(),
            max_retries: 3,
            rate_limit_delay: Duration::from_secs(2),
        }
    }
}

/// Rate-limited HTTP fetcher with exponential backoff.
///
/// # Example
///
/// ```rust,no_run
/// use encyclodiff_core::fetch::{FetchConfig, Fetcher};
/// use encyclodiff_core::source::WikipediaSource;
///
/// # async fn run() -> encyclodiff_core::Result<()> {
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// let page = fetcher.fetch_page(&WikipediaSource::new(), "Ada Lovelace").await?;
/// println!("{} words", page.word_count);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "fetch")]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    last_request: Mutex<Option<Instant>>,
}

#[cfg(feature = "fetch")]
impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(EncyclodiffError::HttpError)?;

        Ok(Self { client, config, last_request: Mutex::new(None) })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a page body.
    ///
    /// Network failures, timeouts, `429` and `5xx` responses are retried with
    /// a `2^attempt` second backoff. Any other non-success status fails
    /// immediately with [`EncyclodiffError::HttpStatus`].
    pub async fn fetch_url(&self, url: &str) -> Result<String> {
        let parsed_url = Url::parse(url).map_err(|e| EncyclodiffError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(EncyclodiffError::InvalidUrl(format!("unsupported scheme in {url}")));
        }

        let attempts = self.config.max_retries.max(1);
        self.wait_for_rate_limit().await;

        for attempt in 0..attempts {
            match self.attempt(&parsed_url).await {
                Ok(body) => return Ok(body),
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retry(err)) => {
                    tracing::warn!(url, attempt = attempt + 1, attempts, error = %err, "fetch attempt failed");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(retry_backoff(attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(url, attempts, "giving up on URL");
        Err(EncyclodiffError::RetriesExhausted { url: url.to_string(), attempts })
    }

    /// Resolves a topic against a source, fetches it and parses the page.
    pub async fn fetch_page(&self, source: &dyn PageSource, topic: &str) -> Result<PageRecord> {
        let url = source.resolve_url(topic)?;
        tracing::debug!(source = source.name(), topic, %url, "fetching page");

        let html = self.fetch_url(url.as_str()).await?;
        Ok(source.parse(&html, url.as_str()))
    }

    async fn attempt(&self, url: &Url) -> std::result::Result<String, Attempt> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| Attempt::Retry(self.classify(e)))?;

        let status = response.status();
        if !status.is_success() {
            let err = EncyclodiffError::HttpStatus { status: status.as_u16(), url: url.to_string() };
            return Err(if should_retry(status) { Attempt::Retry(err) } else { Attempt::Fatal(err) });
        }

        response.text().await.map_err(|e| Attempt::Retry(self.classify(e)))
    }

    fn classify(&self, err: reqwest::Error) -> EncyclodiffError {
        if err.is_timeout() {
            EncyclodiffError::Timeout { timeout: self.config.timeout }
        } else {
            EncyclodiffError::HttpError(err)
        }
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.rate_limit_delay {
                tokio::time::sleep(self.config.rate_limit_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(feature = "fetch")]
enum Attempt {
    Retry(EncyclodiffError),
    Fatal(EncyclodiffError),
}

#[cfg(feature = "fetch")]
fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt + 1`: 1s, 2s, 4s, ...
pub fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt.min(10)))
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        Err(EncyclodiffError::FileNotFound(path.to_path_buf()))
    } else {
        fs::read_to_string(path).map_err(EncyclodiffError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}
