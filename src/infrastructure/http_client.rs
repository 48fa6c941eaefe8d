//! HTTP fetch collaborator
//!
//! A thin wrapper over `reqwest` used by every strategy: timeout, user
//! agent, redirect policy, a polite inter-request delay, and retry with
//! exponential backoff for transient failures. Retrying lives here, in the
//! collaborator; the scenario executor itself never retries.

use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{FetchError, FetchResult};
use crate::infrastructure::config::FetchConfig;

/// Configuration for HTTP client behavior.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum attempts per request (1 = no retry)
    pub max_retries: u32,
    /// Delay before each request in milliseconds
    pub request_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    pub fn from_fetch_config(fetch: &FetchConfig) -> Self {
        Self {
            timeout_seconds: fetch.request_timeout_seconds,
            max_retries: fetch.max_retries.max(1),
            request_delay_ms: fetch.request_delay_ms,
            user_agent: fetch.user_agent.clone(),
            follow_redirects: fetch.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_fetch_config(&FetchConfig::default())
    }
}

/// HTTP client with retry and polite pacing built in.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn from_fetch_config(fetch: &FetchConfig) -> Result<Self> {
        Self::with_config(HttpClientConfig::from_fetch_config(fetch))
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Fetch a page body as a string, retrying transient failures.
    pub async fn fetch_html_string(&self, url: &str) -> FetchResult<String> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            if self.config.request_delay_ms > 0 {
                sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            }

            debug!("HTTP GET (attempt {}/{}): {}", attempt, self.config.max_retries, url);
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if !e.is_transient() || attempt == self.config.max_retries {
                        return Err(e);
                    }
                    warn!("Attempt {} failed for {}: {}", attempt, url, e);
                    let backoff = 2_u64.pow(attempt - 1);
                    sleep(Duration::from_secs(backoff)).await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::network(url, "no attempts were made")))
    }

    async fn fetch_once(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, &e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(status.as_u16(), url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, &e.to_string()))?;

        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}
