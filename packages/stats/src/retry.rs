//! HTTP retry helpers for transient errors.
//!
//! Statistics requests go through [`send_text`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every request gets
//! automatic retry with exponential backoff for timeouts, connection
//! resets, server errors and rate limiting.
//!
//! ```ignore
//! let body = retry::send_text(&RetryPolicy::default(), || client.get(&url)).await?;
//! ```

use std::time::Duration;

use crate::StatsError;

/// How many times, and how patiently, to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first try.
    pub max_retries: u32,
    /// Delay before the first retry. Doubles on every further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries at 500ms, 1s and 2s. A refresh is user-initiated, so
    /// the worst case stays under a few seconds plus request timeouts.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Sends a request and returns the response body as a `String`.
///
/// `build_request` is called on each attempt to construct a fresh
/// [`reqwest::RequestBuilder`], since builders are consumed by `.send()`.
///
/// Retries connection errors, timeouts, HTTP 429 and HTTP 5xx. Does
/// **not** retry other 4xx responses; these are permanent.
///
/// # Errors
///
/// Returns [`StatsError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(policy: &RetryPolicy, build_request: F) -> Result<String, StatsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(policy, &build_request).await?;
    Ok(response.text().await?)
}

/// Core retry loop behind [`send_text`].
#[allow(clippy::future_not_send)]
async fn send_inner<F>(policy: &RetryPolicy, build_request: &F) -> Result<reqwest::Response, StatsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(StatsError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if is_retryable_status(status) && attempt < max_retries {
                    log::warn!("  HTTP {status} from {}", response.url());
                    attempt += 1;
                    continue;
                }

                if !status.is_success() {
                    return Err(StatsError::Status {
                        url: response.url().to_string(),
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Returns `true` for statuses worth retrying: 429 and 5xx.
#[must_use]
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
