//! Retry behaviour for calls to the scraping proxy
//!
//! The proxy sits on a serverless host: cold starts and upstream scraper
//! hiccups show up as 5xx or dropped connections and usually succeed on a
//! second try, while 4xx answers are final.

use std::time::Duration;

use crate::shared::config::ResolverConfig;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (will be adjusted based on headers)
    pub base_delay: Duration,
    /// Maximum delay to wait (prevents excessive waits)
    pub max_delay: Duration,
    /// Whether to use exponential backoff
    pub exponential_backoff: bool,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Short policy for the scraping proxy. Every step is also bounded by the
    /// resolution step timeout, so waits stay small.
    pub fn scraper_proxy(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::scraper_proxy(config.max_retries)
    }

    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::scraper_proxy(0)
        }
    }

    /// Calculate delay for next retry attempt
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        // If server provided Retry-After header, respect it
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let delay = if self.exponential_backoff {
            let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
            let multiplier = self.backoff_multiplier.powi(exponent);
            let millis = self.base_delay.as_millis() as f64 * multiplier;
            if millis.is_finite() && millis < self.max_delay.as_millis() as f64 {
                Duration::from_millis(millis as u64)
            } else {
                self.max_delay
            }
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::scraper_proxy(1)
    }
}

/// Information extracted from HTTP 429 responses
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// How long to wait before next request (from Retry-After header)
    pub retry_after: Option<Duration>,
    /// When the rate limit resets (from X-RateLimit-Reset header)
    pub reset_time: Option<Duration>,
    /// Number of requests remaining (from X-RateLimit-Remaining header)
    pub remaining: Option<u32>,
}

impl RateLimitInfo {
    /// Parse rate limit information from HTTP response headers
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after = header_number::<u64>(headers, "retry-after").map(Duration::from_secs);

        let reset_time = header_number::<u64>(headers, "x-ratelimit-reset").map(|timestamp| {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            Duration::from_secs(timestamp.saturating_sub(now))
        });

        Self {
            retry_after,
            reset_time,
            remaining: header_number::<u32>(headers, "x-ratelimit-remaining"),
        }
    }

    /// Get the best delay recommendation from available information
    pub fn recommended_delay(&self) -> Option<Duration> {
        self.retry_after.or(self.reset_time)
    }
}

fn header_number<T: std::str::FromStr>(
    headers: &reqwest::header::HeaderMap,
    name: &str,
) -> Option<T> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<T>().ok())
}

/// Whether an HTTP status is worth another attempt
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 425 | 429 | 500..=599)
}

/// Determines if a transport error is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    match error.status() {
        Some(status) => is_retryable_status(status),
        // Network errors are potentially retryable
        None => error.is_timeout() || error.is_connect(),
    }
}
