//! HTTP client with rate limiting and retry logic
//!
//! All provider traffic goes through one proxy host, so a single token bucket
//! is shared by every provider adapter using the client.

use super::retry_policy::{is_retryable_error, is_retryable_status, RateLimitInfo, RetryPolicy};
use crate::shared::{
    config::{request_period, ResolverConfig},
    errors::{AppError, AppResult},
    utils::logger::LogContext,
};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::{Client, Response, StatusCode};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const USER_AGENT: &str = concat!("animaid/", env!("CARGO_PKG_VERSION"));
const ERROR_SNIPPET_CHARS: usize = 200;

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

/// Outcome of one HTTP exchange, before retry decisions
enum Attempt {
    Done(AppResult<String>),
    Retry { reason: String, delay: Duration },
}

/// HTTP client that handles rate limiting and retries
pub struct RateLimitClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
    name: String,
}

impl RateLimitClient {
    /// Client for the scraping proxy described by `config`
    pub fn for_scraper_proxy(config: &ResolverConfig) -> AppResult<Self> {
        Self::new(
            "ScraperProxy",
            RetryPolicy::from_config(config),
            config.requests_per_second,
            config.burst_size,
            config.request_timeout,
            USER_AGENT,
        )
    }

    pub fn new(
        name: &str,
        retry_policy: RetryPolicy,
        requests_per_second: f64,
        burst_size: u32,
        timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rate_limiter: Self::create_rate_limiter(requests_per_second, burst_size)?,
            retry_policy,
            name: name.to_string(),
        })
    }

    /// Create a rate limiter with specified requests per second and burst capacity
    fn create_rate_limiter(requests_per_second: f64, burst_size: u32) -> AppResult<DirectRateLimiter> {
        let period = request_period(requests_per_second).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Request rate must be positive with a representable period, got {}",
                requests_per_second
            ))
        })?;
        let burst = NonZeroU32::new(burst_size.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .ok_or_else(|| AppError::InvalidInput("Request rate is too high".to_string()))?
            .allow_burst(burst);

        Ok(GovernorRateLimiter::direct(quota))
    }

    /// GET `url` and decode the JSON body
    pub async fn get<T>(&self, url: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.name,
                e,
                snippet(&body)
            ))
        })
    }

    /// GET `url` with rate limiting and retries, returning the raw body
    pub async fn get_text(&self, url: &str) -> AppResult<String> {
        let max_attempts = self.retry_policy.max_retries + 1;

        for attempt in 0..max_attempts {
            self.rate_limiter.until_ready().await;

            let started = Instant::now();
            let result = self.client.get(url).send().await;
            let elapsed = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(response) => {
                    LogContext::api_call(&self.name, url, response.status().as_str(), Some(elapsed));
                    self.handle_response(response, attempt).await
                }
                Err(e) => {
                    LogContext::api_call(&self.name, url, "transport error", Some(elapsed));
                    if is_retryable_error(&e) && attempt < self.retry_policy.max_retries {
                        Attempt::Retry {
                            reason: e.to_string(),
                            delay: self.retry_policy.calculate_delay(attempt, None),
                        }
                    } else {
                        Attempt::Done(Err(AppError::from(e)))
                    }
                }
            };

            match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retry { reason, delay } => {
                    log::warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {:?}",
                        self.name,
                        attempt + 1,
                        max_attempts,
                        reason,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }

        Err(AppError::ExternalServiceError(format!(
            "{} request failed after {} attempts",
            self.name, max_attempts
        )))
    }

    async fn handle_response(&self, response: Response, attempt: u32) -> Attempt {
        let status = response.status();
        let can_retry = attempt < self.retry_policy.max_retries;

        if status.is_success() {
            return Attempt::Done(response.text().await.map_err(|e| {
                AppError::SerializationError(format!("Failed to read {} response: {}", self.name, e))
            }));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let info = RateLimitInfo::from_headers(response.headers());
            if can_retry {
                return Attempt::Retry {
                    reason: "rate limited".to_string(),
                    delay: self.calculate_retry_delay(attempt, &info),
                };
            }
            return Attempt::Done(Err(AppError::RateLimitError(format!(
                "{} rate limit exceeded",
                self.name
            ))));
        }

        if is_retryable_status(status) && can_retry {
            return Attempt::Retry {
                reason: format!("HTTP {}", status),
                delay: self.retry_policy.calculate_delay(attempt, None),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("{} returned HTTP {}: {}", self.name, status, snippet(&body));
        Attempt::Done(Err(if status == StatusCode::NOT_FOUND {
            AppError::NotFound(message)
        } else {
            AppError::ApiError(message)
        }))
    }

    /// Calculate delay for retry based on rate limit info and policy
    fn calculate_retry_delay(&self, attempt: u32, rate_limit_info: &RateLimitInfo) -> Duration {
        self.retry_policy
            .calculate_delay(attempt, rate_limit_info.recommended_delay())
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > ERROR_SNIPPET_CHARS {
        let cut: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}
