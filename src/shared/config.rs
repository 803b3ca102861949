//! Runtime configuration for the resolution core
//!
//! Defaults mirror the hosted scraping proxy the client talks to; every value
//! can be overridden through environment variables (optionally from `.env`).

use crate::shared::domain::value_objects::{ContentKind, ProviderName};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://multi-api-animaid.vercel.app";
pub const DEFAULT_ANIME_PROVIDERS: &[&str] = &["tioanime", "flv"];
pub const DEFAULT_MANGA_PROVIDERS: &[&str] = &["comick", "nhentai", "inmanga"];

const ENV_API_URL: &str = "ANIMAID_API_URL";
const ENV_TIMEOUT: &str = "ANIMAID_REQUEST_TIMEOUT_SECS";
const ENV_ANIME_PROVIDERS: &str = "ANIMAID_ANIME_PROVIDERS";
const ENV_MANGA_PROVIDERS: &str = "ANIMAID_MANGA_PROVIDERS";
const ENV_SELECTION_STORE: &str = "ANIMAID_SELECTION_STORE";
const ENV_REQUESTS_PER_SECOND: &str = "ANIMAID_REQUESTS_PER_SECOND";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the scraping proxy
    pub api_base_url: String,
    /// Upper bound for every single network step
    pub request_timeout: Duration,
    pub anime_providers: Vec<ProviderName>,
    pub manga_providers: Vec<ProviderName>,
    /// JSON file backing the selection store
    pub selection_store_path: PathBuf,
    pub requests_per_second: f64,
    pub burst_size: u32,
    pub max_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(20),
            anime_providers: DEFAULT_ANIME_PROVIDERS
                .iter()
                .map(|name| ProviderName::new(name))
                .collect(),
            manga_providers: DEFAULT_MANGA_PROVIDERS
                .iter()
                .map(|name| ProviderName::new(name))
                .collect(),
            selection_store_path: default_store_path(),
            requests_per_second: 5.0,
            burst_size: 10,
            max_retries: 1,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from the process environment (and `.env` if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; unset or invalid
    /// values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "Ignoring invalid {}='{}', keeping {:?}",
                    ENV_TIMEOUT,
                    raw,
                    config.request_timeout
                ),
            }
        }

        if let Some(raw) = lookup(ENV_ANIME_PROVIDERS) {
            let providers = ProviderName::parse_list(&raw);
            if providers.is_empty() {
                log::warn!("{} is empty, keeping default anime providers", ENV_ANIME_PROVIDERS);
            } else {
                config.anime_providers = providers;
            }
        }

        if let Some(raw) = lookup(ENV_MANGA_PROVIDERS) {
            let providers = ProviderName::parse_list(&raw);
            if providers.is_empty() {
                log::warn!("{} is empty, keeping default manga providers", ENV_MANGA_PROVIDERS);
            } else {
                config.manga_providers = providers;
            }
        }

        if let Some(path) = lookup(ENV_SELECTION_STORE).filter(|v| !v.trim().is_empty()) {
            config.selection_store_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(ENV_REQUESTS_PER_SECOND) {
            match raw.trim().parse::<f64>() {
                Ok(rate) if request_period(rate).is_some() => config.requests_per_second = rate,
                _ => log::warn!("Ignoring invalid {}='{}'", ENV_REQUESTS_PER_SECOND, raw),
            }
        }

        config
    }

    /// Providers configured for a content kind
    pub fn providers_for(&self, kind: ContentKind) -> &[ProviderName] {
        match kind {
            ContentKind::Video => &self.anime_providers,
            ContentKind::Reading => &self.manga_providers,
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("animaid")
        .join("provider_mappings.json")
}

/// Interval between requests at `requests_per_second`; `None` when the rate
/// is not positive or its period does not fit a `Duration`
pub fn request_period(requests_per_second: f64) -> Option<Duration> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / requests_per_second).ok()
}
