use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::modules::resolution::domain::repositories::{
    ContentProviderGateway, ProviderRequest, UnitLocator,
};
use crate::modules::resolution::infrastructure::http_client::RateLimitClient;
use crate::shared::{
    config::ResolverConfig,
    domain::value_objects::{ContentKind, ProviderName},
    errors::AppResult,
};

/// Gateway to the multi-provider scraping proxy.
///
/// Routes are `/{anime|manga}/{provider}/{filter|info|watch|read}`; info and
/// episode locators returned by the proxy may already be paths or absolute
/// URLs and are followed as given.
pub struct ScraperProxyAdapter {
    client: Arc<RateLimitClient>,
    base_url: String,
}

impl ScraperProxyAdapter {
    pub fn new(config: &ResolverConfig) -> AppResult<Self> {
        let client = RateLimitClient::for_scraper_proxy(config)?;
        Ok(Self::with_client(Arc::new(client), &config.api_base_url))
    }

    /// Create adapter with custom client (for testing)
    pub fn with_client(client: Arc<RateLimitClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn follow(&self, locator: &str) -> Option<String> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            Some(locator.to_string())
        } else if locator.starts_with('/') {
            Some(format!("{}{}", self.base_url, locator))
        } else {
            None
        }
    }

    fn route(&self, kind: ContentKind, provider: &ProviderName, action: &str, target: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            kind.route_segment(),
            provider,
            action,
            target
        )
    }
}

#[async_trait]
impl ContentProviderGateway for ScraperProxyAdapter {
    fn locate(&self, provider: &ProviderName, kind: ContentKind, request: &ProviderRequest) -> String {
        match request {
            ProviderRequest::Search { query } => format!(
                "{}/{}/{}/filter?title={}",
                self.base_url,
                kind.route_segment(),
                provider,
                urlencoding::encode(query)
            ),
            ProviderRequest::Info { locator } => self
                .follow(locator)
                .unwrap_or_else(|| self.route(kind, provider, "info", locator)),
            ProviderRequest::Extract { unit } => match unit {
                UnitLocator::Path(path) => self
                    .follow(path)
                    .unwrap_or_else(|| format!("{}/{}", self.base_url, path)),
                UnitLocator::Id(id) => match kind {
                    ContentKind::Video => self.route(kind, provider, "watch", id),
                    ContentKind::Reading => self.route(kind, provider, "read", id),
                },
            },
        }
    }

    async fn fetch(
        &self,
        provider: &ProviderName,
        kind: ContentKind,
        request: &ProviderRequest,
    ) -> AppResult<Value> {
        let url = self.locate(provider, kind, request);
        log::debug!("ScraperProxy: {} {} -> {}", provider, kind, url);
        self.client.get::<Value>(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ScraperProxyAdapter {
        let config = ResolverConfig {
            api_base_url: "https://proxy.test/".to_string(),
            ..ResolverConfig::default()
        };
        ScraperProxyAdapter::new(&config).unwrap()
    }

    #[test]
    fn test_search_url_is_encoded() {
        let url = adapter().locate(
            &ProviderName::new("flv"),
            ContentKind::Video,
            &ProviderRequest::Search {
                query: "hunter x hunter".into(),
            },
        );
        assert_eq!(url, "https://proxy.test/anime/flv/filter?title=hunter%20x%20hunter");
    }

    #[test]
    fn test_info_locators() {
        let adapter = adapter();
        let comick = ProviderName::new("comick");
        let info = |locator: &str| {
            adapter.locate(
                &comick,
                ContentKind::Reading,
                &ProviderRequest::Info {
                    locator: locator.into(),
                },
            )
        };

        assert_eq!(info("/manga/comick/info/berserk"), "https://proxy.test/manga/comick/info/berserk");
        assert_eq!(info("https://elsewhere.test/info/1"), "https://elsewhere.test/info/1");
        assert_eq!(info("berserk"), "https://proxy.test/manga/comick/info/berserk");
    }

    #[test]
    fn test_extract_locators() {
        let adapter = adapter();
        let extract = |kind, unit| {
            adapter.locate(&ProviderName::new("p"), kind, &ProviderRequest::Extract { unit })
        };

        assert_eq!(
            extract(ContentKind::Video, UnitLocator::Path("/anime/p/watch/x-1".into())),
            "https://proxy.test/anime/p/watch/x-1"
        );
        assert_eq!(
            extract(ContentKind::Video, UnitLocator::Id("x-1".into())),
            "https://proxy.test/anime/p/watch/x-1"
        );
        assert_eq!(
            extract(ContentKind::Reading, UnitLocator::Id("991".into())),
            "https://proxy.test/manga/p/read/991"
        );
    }
}
