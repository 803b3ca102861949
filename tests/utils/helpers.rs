/// Test helper functions and service builders
use super::factories;
use super::gateway::{Reply, ScriptedGateway};
use animaid_lib::{
    ContentResolutionService, InMemoryKeyValueStore, ProviderName, ProviderStatus, ResolverConfig,
};
use std::sync::Arc;
use std::time::Duration;

pub struct TestServices {
    pub service: ContentResolutionService,
    pub gateway: Arc<ScriptedGateway>,
    pub storage: Arc<InMemoryKeyValueStore>,
}

pub fn test_config(anime: &[&str], manga: &[&str], step_timeout: Duration) -> ResolverConfig {
    ResolverConfig {
        request_timeout: step_timeout,
        anime_providers: anime.iter().map(ProviderName::new).collect(),
        manga_providers: manga.iter().map(ProviderName::new).collect(),
        max_retries: 0,
        ..ResolverConfig::default()
    }
}

/// Build a service over a scripted gateway and in-memory selections
pub fn build_test_services(config: ResolverConfig) -> TestServices {
    let gateway = Arc::new(ScriptedGateway::new());
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let service = ContentResolutionService::new(config, gateway.clone(), storage.clone());

    TestServices {
        service,
        gateway,
        storage,
    }
}

/// Script a fully working video provider: search hit, `episode_count`
/// episodes, sources for each
pub fn script_video_provider(
    gateway: &ScriptedGateway,
    provider: &str,
    query: &str,
    slug: &str,
    episode_count: u32,
) {
    let info = format!("/anime/{}/info/{}", provider, slug);
    gateway.route(
        ScriptedGateway::search_key(provider, query),
        Reply::Json(factories::search_results(&[(slug, info.as_str())])),
    );
    gateway.route(
        ScriptedGateway::info_key(provider, &info),
        Reply::Json(factories::episodes(slug, episode_count)),
    );
    for n in 1..=episode_count {
        let id = format!("{}-{}", slug, n);
        gateway.route(
            ScriptedGateway::extract_key(provider, &id),
            Reply::Json(factories::sources(&id)),
        );
    }
}

pub fn provider(name: &str) -> ProviderName {
    ProviderName::new(name)
}

pub fn source_urls(status: &ProviderStatus) -> Vec<String> {
    status
        .data
        .as_ref()
        .and_then(|data| data.sources())
        .map(|sources| sources.iter().map(|source| source.url.clone()).collect())
        .unwrap_or_default()
}
