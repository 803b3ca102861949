use std::sync::Arc;
use tokio::sync::broadcast;

use super::diagnostics::DiagnosticsReport;
use crate::modules::resolution::domain::{
    entities::{MediaIdentity, SearchCandidate, TraceEntry},
    repositories::{ContentProviderGateway, KeyValueStore},
    services::{ProviderOrchestrator, ResolutionEngine, ResolutionRun, SelectionStore},
    value_objects::{ProviderStatus, ProviderUpdate, ResolutionUnit},
};
use crate::modules::resolution::infrastructure::{JsonFileKeyValueStore, ScraperProxyAdapter};
use crate::shared::{
    config::ResolverConfig,
    domain::value_objects::ProviderName,
    errors::AppResult,
};

/// Entry point for hosts: resolves playable/readable content for a media
/// unit across the configured providers.
///
/// Key responsibilities:
/// - Pick the provider set matching the media's content kind
/// - Run and observe per-provider resolutions
/// - Route user re-selections and playback failures to the orchestrator
#[derive(Clone)]
pub struct ContentResolutionService {
    config: Arc<ResolverConfig>,
    orchestrator: Arc<ProviderOrchestrator>,
    selections: Arc<SelectionStore>,
}

impl ContentResolutionService {
    /// Wire the production stack: scraping proxy over HTTP and a JSON file
    /// for selections
    pub fn from_config(config: ResolverConfig) -> AppResult<Self> {
        let gateway = Arc::new(ScraperProxyAdapter::new(&config)?);
        let storage = Arc::new(JsonFileKeyValueStore::open(&config.selection_store_path));
        Ok(Self::new(config, gateway, storage))
    }

    pub fn new(
        config: ResolverConfig,
        gateway: Arc<dyn ContentProviderGateway>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let engine = Arc::new(ResolutionEngine::new(gateway, config.request_timeout));
        let selections = Arc::new(SelectionStore::new(storage));
        let orchestrator = Arc::new(ProviderOrchestrator::new(engine, selections.clone()));

        Self {
            config: Arc::new(config),
            orchestrator,
            selections,
        }
    }

    /// Resolve `unit` of `media` on every provider of its kind
    pub fn resolve_all(&self, media: MediaIdentity, unit: u32) -> AppResult<ResolutionRun> {
        let unit = ResolutionUnit::new(unit)?;
        let providers = self.config.providers_for(media.kind).to_vec();
        Ok(self.orchestrator.resolve_all(media, unit, &providers))
    }

    pub async fn reselect(
        &self,
        provider: &ProviderName,
        candidate: SearchCandidate,
    ) -> AppResult<ProviderStatus> {
        self.orchestrator.reselect(provider, candidate).await
    }

    pub async fn search(
        &self,
        provider: &ProviderName,
        query: &str,
    ) -> AppResult<Vec<SearchCandidate>> {
        self.orchestrator.search(provider, query).await
    }

    pub fn report_playback_failure(
        &self,
        provider: &ProviderName,
        message: &str,
    ) -> AppResult<ProviderStatus> {
        self.orchestrator.report_playback_failure(provider, message)
    }

    pub fn forget_selection(&self, provider: &ProviderName) -> AppResult<bool> {
        self.orchestrator.forget_selection(provider)
    }

    /// Drop every stored selection
    pub fn clear_selections(&self) -> AppResult<()> {
        self.selections.clear()
    }

    pub fn status(&self, provider: &ProviderName) -> Option<ProviderStatus> {
        self.orchestrator.status(provider)
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.orchestrator.statuses()
    }

    pub fn trace(&self, provider: &ProviderName) -> Option<Vec<TraceEntry>> {
        self.orchestrator.trace(provider)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProviderUpdate> {
        self.orchestrator.subscribe()
    }

    /// Full-text log of the current statuses
    pub fn diagnostics_report(&self) -> String {
        DiagnosticsReport::render(&self.statuses())
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
