pub mod modules;
pub mod shared;

pub use modules::resolution::{
    application::{ContentResolutionService, DiagnosticsReport},
    domain::{
        entities::{
            ContentKind, MediaIdentity, MediaTitle, PageImage, ResolvedContent, SearchCandidate,
            TraceEntry, VideoSource,
        },
        errors::ResolutionError,
        repositories::{ContentProviderGateway, KeyValueStore, ProviderRequest, UnitLocator},
        services::{
            sanitize, ProviderOrchestrator, ResolutionEngine, ResolutionRun, SelectionStore,
        },
        value_objects::{ProviderName, ProviderPhase, ProviderStatus, ProviderUpdate, ResolutionUnit},
    },
    infrastructure::{InMemoryKeyValueStore, JsonFileKeyValueStore, ScraperProxyAdapter},
};
pub use shared::config::ResolverConfig;
pub use shared::errors::{AppError, AppResult};
pub use shared::utils::logger::init_logger;
