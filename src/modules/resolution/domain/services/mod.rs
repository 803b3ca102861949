pub mod payload;
pub mod provider_orchestrator;
pub mod resolution_engine;
pub mod selection_store;
pub mod title_sanitizer;

pub use provider_orchestrator::{ProviderOrchestrator, ResolutionRun, ResolutionSession};
pub use resolution_engine::ResolutionEngine;
pub use selection_store::{SelectionStore, SELECTIONS_KEY};
pub use title_sanitizer::{sanitize, TitleSanitizer, TitleTransformation};
