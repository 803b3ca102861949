pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-exports for easy access
pub use entities::*;
pub use errors::ResolutionError;
pub use value_objects::{ContentKind, ProviderName, ProviderPhase, ProviderStatus, ResolutionUnit};
