mod provider_status;
mod resolution_unit;

pub use crate::shared::domain::value_objects::{ContentKind, ProviderName};
pub use provider_status::{ProviderPhase, ProviderStatus, ProviderUpdate};
pub use resolution_unit::{first_integer_token, ResolutionUnit};
