mod provider_name;

pub use provider_name::{ContentKind, ProviderName};
