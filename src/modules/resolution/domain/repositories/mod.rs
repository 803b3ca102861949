pub mod key_value_store;
pub mod provider_gateway;

pub use key_value_store::KeyValueStore;
pub use provider_gateway::{ContentProviderGateway, ProviderRequest, UnitLocator};

#[cfg(test)]
pub use provider_gateway::MockContentProviderGateway;
