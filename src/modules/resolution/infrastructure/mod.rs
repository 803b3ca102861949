pub mod adapters;
pub mod http_client;
pub mod persistence;

pub use adapters::ScraperProxyAdapter;
pub use http_client::{RateLimitClient, RetryPolicy};
pub use persistence::{InMemoryKeyValueStore, JsonFileKeyValueStore};
