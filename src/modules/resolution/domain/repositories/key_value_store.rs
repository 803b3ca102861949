use crate::shared::errors::AppResult;

/// Durable, synchronous string key-value medium scoped to the local client.
/// Abstracts the storage substrate so the selection store can run against a
/// file on disk or an in-memory map.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove(&self, key: &str) -> AppResult<()>;
}
