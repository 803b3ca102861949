use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::payload;
use crate::modules::resolution::domain::{entities::SearchCandidate, repositories::KeyValueStore};
use crate::shared::{domain::value_objects::ProviderName, errors::AppResult};

/// Key under which every mapping is stored
pub const SELECTIONS_KEY: &str = "animaid_provider_mappings";

type Mappings = BTreeMap<String, BTreeMap<String, Value>>;

/// Remembers which search candidate the user picked for a (media, provider)
/// pair.
///
/// All mappings share one JSON blob, so writes go through a lock to keep
/// concurrent upserts from dropping each other's keys.
pub struct SelectionStore {
    storage: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SelectionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored pick for the pair; storage problems read as "no pick"
    pub fn get(&self, media_id: u64, provider: &ProviderName) -> Option<SearchCandidate> {
        let mappings = self.load();
        let raw = mappings
            .get(&media_id.to_string())?
            .get(provider.as_str())?;

        let candidate = payload::candidate_from(raw);
        if candidate.is_none() {
            log::warn!(
                "Discarding corrupt selection for media {} on {}: {}",
                media_id,
                provider,
                raw
            );
        }
        candidate
    }

    /// Upsert, last write wins
    pub fn set(
        &self,
        media_id: u64,
        provider: &ProviderName,
        candidate: &SearchCandidate,
    ) -> AppResult<()> {
        let _guard = self.lock();
        let mut mappings = self.load();
        mappings
            .entry(media_id.to_string())
            .or_default()
            .insert(provider.as_str().to_string(), serde_json::to_value(candidate)?);
        self.save(&mappings)?;

        log::info!(
            "Pinned \"{}\" for media {} on {}",
            candidate.title,
            media_id,
            provider
        );
        Ok(())
    }

    /// Delete one pick. Returns whether anything was stored.
    pub fn remove(&self, media_id: u64, provider: &ProviderName) -> AppResult<bool> {
        let _guard = self.lock();
        let mut mappings = self.load();
        let media_key = media_id.to_string();

        let Some(per_provider) = mappings.get_mut(&media_key) else {
            return Ok(false);
        };
        if per_provider.remove(provider.as_str()).is_none() {
            return Ok(false);
        }
        if per_provider.is_empty() {
            mappings.remove(&media_key);
        }
        self.save(&mappings)?;

        log::info!("Forgot selection for media {} on {}", media_id, provider);
        Ok(true)
    }

    pub fn clear(&self) -> AppResult<()> {
        let _guard = self.lock();
        self.storage.remove(SELECTIONS_KEY)?;
        log::info!("Cleared all provider selections");
        Ok(())
    }

    /// Every readable pick for one media, keyed by provider
    pub fn selections_for(&self, media_id: u64) -> BTreeMap<ProviderName, SearchCandidate> {
        self.load()
            .remove(&media_id.to_string())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(provider, raw)| {
                payload::candidate_from(&raw).map(|candidate| (ProviderName::new(provider), candidate))
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self) -> Mappings {
        let raw = match self.storage.get(SELECTIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Mappings::new(),
            Err(e) => {
                log::error!("Failed to read provider selections: {}", e);
                return Mappings::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(blob) => Self::parse_blob(blob),
            Err(e) => {
                log::error!("Provider selections are corrupt, resetting: {}", e);
                if let Err(e) = self.storage.remove(SELECTIONS_KEY) {
                    log::error!("Failed to reset provider selections: {}", e);
                }
                Mappings::new()
            }
        }
    }

    fn parse_blob(blob: Map<String, Value>) -> Mappings {
        blob.into_iter()
            .filter_map(|(media_key, per_provider)| match per_provider {
                Value::Object(per_provider) => {
                    Some((media_key, per_provider.into_iter().collect()))
                }
                other => {
                    log::warn!(
                        "Discarding corrupt selections for media {}: {}",
                        media_key,
                        other
                    );
                    None
                }
            })
            .collect()
    }

    fn save(&self, mappings: &Mappings) -> AppResult<()> {
        let raw = serde_json::to_string(mappings)?;
        self.storage.set(SELECTIONS_KEY, &raw).map_err(|e| {
            log::error!("Failed to persist provider selections: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::resolution::infrastructure::persistence::InMemoryKeyValueStore;
    use crate::shared::errors::AppError;

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::StorageError("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
    }

    fn store() -> (Arc<InMemoryKeyValueStore>, SelectionStore) {
        let backing = Arc::new(InMemoryKeyValueStore::new());
        let selections = SelectionStore::new(backing.clone());
        (backing, selections)
    }

    #[test]
    fn test_round_trip_and_overwrite() {
        let (_, selections) = store();
        let flv = ProviderName::new("flv");

        assert!(selections.get(1, &flv).is_none());

        selections.set(1, &flv, &SearchCandidate::new("Season 1", "/s1")).unwrap();
        selections.set(1, &flv, &SearchCandidate::new("Season 2", "/s2")).unwrap();

        let stored = selections.get(1, &flv).unwrap();
        assert_eq!(stored.locator, "/s2");
        assert!(selections.get(2, &flv).is_none());
        assert!(selections.get(1, &ProviderName::new("tioanime")).is_none());
    }

    #[test]
    fn test_blob_shape() {
        let (backing, selections) = store();
        selections
            .set(42, &ProviderName::new("flv"), &SearchCandidate::new("Demon Slayer", "/info/kny"))
            .unwrap();

        let raw = backing.get(SELECTIONS_KEY).unwrap().unwrap();
        let blob: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            blob,
            serde_json::json!({"42": {"flv": {"title": "Demon Slayer", "url": "/info/kny"}}})
        );
    }

    #[test]
    fn test_corrupt_blob_is_reset() {
        let (backing, selections) = store();
        backing.set(SELECTIONS_KEY, "{not json").unwrap();

        assert!(selections.get(1, &ProviderName::new("flv")).is_none());
        assert!(backing.get(SELECTIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_entry_keeps_siblings() {
        let (backing, selections) = store();
        backing
            .set(
                SELECTIONS_KEY,
                r#"{"1": {"flv": {"title": "no locator"}, "tioanime": {"title": "ok", "url": "/ok"}}, "2": 7}"#,
            )
            .unwrap();

        assert!(selections.get(1, &ProviderName::new("flv")).is_none());
        assert_eq!(
            selections.get(1, &ProviderName::new("tioanime")).unwrap().locator,
            "/ok"
        );
        assert_eq!(selections.selections_for(1).len(), 1);
        assert!(selections.selections_for(2).is_empty());
    }

    #[test]
    fn test_full_result_object_keeps_url_as_locator() {
        let (backing, selections) = store();
        backing
            .set(
                SELECTIONS_KEY,
                r#"{"5": {"tioanime": {"title": "Demon Slayer", "url": "/anime/tioanime/info/kny", "id": "kny", "type": "TV"}}}"#,
            )
            .unwrap();
        let tio = ProviderName::new("tioanime");

        let stored = selections.get(5, &tio).unwrap();
        assert_eq!(stored.title, "Demon Slayer");
        assert_eq!(stored.locator, "/anime/tioanime/info/kny");
        assert_eq!(selections.selections_for(5).get(&tio), Some(&stored));
    }

    #[test]
    fn test_remove_and_clear() {
        let (_, selections) = store();
        let flv = ProviderName::new("flv");
        let tio = ProviderName::new("tioanime");
        selections.set(1, &flv, &SearchCandidate::new("A", "/a")).unwrap();
        selections.set(1, &tio, &SearchCandidate::new("B", "/b")).unwrap();

        assert!(selections.remove(1, &flv).unwrap());
        assert!(!selections.remove(1, &flv).unwrap());
        assert!(selections.get(1, &tio).is_some());

        selections.clear().unwrap();
        assert!(selections.get(1, &tio).is_none());
    }

    #[test]
    fn test_write_failure_reaches_writer_only() {
        let selections = SelectionStore::new(Arc::new(ReadOnlyStore));
        let flv = ProviderName::new("flv");

        let result = selections.set(1, &flv, &SearchCandidate::new("A", "/a"));
        assert!(matches!(result, Err(AppError::StorageError(_))));
        assert!(selections.get(1, &flv).is_none());
    }

    #[test]
    fn test_concurrent_upserts_keep_every_key() {
        let (_, selections) = store();
        let selections = Arc::new(selections);

        let handles: Vec<_> = (0..16u64)
            .map(|media_id| {
                let selections = selections.clone();
                std::thread::spawn(move || {
                    selections
                        .set(media_id, &ProviderName::new("flv"), &SearchCandidate::new("x", "/x"))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for media_id in 0..16u64 {
            assert!(selections.get(media_id, &ProviderName::new("flv")).is_some());
        }
    }
}
