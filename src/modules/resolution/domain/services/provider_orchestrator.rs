use dashmap::DashMap;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};

use super::{resolution_engine::ResolutionEngine, selection_store::SelectionStore};
use crate::modules::resolution::domain::{
    entities::{MediaIdentity, SearchCandidate, TraceEntry, TraceLog},
    errors::ResolutionError,
    value_objects::{ProviderPhase, ProviderStatus, ProviderUpdate, ResolutionUnit},
};
use crate::shared::{
    domain::value_objects::ProviderName,
    errors::{AppError, AppResult},
};

const UPDATE_BUFFER: usize = 64;
const PLAYBACK_STEP: &str = "Playback error";

/// Media, unit and providers of the latest `resolve_all`
#[derive(Debug, Clone)]
pub struct ResolutionSession {
    pub generation: u64,
    pub media: MediaIdentity,
    pub unit: ResolutionUnit,
    pub providers: Vec<ProviderName>,
}

/// Fans a resolution out to every provider and keeps one status per provider.
///
/// Each status slot carries the token of the attempt that owns it. A result
/// is committed only while its token still matches, so results of superseded
/// runs or re-selections are dropped without cancelling anything.
pub struct ProviderOrchestrator {
    engine: Arc<ResolutionEngine>,
    selections: Arc<SelectionStore>,
    statuses: Arc<DashMap<ProviderName, ProviderStatus>>,
    session: RwLock<Option<ResolutionSession>>,
    generation: AtomicU64,
    attempts: AtomicU64,
    updates: broadcast::Sender<ProviderUpdate>,
}

impl ProviderOrchestrator {
    pub fn new(engine: Arc<ResolutionEngine>, selections: Arc<SelectionStore>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            engine,
            selections,
            statuses: Arc::new(DashMap::new()),
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            updates,
        }
    }

    /// Start resolving `unit` of `media` on every provider.
    ///
    /// Prior statuses are dropped and each provider starts out `Loading`.
    /// Must be called inside a tokio runtime.
    pub fn resolve_all(
        &self,
        media: MediaIdentity,
        unit: ResolutionUnit,
        providers: &[ProviderName],
    ) -> ResolutionRun {
        let mut session = self.write_session();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut unique: Vec<ProviderName> = Vec::with_capacity(providers.len());
        for provider in providers {
            if !unique.contains(provider) {
                unique.push(provider.clone());
            }
        }

        log::info!(
            "Resolving {} {} of media {} on {} providers (generation {})",
            media.kind.unit_label(),
            unit,
            media.id,
            unique.len(),
            generation
        );

        self.statuses.clear();
        let (sender, receiver) = mpsc::channel(unique.len().max(1));

        for provider in &unique {
            let attempt = self.next_attempt();
            self.statuses
                .insert(provider.clone(), ProviderStatus::loading(provider.clone(), attempt));

            let engine = self.engine.clone();
            let selections = self.selections.clone();
            let statuses = self.statuses.clone();
            let updates = self.updates.clone();
            let sender = sender.clone();
            let provider = provider.clone();
            let media = media.clone();

            tokio::spawn(async move {
                let pinned = selections.get(media.id, &provider);
                let outcome = engine.resolve(&provider, &media, unit, pinned, None).await;
                let status = ProviderStatus::from_outcome(provider.clone(), attempt, outcome);

                if !commit(&statuses, status.clone()) {
                    log::debug!(
                        "Discarding stale result of {} (generation {}, attempt {})",
                        provider,
                        generation,
                        attempt
                    );
                    return;
                }

                let update = ProviderUpdate { generation, status };
                let _ = updates.send(update.clone());
                let _ = sender.send(update).await;
            });
        }

        *session = Some(ResolutionSession {
            generation,
            media,
            unit,
            providers: unique.clone(),
        });

        ResolutionRun {
            generation,
            providers: unique,
            receiver,
        }
    }

    /// Pin `candidate` for `provider` and re-resolve that provider only
    pub async fn reselect(
        &self,
        provider: &ProviderName,
        candidate: SearchCandidate,
    ) -> AppResult<ProviderStatus> {
        let (media, unit, generation, attempt) = {
            let session = self.read_session();
            let session = Self::require_provider(&session, provider)?;
            let attempt = self.next_attempt();
            self.statuses
                .insert(provider.clone(), ProviderStatus::loading(provider.clone(), attempt));
            (session.media.clone(), session.unit, session.generation, attempt)
        };

        if let Err(e) = self.selections.set(media.id, provider, &candidate) {
            log::warn!(
                "Selection for {} not persisted, resolving anyway: {}",
                provider,
                e
            );
        }

        let outcome = self
            .engine
            .resolve(provider, &media, unit, Some(candidate), None)
            .await;
        let status = ProviderStatus::from_outcome(provider.clone(), attempt, outcome);

        if !commit(&self.statuses, status.clone()) {
            return Err(AppError::Superseded(format!(
                "Re-selection on {} was replaced by a newer resolution",
                provider
            )));
        }

        let _ = self.updates.send(ProviderUpdate {
            generation,
            status: status.clone(),
        });
        Ok(status)
    }

    /// Candidates for the picker, searched with a user-edited query
    pub async fn search(
        &self,
        provider: &ProviderName,
        query: &str,
    ) -> AppResult<Vec<SearchCandidate>> {
        let kind = {
            let session = self.read_session();
            Self::require_provider(&session, provider)?.media.kind
        };
        self.engine.search(provider, kind, query).await
    }

    /// Drop the stored pick for `provider` on the active media
    pub fn forget_selection(&self, provider: &ProviderName) -> AppResult<bool> {
        let media_id = {
            let session = self.read_session();
            Self::require_provider(&session, provider)?.media.id
        };
        self.selections.remove(media_id, provider)
    }

    /// Mark a resolved provider as failed because its content did not play.
    ///
    /// Resolved data is kept so the host can still show what was tried.
    pub fn report_playback_failure(
        &self,
        provider: &ProviderName,
        message: &str,
    ) -> AppResult<ProviderStatus> {
        let mut slot = self
            .statuses
            .get_mut(provider)
            .ok_or_else(|| AppError::NotFound(format!("No status for provider {}", provider)))?;

        let already_reported = slot.phase == ProviderPhase::Error
            && slot.trace.last().and_then(|entry| entry.error.as_deref()) == Some(message);
        if already_reported {
            return Ok(slot.clone());
        }
        if slot.phase != ProviderPhase::Success {
            return Err(AppError::InvalidInput(format!(
                "Provider {} has nothing playing",
                provider
            )));
        }

        let mut trace = TraceLog::from_entries(slot.trace.clone());
        trace.begin(PLAYBACK_STEP, None);
        trace.fail(message);

        let status = ProviderStatus {
            phase: ProviderPhase::Error,
            trace: trace.into_entries(),
            failure: Some(ResolutionError::Playback(message.to_string())),
            updated_at: chrono::Utc::now(),
            ..slot.clone()
        };
        *slot = status.clone();
        drop(slot);

        log::warn!("Playback failed on {}: {}", provider, message);
        let _ = self.updates.send(ProviderUpdate {
            generation: self.generation.load(Ordering::SeqCst),
            status: status.clone(),
        });
        Ok(status)
    }

    pub fn status(&self, provider: &ProviderName) -> Option<ProviderStatus> {
        self.statuses.get(provider).map(|status| status.clone())
    }

    /// Current statuses in the order providers were requested
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        let session = self.read_session();
        session
            .as_ref()
            .map(|session| {
                session
                    .providers
                    .iter()
                    .filter_map(|provider| self.status(provider))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn trace(&self, provider: &ProviderName) -> Option<Vec<TraceEntry>> {
        self.statuses.get(provider).map(|status| status.trace.clone())
    }

    /// Every committed status from now on, across runs
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderUpdate> {
        self.updates.subscribe()
    }

    pub fn session(&self) -> Option<ResolutionSession> {
        self.read_session().clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn next_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn require_provider<'a>(
        session: &'a Option<ResolutionSession>,
        provider: &ProviderName,
    ) -> AppResult<&'a ResolutionSession> {
        let session = session
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("No resolution in progress".to_string()))?;
        if !session.providers.contains(provider) {
            return Err(AppError::InvalidInput(format!(
                "Provider {} is not part of the current resolution",
                provider
            )));
        }
        Ok(session)
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Option<ResolutionSession>> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Option<ResolutionSession>> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Replace the slot only if `status` belongs to the attempt that owns it
fn commit(statuses: &DashMap<ProviderName, ProviderStatus>, status: ProviderStatus) -> bool {
    match statuses.get_mut(&status.provider) {
        Some(mut slot) if slot.attempt == status.attempt => {
            *slot = status;
            true
        }
        _ => false,
    }
}

/// Settled statuses of one `resolve_all`, in completion order.
///
/// Ends once every provider of the run has either settled or been
/// superseded.
pub struct ResolutionRun {
    generation: u64,
    providers: Vec<ProviderName>,
    receiver: mpsc::Receiver<ProviderUpdate>,
}

impl ResolutionRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn providers(&self) -> &[ProviderName] {
        &self.providers
    }

    pub async fn next_update(&mut self) -> Option<ProviderUpdate> {
        self.receiver.recv().await
    }

    /// Wait for the run to finish and collect what it committed
    pub async fn settle(mut self) -> Vec<ProviderUpdate> {
        let mut updates = Vec::with_capacity(self.providers.len());
        while let Some(update) = self.receiver.recv().await {
            updates.push(update);
        }
        updates
    }
}

impl Stream for ResolutionRun {
    type Item = ProviderUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
