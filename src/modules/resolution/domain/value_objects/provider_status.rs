use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::resolution::domain::{
    entities::{ResolutionOutcome, ResolvedContent, SearchCandidate, TraceEntry},
    errors::ResolutionError,
};
use crate::shared::domain::value_objects::ProviderName;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPhase {
    Loading,
    Success,
    Error,
}

/// Orchestrator view of one provider. Always replaced as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderName,
    pub phase: ProviderPhase,
    pub data: Option<ResolvedContent>,
    pub trace: Vec<TraceEntry>,
    pub candidates: Vec<SearchCandidate>,
    pub selected: Option<SearchCandidate>,
    pub pinned: bool,
    pub failure: Option<ResolutionError>,
    /// Token of the attempt that owns this slot; stale commits are rejected
    pub attempt: u64,
    pub updated_at: DateTime<Utc>,
}

impl ProviderStatus {
    pub fn loading(provider: ProviderName, attempt: u64) -> Self {
        Self {
            provider,
            phase: ProviderPhase::Loading,
            data: None,
            trace: Vec::new(),
            candidates: Vec::new(),
            selected: None,
            pinned: false,
            failure: None,
            attempt,
            updated_at: Utc::now(),
        }
    }

    pub fn from_outcome(provider: ProviderName, attempt: u64, outcome: ResolutionOutcome) -> Self {
        let phase = if outcome.is_success() {
            ProviderPhase::Success
        } else {
            ProviderPhase::Error
        };

        Self {
            provider,
            phase,
            data: outcome.data,
            trace: outcome.trace,
            candidates: outcome.candidates,
            selected: outcome.selected,
            pinned: outcome.pinned,
            failure: outcome.failure,
            attempt,
            updated_at: Utc::now(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.phase != ProviderPhase::Loading
    }

    /// Message of the failing trace step, for the aggregate view
    pub fn error_message(&self) -> Option<&str> {
        self.trace.iter().rev().find_map(|entry| entry.error.as_deref())
    }
}

/// A committed status, tagged with the orchestration generation it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct ProviderUpdate {
    pub generation: u64,
    pub status: ProviderStatus,
}
