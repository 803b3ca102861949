use serde::Serialize;

use super::{ResolvedContent, SearchCandidate, TraceEntry};
use crate::modules::resolution::domain::errors::ResolutionError;

/// Result of one provider resolution attempt. Always carries the trace, even
/// on failure, and the candidate metadata gathered up to the failing step.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionOutcome {
    pub data: Option<ResolvedContent>,
    pub trace: Vec<TraceEntry>,
    /// Every locator-bearing search hit; empty when a pinned candidate was used
    pub candidates: Vec<SearchCandidate>,
    /// Candidate the chain actually followed
    pub selected: Option<SearchCandidate>,
    pub pinned: bool,
    pub failure: Option<ResolutionError>,
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}
