use serde::Serialize;
use thiserror::Error;

use crate::shared::domain::value_objects::ContentKind;

/// Why a resolution attempt stopped. Recorded as the terminal trace entry's
/// error text and kept on the outcome; never returned as `Err`.
#[derive(Error, Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ResolutionError {
    #[error("Search request failed: {0}")]
    SearchFetch(String),

    #[error("No results found for \"{query}\"")]
    NoResults { query: String },

    #[error("Search result \"{title}\" has no locator to follow")]
    MalformedCandidate { title: String },

    #[error("Info fetch failed: {0}")]
    InfoFetch(String),

    #[error("{} {unit} not found", .kind.unit_label())]
    UnitNotFound { kind: ContentKind, unit: u32 },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("{step} exceeded the {timeout_ms}ms time limit")]
    Timeout { step: String, timeout_ms: u64 },

    #[error("Playback failed: {0}")]
    Playback(String),
}

impl ResolutionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResolutionError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_not_found_names_the_unit() {
        let video = ResolutionError::UnitNotFound {
            kind: ContentKind::Video,
            unit: 3,
        };
        let reading = ResolutionError::UnitNotFound {
            kind: ContentKind::Reading,
            unit: 12,
        };
        assert_eq!(video.to_string(), "Episode 3 not found");
        assert_eq!(reading.to_string(), "Chapter 12 not found");
    }

    #[test]
    fn test_timeout_message() {
        let err = ResolutionError::Timeout {
            step: "Search".into(),
            timeout_ms: 20_000,
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Search exceeded the 20000ms time limit");
    }
}
