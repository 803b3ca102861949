use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a resolution attempt, kept for the diagnostics inspector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEntry {
    pub step: String,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TraceEntry {
    pub fn new(step: impl Into<String>, locator: Option<String>) -> Self {
        Self {
            step: step.into(),
            locator,
            response: None,
            extracted: None,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Append-only step log of a single attempt.
///
/// Once any entry carries an error the log is closed: later `begin`,
/// `record_response` and `annotate` calls are ignored.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    entries: Vec<TraceEntry>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a log that already holds entries (e.g. a settled status)
    pub fn from_entries(entries: Vec<TraceEntry>) -> Self {
        Self { entries }
    }

    /// Open a new step. Returns false when the log is already closed.
    pub fn begin(&mut self, step: impl Into<String>, locator: Option<String>) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.entries.push(TraceEntry::new(step, locator));
        true
    }

    /// Attach the raw upstream payload to the current step
    pub fn record_response(&mut self, response: Value) {
        if let Some(entry) = self.open_entry() {
            entry.response = Some(response);
        }
    }

    /// Attach a short human-readable fact to the current step
    pub fn annotate(&mut self, fact: impl Into<String>) {
        if let Some(entry) = self.open_entry() {
            entry.extracted = Some(fact.into());
        }
    }

    /// Mark the current step as failed and close the log.
    ///
    /// With no step open yet an "Initial error" entry carries the message.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.is_terminated() {
            return;
        }
        match self.entries.last_mut() {
            Some(entry) => entry.error = Some(error.into()),
            None => {
                let mut entry = TraceEntry::new("Initial error", None);
                entry.error = Some(error.into());
                self.entries.push(entry);
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.entries.iter().any(TraceEntry::is_error)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| entry.error.as_deref())
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }

    fn open_entry(&mut self) -> Option<&mut TraceEntry> {
        if self.is_terminated() {
            return None;
        }
        self.entries.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_accumulate_in_order() {
        let mut log = TraceLog::new();
        assert!(log.begin("Step 1", Some("https://api/search".into())));
        log.record_response(json!({"results": []}));
        log.annotate("nothing");
        assert!(log.begin("Step 2", None));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].extracted.as_deref(), Some("nothing"));
        assert_eq!(log.entries()[0].locator.as_deref(), Some("https://api/search"));
        assert!(!log.is_terminated());
    }

    #[test]
    fn test_error_closes_the_log() {
        let mut log = TraceLog::new();
        log.begin("Step 1", None);
        log.fail("boom");

        assert!(!log.begin("Step 2", None));
        log.annotate("ignored");
        log.fail("second failure");

        assert_eq!(log.len(), 1);
        assert_eq!(log.last_error(), Some("boom"));
        assert!(log.entries()[0].extracted.is_none());
    }

    #[test]
    fn test_fail_without_steps_adds_initial_entry() {
        let mut log = TraceLog::new();
        log.fail("no network");
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].step, "Initial error");
        assert!(log.is_terminated());
    }
}
