use std::fmt::Write;

use crate::modules::resolution::domain::{entities::TraceEntry, value_objects::ProviderStatus};

/// Copyable plain-text dump of every provider trace, for bug reports
pub struct DiagnosticsReport;

impl DiagnosticsReport {
    pub fn render(statuses: &[ProviderStatus]) -> String {
        let mut report = String::new();

        for status in statuses {
            let _ = writeln!(
                report,
                "--- PROVIDER: {} ---",
                status.provider.as_str().to_uppercase()
            );
            for entry in &status.trace {
                Self::render_entry(&mut report, entry);
            }
            report.push('\n');
        }

        report
    }

    fn render_entry(report: &mut String, entry: &TraceEntry) {
        let _ = writeln!(report, "> {}", entry.step);
        if let Some(locator) = &entry.locator {
            let _ = writeln!(report, "URL: {}", locator);
        }
        if let Some(extracted) = &entry.extracted {
            let _ = writeln!(report, "Info: {}", extracted);
        }
        if let Some(response) = &entry.response {
            let pretty = serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string());
            let _ = writeln!(report, "Response: {}", pretty);
        }
        if let Some(error) = &entry.error {
            let _ = writeln!(report, "ERROR: {}", error);
        }
    }
}
