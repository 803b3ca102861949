use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{payload, title_sanitizer::sanitize};
use crate::modules::resolution::domain::{
    entities::{MediaIdentity, ResolutionOutcome, ResolvedContent, SearchCandidate, TraceLog},
    errors::ResolutionError,
    repositories::{ContentProviderGateway, ProviderRequest},
    value_objects::ResolutionUnit,
};
use crate::shared::{
    domain::value_objects::{ContentKind, ProviderName},
    errors::{AppError, AppResult},
    utils::logger::{LogContext, TimedOperation},
};

/// Runs the search → info → unit → extraction chain against one provider.
///
/// Failures never escape as `Err`: they end the trace and are reported on the
/// returned outcome.
pub struct ResolutionEngine {
    gateway: Arc<dyn ContentProviderGateway>,
    step_timeout: Duration,
}

/// Mutable state of one resolution attempt
struct Attempt<'a> {
    provider: &'a ProviderName,
    kind: ContentKind,
    trace: TraceLog,
    candidates: Vec<SearchCandidate>,
    selected: Option<SearchCandidate>,
}

impl ResolutionEngine {
    pub fn new(gateway: Arc<dyn ContentProviderGateway>, step_timeout: Duration) -> Self {
        Self {
            gateway,
            step_timeout,
        }
    }

    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    /// Resolve one unit of `media` on `provider`.
    ///
    /// With a pinned candidate no search is made. `override_query` replaces
    /// the sanitized title when searching.
    pub async fn resolve(
        &self,
        provider: &ProviderName,
        media: &MediaIdentity,
        unit: ResolutionUnit,
        pinned: Option<SearchCandidate>,
        override_query: Option<&str>,
    ) -> ResolutionOutcome {
        let timer = TimedOperation::new(&format!("resolve {} {} on {}", media.id, unit, provider));
        let is_pinned = pinned.is_some();

        let mut attempt = Attempt {
            provider,
            kind: media.kind,
            trace: TraceLog::new(),
            candidates: Vec::new(),
            selected: None,
        };

        let (data, failure) = match self
            .run(&mut attempt, media, unit, pinned, override_query)
            .await
        {
            Ok(content) => {
                attempt.trace.begin("Success", None);
                attempt.trace.annotate(format!(
                    "{} {} ready",
                    content.len(),
                    match content {
                        ResolvedContent::Video(_) => "sources",
                        ResolvedContent::Reading(_) => "pages",
                    }
                ));
                (Some(content), None)
            }
            Err(error) => {
                attempt.trace.fail(error.to_string());
                (None, Some(error))
            }
        };

        let failure_text = failure.as_ref().map(ToString::to_string);
        LogContext::resolution_outcome(provider.as_str(), unit.get(), failure_text.as_deref());
        timer.finish_with_info(failure_text.as_deref().unwrap_or("resolved"));

        ResolutionOutcome {
            data,
            trace: attempt.trace.into_entries(),
            candidates: attempt.candidates,
            selected: attempt.selected,
            pinned: is_pinned,
            failure,
        }
    }

    /// Fresh search for the candidate picker
    pub async fn search(
        &self,
        provider: &ProviderName,
        kind: ContentKind,
        query: &str,
    ) -> AppResult<Vec<SearchCandidate>> {
        let request = ProviderRequest::Search {
            query: query.to_string(),
        };

        let payload = tokio::time::timeout(self.step_timeout, self.gateway.fetch(provider, kind, &request))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Search on {} exceeded {}ms",
                    provider,
                    self.timeout_ms()
                ))
            })??;

        let candidates: Vec<SearchCandidate> = payload::search_entries(&payload)
            .iter()
            .filter_map(payload::candidate_from)
            .collect();

        LogContext::search_operation(query, Some(provider.as_str()), Some(candidates.len()));
        Ok(candidates)
    }

    async fn run(
        &self,
        attempt: &mut Attempt<'_>,
        media: &MediaIdentity,
        unit: ResolutionUnit,
        pinned: Option<SearchCandidate>,
        override_query: Option<&str>,
    ) -> Result<ResolvedContent, ResolutionError> {
        let candidate = match pinned {
            Some(candidate) => {
                attempt
                    .trace
                    .begin("Step 1: Use pinned selection", Some(candidate.locator.clone()));
                attempt
                    .trace
                    .annotate(format!("Pinned \"{}\"", candidate.title));
                candidate
            }
            None => {
                let query = override_query
                    .map(str::to_string)
                    .unwrap_or_else(|| sanitize(media.search_title()));
                self.acquire_candidate(attempt, &query).await?
            }
        };
        attempt.selected = Some(candidate.clone());

        let listing = self.fetch_listing(attempt, &candidate).await?;
        let unit_locator = {
            attempt.trace.begin(
                format!("Step 3: Match {} {}", attempt.kind.unit_label(), unit),
                None,
            );

            let matched = listing.iter().find_map(|entry| {
                payload::unit_label(entry)
                    .filter(|label| unit.matches_label(label))
                    .map(|label| (label, entry))
            });
            let not_found = ResolutionError::UnitNotFound {
                kind: attempt.kind,
                unit: unit.get(),
            };
            let (label, entry) = matched.ok_or_else(|| not_found.clone())?;
            let locator = payload::unit_locator(entry, attempt.kind).ok_or(not_found)?;

            attempt
                .trace
                .annotate(format!("Matched \"{}\" ({})", label, locator));
            locator
        };

        let request = ProviderRequest::Extract { unit: unit_locator };
        let step = match attempt.kind {
            ContentKind::Video => "Step 4: Fetch video sources",
            ContentKind::Reading => "Step 4: Fetch chapter pages",
        };
        attempt.trace.begin(
            step,
            Some(self.gateway.locate(attempt.provider, attempt.kind, &request)),
        );

        let response = self
            .fetch(attempt, &request, "Extraction", ResolutionError::Extraction)
            .await?;
        attempt.trace.record_response(response.clone());

        let content = match attempt.kind {
            ContentKind::Video => {
                let sources = payload::video_sources(&response);
                if sources.is_empty() {
                    return Err(ResolutionError::Extraction("No playable sources".to_string()));
                }
                ResolvedContent::Video(sources)
            }
            ContentKind::Reading => {
                let pages = payload::page_images(&response);
                if pages.is_empty() {
                    return Err(ResolutionError::Extraction("No readable pages".to_string()));
                }
                ResolvedContent::Reading(pages)
            }
        };
        attempt
            .trace
            .annotate(format!("{} items extracted", content.len()));

        Ok(content)
    }

    async fn acquire_candidate(
        &self,
        attempt: &mut Attempt<'_>,
        query: &str,
    ) -> Result<SearchCandidate, ResolutionError> {
        let request = ProviderRequest::Search {
            query: query.to_string(),
        };
        attempt.trace.begin(
            format!("Step 1: Search \"{}\"", query),
            Some(self.gateway.locate(attempt.provider, attempt.kind, &request)),
        );

        let response = self
            .fetch(attempt, &request, "Search", ResolutionError::SearchFetch)
            .await?;
        attempt.trace.record_response(response.clone());

        let entries = payload::search_entries(&response);
        LogContext::search_operation(query, Some(attempt.provider.as_str()), Some(entries.len()));

        let first = entries.first().ok_or_else(|| ResolutionError::NoResults {
            query: query.to_string(),
        })?;
        attempt.candidates = entries.iter().filter_map(payload::candidate_from).collect();

        let candidate =
            payload::candidate_from(first).ok_or_else(|| ResolutionError::MalformedCandidate {
                title: payload::entry_title(first),
            })?;
        attempt.trace.annotate(format!(
            "Selected \"{}\" of {} results",
            candidate.title,
            entries.len()
        ));

        Ok(candidate)
    }

    async fn fetch_listing(
        &self,
        attempt: &mut Attempt<'_>,
        candidate: &SearchCandidate,
    ) -> Result<Vec<Value>, ResolutionError> {
        let request = ProviderRequest::Info {
            locator: candidate.locator.clone(),
        };
        attempt.trace.begin(
            "Step 2: Fetch info",
            Some(self.gateway.locate(attempt.provider, attempt.kind, &request)),
        );

        let response = self
            .fetch(attempt, &request, "Info", ResolutionError::InfoFetch)
            .await?;
        attempt.trace.record_response(response.clone());

        let listing = payload::unit_listing(&response, attempt.kind);
        if listing.is_empty() {
            return Err(ResolutionError::InfoFetch(format!(
                "No {} listed",
                attempt.kind.listing_key()
            )));
        }
        attempt
            .trace
            .annotate(format!("{} {} listed", listing.len(), attempt.kind.listing_key()));

        Ok(listing.to_vec())
    }

    async fn fetch(
        &self,
        attempt: &Attempt<'_>,
        request: &ProviderRequest,
        step: &str,
        on_failure: fn(String) -> ResolutionError,
    ) -> Result<Value, ResolutionError> {
        log::debug!("{}: {} ({})", attempt.provider, step, attempt.kind);

        match tokio::time::timeout(
            self.step_timeout,
            self.gateway.fetch(attempt.provider, attempt.kind, request),
        )
        .await
        {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) if e.is_timeout() => Err(self.timeout_error(step)),
            Ok(Err(e)) => {
                log::warn!("{}: {} failed: {}", attempt.provider, step, e);
                Err(on_failure(e.to_string()))
            }
            Err(_) => Err(self.timeout_error(step)),
        }
    }

    fn timeout_error(&self, step: &str) -> ResolutionError {
        ResolutionError::Timeout {
            step: step.to_string(),
            timeout_ms: self.timeout_ms(),
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.step_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
