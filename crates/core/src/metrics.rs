//! Per-candidate metric resolution.
//!
//! Each candidate costs one detail lookup against the catalog. Lookups run
//! one at a time with a fixed delay between them to stay under the catalog's
//! rate limits. A failed lookup never aborts the batch: the candidate keeps
//! zero counters and an empty weight set.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, ModelDetail};
use crate::models::{CandidateRecord, MetricSnapshot, WeightType};

/// Fallbacks tried after RFC 3339, in order.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Offset-less fallbacks, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Best-effort timestamp parse. Returns `None` rather than an error when no
/// format matches.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(ts.and_utc());
        }
    }

    None
}

/// Weight formats present in a file listing.
pub fn detect_weight_types<'a, I>(filenames: I) -> BTreeSet<WeightType>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found = BTreeSet::new();
    for name in filenames {
        let lower = name.to_lowercase();
        // matches split files such as model.gguf.part1of2 too
        if lower.contains(".gguf") {
            found.insert(WeightType::Gguf);
        }
        if lower.ends_with(".safetensors") {
            found.insert(WeightType::Safetensors);
        }
        if lower.ends_with(".bin") || lower.contains("pytorch_model") {
            found.insert(WeightType::Pytorch);
        }
    }
    found
}

/// Build a snapshot from a detail response, defaulting what it lacks.
pub fn snapshot_from_detail(record: &CandidateRecord, detail: &ModelDetail) -> MetricSnapshot {
    let last_modified = detail
        .last_modified
        .as_deref()
        .or(record.last_modified.as_deref())
        .and_then(parse_timestamp);

    MetricSnapshot {
        downloads: detail.downloads.unwrap_or(0),
        likes: detail.likes.unwrap_or(0),
        last_modified,
        weight_types: detect_weight_types(detail.filenames()),
        owner: record.owner().to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct MetricResolver {
    throttle: Duration,
    deadline: Option<Duration>,
}

impl Default for MetricResolver {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl MetricResolver {
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            deadline: None,
        }
    }

    /// Stop issuing lookups once `deadline` has elapsed since the batch
    /// started. Candidates not reached keep default metrics.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Resolve metrics for every candidate with a non-empty id, in input
    /// order. `on_progress` is called once per candidate after it is handled.
    pub async fn resolve_batch<C, F>(
        &self,
        catalog: &C,
        candidates: Vec<CandidateRecord>,
        mut on_progress: F,
    ) -> Vec<(CandidateRecord, MetricSnapshot)>
    where
        C: Catalog + ?Sized,
        F: FnMut(&CandidateRecord),
    {
        let started = Instant::now();
        let mut resolved = Vec::with_capacity(candidates.len());
        let mut failed = 0usize;
        let mut skipped = 0usize;
        let mut expired = false;

        for record in candidates {
            if record.id.is_empty() {
                debug!("dropping candidate without id");
                continue;
            }

            if !expired && !resolved.is_empty() && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
            expired = expired
                || self
                    .deadline
                    .is_some_and(|deadline| started.elapsed() >= deadline);

            let snapshot = if expired {
                skipped += 1;
                MetricSnapshot::unresolved(&record)
            } else {
                match catalog.model_detail(&record.id).await {
                    Ok(detail) => snapshot_from_detail(&record, &detail),
                    Err(err) => {
                        failed += 1;
                        warn!(id = %record.id, error = %err, "metric lookup failed, using defaults");
                        MetricSnapshot::unresolved(&record)
                    }
                }
            };

            on_progress(&record);
            resolved.push((record, snapshot));
        }

        if skipped > 0 {
            warn!(skipped, "metric deadline reached, ranking on partial data");
        }
        info!(
            candidates = resolved.len(),
            failed,
            skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "resolved candidate metrics"
        );

        resolved
    }
}
