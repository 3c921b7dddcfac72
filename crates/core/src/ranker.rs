//! Model ranking.
//!
//! `rank` is pure: metrics are resolved beforehand and "now" is passed in,
//! so the same inputs always give the same order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{CandidateRecord, MetricSnapshot, ScoredResult, WeightType};
use crate::params::candidate_size_b;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Downloads,
    Likes,
    #[default]
    Composite,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Downloads => "downloads",
            SortMode::Likes => "likes",
            SortMode::Composite => "composite",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "downloads" => Ok(SortMode::Downloads),
            "likes" => Ok(SortMode::Likes),
            "composite" => Ok(SortMode::Composite),
            other => Err(format!(
                "unknown sort mode '{}' (expected composite, downloads or likes)",
                other
            )),
        }
    }
}

/// Opt-in hard filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankFilters {
    /// Drop results without any downloadable weights
    pub require_weights: bool,
    /// Drop candidates without GGUF files
    pub gguf_only: bool,
    /// Maximum parameter count in billions
    pub max_b: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagBoost {
    pub text_generation: f64,
    pub transformers: f64,
}

impl Default for TagBoost {
    fn default() -> Self {
        Self {
            text_generation: 0.20,
            transformers: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightBoost {
    pub gguf: f64,
    pub safetensors: f64,
    pub pytorch: f64,
}

impl Default for WeightBoost {
    fn default() -> Self {
        Self {
            gguf: 0.35,
            safetensors: 0.20,
            pytorch: 0.10,
        }
    }
}

impl WeightBoost {
    fn for_type(&self, weight: WeightType) -> f64 {
        match weight {
            WeightType::Gguf => self.gguf,
            WeightType::Safetensors => self.safetensors,
            WeightType::Pytorch => self.pytorch,
        }
    }
}

/// Composite-score tuning. Loaded from the `[ranking]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingProfile {
    pub downloads_weight: f64,
    pub likes_weight: f64,
    pub recency_weight: f64,
    pub tag_boost: TagBoost,
    pub weight_boost: WeightBoost,
    pub owner_boost: f64,
    /// Age assigned to candidates without a usable timestamp
    pub unknown_recency_days: i64,
    pub trusted_owners: BTreeSet<String>,
}

impl Default for RankingProfile {
    fn default() -> Self {
        Self {
            downloads_weight: 0.45,
            likes_weight: 0.25,
            recency_weight: 0.15,
            tag_boost: TagBoost::default(),
            weight_boost: WeightBoost::default(),
            owner_boost: 0.25,
            unknown_recency_days: 365,
            trusted_owners: [
                "TheBloke",
                "stabilityai",
                "meta",
                "openai",
                "huggingface",
                "EleutherAI",
                "bigscience",
                "microsoft",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Order resolved candidates and keep at most `top_n`.
///
/// Candidates without an id are dropped first, then `gguf_only` and `max_b`
/// narrow the batch. Composite scores are normalized against what remains,
/// so they are only comparable within one call. Sorting is stable: equal
/// scores keep input order. `require_weights` applies after sorting, just
/// before truncation.
pub fn rank(
    entries: Vec<(CandidateRecord, MetricSnapshot)>,
    sort_mode: SortMode,
    top_n: usize,
    filters: &RankFilters,
    profile: &RankingProfile,
    now: DateTime<Utc>,
) -> Vec<ScoredResult> {
    let entries: Vec<_> = entries
        .into_iter()
        .filter(|(record, _)| !record.id.trim().is_empty())
        .filter(|(_, metrics)| !filters.gguf_only || metrics.has_weight(WeightType::Gguf))
        .filter(|(record, metrics)| within_size_limit(record, metrics, filters.max_b))
        .collect();

    if entries.is_empty() {
        return Vec::new();
    }

    let scores: Vec<f64> = match sort_mode {
        SortMode::Downloads => entries.iter().map(|(_, m)| m.downloads as f64).collect(),
        SortMode::Likes => entries.iter().map(|(_, m)| m.likes as f64).collect(),
        SortMode::Composite => composite_scores(&entries, profile, now),
    };

    let mut results: Vec<ScoredResult> = entries
        .into_iter()
        .zip(scores)
        .map(|((record, metrics), score)| ScoredResult {
            score,
            display_metric: metrics.downloads,
            record,
            metrics,
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    if filters.require_weights {
        results.retain(|r| r.metrics.has_weights());
    }
    results.truncate(top_n);
    results
}

/// `max_b` heuristic. A size parsed from the id or tags must not exceed the
/// limit unless GGUF files exist (quantized builds run locally at any size).
/// With no size anywhere, the candidate stays only if it has weights.
fn within_size_limit(record: &CandidateRecord, metrics: &MetricSnapshot, max_b: Option<f64>) -> bool {
    let Some(max_b) = max_b else {
        return true;
    };
    match candidate_size_b(record) {
        Some(size) => size <= max_b || metrics.has_weight(WeightType::Gguf),
        None => metrics.has_weights(),
    }
}

pub(crate) fn composite_scores(
    entries: &[(CandidateRecord, MetricSnapshot)],
    profile: &RankingProfile,
    now: DateTime<Utc>,
) -> Vec<f64> {
    let max_downloads = entries
        .iter()
        .map(|(_, m)| m.downloads)
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let max_likes = entries
        .iter()
        .map(|(_, m)| m.likes)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let recencies: Vec<i64> = entries
        .iter()
        .map(|(_, m)| match m.last_modified {
            Some(ts) => (now - ts).num_days().max(0),
            None => profile.unknown_recency_days,
        })
        .collect();
    let max_recency = recencies.iter().copied().max().unwrap_or(0).max(1) as f64;

    entries
        .iter()
        .zip(recencies)
        .map(|((record, metrics), days)| {
            let downloads_norm = metrics.downloads as f64 / max_downloads;
            let likes_norm = metrics.likes as f64 / max_likes;
            let recency_norm = (max_recency - days as f64) / max_recency;

            downloads_norm * profile.downloads_weight
                + likes_norm * profile.likes_weight
                + recency_norm * profile.recency_weight
                + tag_boost(record, &profile.tag_boost)
                + weight_boost(metrics, &profile.weight_boost)
                + owner_boost(record, metrics, profile)
        })
        .collect()
}

fn tag_boost(record: &CandidateRecord, boost: &TagBoost) -> f64 {
    let mut total = 0.0;
    let pipeline_text_gen = record
        .pipeline_tag
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains("text-generation"));
    if record.has_tag("text-generation") || pipeline_text_gen {
        total += boost.text_generation;
    }
    if record.has_tag("transformers") {
        total += boost.transformers;
    }
    total
}

fn weight_boost(metrics: &MetricSnapshot, boost: &WeightBoost) -> f64 {
    metrics
        .weight_types
        .iter()
        .map(|w| boost.for_type(*w))
        .sum()
}

fn owner_boost(record: &CandidateRecord, metrics: &MetricSnapshot, profile: &RankingProfile) -> f64 {
    let owner = if metrics.owner.is_empty() {
        record.owner()
    } else {
        metrics.owner.as_str()
    };
    if profile.trusted_owners.contains(owner) {
        profile.owner_boost
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn entry(id: &str, downloads: u64, likes: u64) -> (CandidateRecord, MetricSnapshot) {
        let record = CandidateRecord::new(id);
        let metrics = MetricSnapshot {
            downloads,
            likes,
            last_modified: Some(now() - Duration::days(30)),
            owner: record.owner().to_string(),
            ..Default::default()
        };
        (record, metrics)
    }

    fn with_weights(
        mut entry: (CandidateRecord, MetricSnapshot),
        weights: &[WeightType],
    ) -> (CandidateRecord, MetricSnapshot) {
        entry.1.weight_types.extend(weights.iter().copied());
        entry
    }

    fn ids(results: &[ScoredResult]) -> Vec<&str> {
        results.iter().map(|r| r.record.id.as_str()).collect()
    }

    fn run(entries: Vec<(CandidateRecord, MetricSnapshot)>, mode: SortMode) -> Vec<ScoredResult> {
        rank(entries, mode, 10, &RankFilters::default(), &RankingProfile::default(), now())
    }

    #[test]
    fn test_downloads_mode_is_stable() {
        let entries = vec![
            entry("o/a", 10, 0),
            entry("o/b", 50, 0),
            entry("o/c", 10, 0),
            entry("o/d", 50, 0),
        ];
        let results = run(entries, SortMode::Downloads);
        assert_eq!(ids(&results), vec!["o/b", "o/d", "o/a", "o/c"]);
        assert_eq!(results[0].score, 50.0);
    }

    #[test]
    fn test_likes_mode_reports_downloads() {
        let entries = vec![entry("o/a", 1000, 1), entry("o/b", 5, 9)];
        let results = run(entries, SortMode::Likes);
        assert_eq!(ids(&results), vec!["o/b", "o/a"]);
        assert_eq!(results[0].score, 9.0);
        assert_eq!(results[0].display_metric, 5);
    }

    #[test]
    fn test_composite_downloads_dominate_when_rest_equal() {
        let entries = vec![entry("o/ten", 10, 5), entry("o/hundred", 100, 5), entry("o/fifty", 50, 5)];
        let results = run(entries, SortMode::Composite);
        assert_eq!(ids(&results), vec!["o/hundred", "o/fifty", "o/ten"]);
    }

    #[test]
    fn test_composite_exact_score() {
        let entries = vec![entry("o/a", 100, 10), entry("o/b", 50, 5)];
        let results = run(entries, SortMode::Composite);
        // same age for both, so recency normalizes to 0
        assert!((results[0].score - 0.70).abs() < 1e-9);
        assert!((results[1].score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_empty_id_never_returned() {
        for mode in [SortMode::Downloads, SortMode::Likes, SortMode::Composite] {
            let entries = vec![entry("", 1_000_000, 1_000), entry("  ", 5, 5), entry("o/a", 1, 1)];
            let results = run(entries, mode);
            assert_eq!(ids(&results), vec!["o/a"], "mode {mode}");
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(run(Vec::new(), SortMode::Composite).is_empty());
    }

    #[test]
    fn test_top_n_truncates() {
        let entries: Vec<_> = (0..20).map(|i| entry(&format!("o/m{i}"), i, 0)).collect();
        let results = rank(
            entries,
            SortMode::Downloads,
            3,
            &RankFilters::default(),
            &RankingProfile::default(),
            now(),
        );
        assert_eq!(ids(&results), vec!["o/m19", "o/m18", "o/m17"]);
    }

    #[test]
    fn test_require_weights() {
        let entries = vec![
            entry("o/popular", 1_000, 100),
            with_weights(entry("o/weighted", 10, 1), &[WeightType::Safetensors]),
        ];
        let filters = RankFilters {
            require_weights: true,
            ..Default::default()
        };
        for mode in [SortMode::Downloads, SortMode::Composite] {
            let results = rank(entries.clone(), mode, 10, &filters, &RankingProfile::default(), now());
            assert_eq!(ids(&results), vec!["o/weighted"]);
            assert!(results.iter().all(|r| r.metrics.has_weights()));
        }
    }

    #[test]
    fn test_gguf_only() {
        let entries = vec![
            with_weights(entry("o/st", 1_000, 0), &[WeightType::Safetensors]),
            with_weights(entry("o/gguf", 1, 0), &[WeightType::Gguf]),
        ];
        let filters = RankFilters {
            gguf_only: true,
            ..Default::default()
        };
        let results = rank(entries, SortMode::Downloads, 10, &filters, &RankingProfile::default(), now());
        assert_eq!(ids(&results), vec!["o/gguf"]);
    }

    #[test]
    fn test_gguf_only_changes_normalization_frame() {
        // without the 1000-download model, the gguf one is the batch maximum
        let entries = vec![
            entry("o/big", 1_000, 0),
            with_weights(entry("o/gguf", 10, 0), &[WeightType::Gguf]),
        ];
        let filters = RankFilters {
            gguf_only: true,
            ..Default::default()
        };
        let profile = RankingProfile::default();
        let results = rank(entries, SortMode::Composite, 10, &filters, &profile, now());
        let expected = profile.downloads_weight + profile.weight_boost.gguf;
        assert!((results[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_max_b() {
        let entries = vec![
            entry("org/model-13b", 500, 0),
            with_weights(entry("org/model-13b-GGUF", 100, 0), &[WeightType::Gguf]),
            with_weights(entry("org/model-13b-st", 100, 0), &[WeightType::Safetensors]),
            entry("org/model-3b", 50, 0),
            entry("org/unsized", 40, 0),
            with_weights(entry("org/unsized-weights", 30, 0), &[WeightType::Pytorch]),
        ];
        let filters = RankFilters {
            max_b: Some(7.0),
            ..Default::default()
        };
        let results = rank(entries, SortMode::Downloads, 10, &filters, &RankingProfile::default(), now());
        assert_eq!(
            ids(&results),
            vec!["org/model-13b-GGUF", "org/model-3b", "org/unsized-weights"]
        );
    }

    #[test]
    fn test_max_b_reads_tags() {
        let (record, metrics) = entry("org/model", 1, 0);
        let entries = vec![(record.with_tags(["70b"]), metrics)];
        let filters = RankFilters {
            max_b: Some(7.0),
            ..Default::default()
        };
        assert!(rank(entries, SortMode::Downloads, 10, &filters, &RankingProfile::default(), now()).is_empty());
    }

    #[test]
    fn test_weight_boost_is_additive() {
        let all = [WeightType::Gguf, WeightType::Safetensors, WeightType::Pytorch];
        let entries = vec![entry("o/none", 10, 1), with_weights(entry("o/all", 10, 1), &all)];
        let scores = composite_scores(&entries, &RankingProfile::default(), now());
        assert!((scores[1] - scores[0] - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_tag_boosts() {
        let profile = RankingProfile::default();
        let (plain, m) = entry("o/plain", 10, 1);
        let tagged = CandidateRecord::new("o/tagged").with_tags(["Text-Generation", "transformers"]);
        let piped = CandidateRecord::new("o/piped").with_pipeline_tag("text-generation");

        let entries = vec![(plain, m.clone()), (tagged, m.clone()), (piped, m)];
        let scores = composite_scores(&entries, &profile, now());
        assert!((scores[1] - scores[0] - 0.35).abs() < 1e-9);
        assert!((scores[2] - scores[0] - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_trusted_owner_boost_and_injection() {
        let entries = vec![entry("someone/model", 10, 1), entry("TheBloke/model", 10, 1)];
        let scores = composite_scores(&entries, &RankingProfile::default(), now());
        assert!((scores[1] - scores[0] - 0.25).abs() < 1e-9);

        let profile = RankingProfile {
            trusted_owners: ["someone".to_string()].into_iter().collect(),
            owner_boost: 1.0,
            ..Default::default()
        };
        let results = rank(entries, SortMode::Composite, 10, &RankFilters::default(), &profile, now());
        assert_eq!(ids(&results), vec!["someone/model", "TheBloke/model"]);
    }

    #[test]
    fn test_unknown_timestamp_counts_as_old() {
        let mut stale = entry("o/stale", 10, 1);
        stale.1.last_modified = None;
        let fresh = entry("o/fresh", 10, 1);

        let scores = composite_scores(&[stale, fresh], &RankingProfile::default(), now());
        // max recency is 365 days; the fresh one is 30 days old
        let expected = (365.0 - 30.0) / 365.0 * 0.15;
        assert!((scores[1] - scores[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_future_timestamp_clamped() {
        let mut future = entry("o/future", 10, 1);
        future.1.last_modified = Some(now() + Duration::days(3));
        let scores = composite_scores(&[future, entry("o/past", 10, 1)], &RankingProfile::default(), now());
        assert!((scores[0] - scores[1] - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("Likes".parse::<SortMode>(), Ok(SortMode::Likes));
        assert_eq!(SortMode::Downloads.to_string(), "downloads");
        assert!("stars".parse::<SortMode>().is_err());
    }

    fn batch_strategy() -> impl Strategy<Value = Vec<(u64, u64, i64)>> {
        prop::collection::vec((0u64..1_000_000, 0u64..10_000, 0i64..2_000), 0..8)
    }

    fn build_batch(others: &[(u64, u64, i64)], target: (u64, u64, i64)) -> Vec<(CandidateRecord, MetricSnapshot)> {
        std::iter::once(&target)
            .chain(others.iter())
            .enumerate()
            .map(|(i, &(downloads, likes, age))| {
                let (record, mut metrics) = entry(&format!("o/m{i}"), downloads, likes);
                metrics.last_modified = Some(now() - Duration::days(age));
                (record, metrics)
            })
            .collect()
    }

    fn target_score(others: &[(u64, u64, i64)], target: (u64, u64, i64)) -> f64 {
        composite_scores(&build_batch(others, target), &RankingProfile::default(), now())[0]
    }

    proptest! {
        #[test]
        fn prop_result_len_bounded(batch in batch_strategy(), top_n in 0usize..12) {
            let entries = build_batch(&batch, (1, 1, 1));
            let total = entries.len();
            for mode in [SortMode::Downloads, SortMode::Likes, SortMode::Composite] {
                let results = rank(entries.clone(), mode, top_n, &RankFilters::default(), &RankingProfile::default(), now());
                prop_assert!(results.len() <= top_n.min(total));
                prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }

        #[test]
        fn prop_composite_monotone_in_downloads(
            others in batch_strategy(),
            base in (0u64..1_000_000, 0u64..10_000, 0i64..2_000),
            extra in 0u64..1_000_000,
        ) {
            let raised = (base.0 + extra, base.1, base.2);
            prop_assert!(target_score(&others, raised) >= target_score(&others, base));
        }

        #[test]
        fn prop_composite_monotone_in_likes(
            others in batch_strategy(),
            base in (0u64..1_000_000, 0u64..10_000, 0i64..2_000),
            extra in 0u64..10_000,
        ) {
            let raised = (base.0, base.1 + extra, base.2);
            prop_assert!(target_score(&others, raised) >= target_score(&others, base));
        }

        #[test]
        fn prop_composite_monotone_in_recency(
            others in batch_strategy(),
            base in (0u64..1_000_000, 0u64..10_000, 0i64..2_000),
            newer_by in 0i64..2_000,
        ) {
            let newer = (base.0, base.1, (base.2 - newer_by).max(0));
            prop_assert!(target_score(&others, newer) >= target_score(&others, base));
        }
    }
}
