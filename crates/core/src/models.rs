use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A model returned by a catalog search, before metric enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Repository id in `owner/name` form
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pipeline_tag: Option<String>,
    /// Raw last-modified string as reported by the catalog
    #[serde(default)]
    pub last_modified: Option<String>,
    /// Library/type label, shown in the detail view only
    #[serde(default)]
    pub model_type: Option<String>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pipeline_tag(mut self, tag: impl Into<String>) -> Self {
        self.pipeline_tag = Some(tag.into());
        self
    }

    /// Portion of the id before the first `/`, empty if there is none.
    pub fn owner(&self) -> &str {
        self.id.split_once('/').map(|(owner, _)| owner).unwrap_or("")
    }

    /// Pipeline tag, else the first tag, else empty.
    pub fn primary_tag(&self) -> &str {
        self.pipeline_tag
            .as_deref()
            .or_else(|| self.tags.first().map(String::as_str))
            .unwrap_or("")
    }

    /// Case-insensitive membership in the tag set.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Downloadable weight file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightType {
    Gguf,
    Safetensors,
    Pytorch,
}

impl WeightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightType::Gguf => "gguf",
            WeightType::Safetensors => "safetensors",
            WeightType::Pytorch => "pytorch",
        }
    }
}

impl fmt::Display for WeightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics resolved for one candidate. Every field has a neutral default
/// so a failed lookup still produces a usable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub downloads: u64,
    pub likes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub weight_types: BTreeSet<WeightType>,
    pub owner: String,
}

impl MetricSnapshot {
    /// Zero/empty metrics for a candidate whose lookup failed or was skipped.
    pub fn unresolved(record: &CandidateRecord) -> Self {
        Self {
            owner: record.owner().to_string(),
            ..Default::default()
        }
    }

    pub fn has_weights(&self) -> bool {
        !self.weight_types.is_empty()
    }

    pub fn has_weight(&self, weight: WeightType) -> bool {
        self.weight_types.contains(&weight)
    }

    /// Comma-separated weight labels in display order.
    pub fn weight_label(&self) -> String {
        self.weight_types
            .iter()
            .map(WeightType::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One ranked entry.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    /// Raw downloads, raw likes, or composite score depending on sort mode
    pub score: f64,
    /// Always the downloads count, so listings read the same across modes
    pub display_metric: u64,
    pub record: CandidateRecord,
    pub metrics: MetricSnapshot,
}
