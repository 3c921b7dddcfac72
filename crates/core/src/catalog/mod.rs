#[cfg(test)]
pub(crate) mod fake;
pub mod huggingface;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::CandidateRecord;

pub use huggingface::HuggingFaceCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only model catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Models matching a free-text query, at most `limit` of them.
    async fn list_models(&self, query: &str, limit: usize)
        -> Result<Vec<CandidateRecord>, CatalogError>;

    /// Per-model detail: counters, last-modified and the file listing.
    async fn model_detail(&self, id: &str) -> Result<ModelDetail, CatalogError>;
}

/// Detail response for one model. Absent fields mean "unknown" and are
/// defaulted by the metric resolver, never looked up under other names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDetail {
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default, rename = "lastModified")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub siblings: Vec<Sibling>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sibling {
    pub rfilename: String,
}

impl ModelDetail {
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.siblings.iter().map(|s| s.rfilename.as_str())
    }
}
