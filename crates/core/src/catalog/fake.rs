//! In-memory catalog for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{Catalog, CatalogError, ModelDetail, Sibling};
use crate::models::CandidateRecord;

#[derive(Default)]
pub struct FakeCatalog {
    pub models: Vec<CandidateRecord>,
    pub details: HashMap<String, ModelDetail>,
    pub failing: HashSet<String>,
    pub detail_calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_model(mut self, record: CandidateRecord, detail: ModelDetail) -> Self {
        self.details.insert(record.id.clone(), detail);
        self.models.push(record);
        self
    }

    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

pub fn detail(downloads: u64, likes: u64, files: &[&str]) -> ModelDetail {
    ModelDetail {
        downloads: Some(downloads),
        likes: Some(likes),
        last_modified: None,
        siblings: files
            .iter()
            .map(|f| Sibling {
                rfilename: f.to_string(),
            })
            .collect(),
    }
}

fn decode_error(id: &str) -> CatalogError {
    CatalogError::Decode {
        url: format!("fake://{id}"),
        source: serde_json::from_str::<ModelDetail>("not json").unwrap_err(),
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_models(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CatalogError> {
        if self.failing.contains(query) {
            return Err(decode_error(query));
        }
        let query = query.to_lowercase();
        Ok(self
            .models
            .iter()
            .filter(|m| {
                m.id.to_lowercase().contains(&query)
                    || m.tags.iter().any(|t| t.to_lowercase().contains(&query))
                    || m
                        .pipeline_tag
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn model_detail(&self, id: &str) -> Result<ModelDetail, CatalogError> {
        self.detail_calls.lock().unwrap().push(id.to_string());
        if self.failing.contains(id) {
            return Err(decode_error(id));
        }
        self.details.get(id).cloned().ok_or_else(|| decode_error(id))
    }
}
