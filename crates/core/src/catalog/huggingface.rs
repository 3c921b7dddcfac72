use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{Catalog, CatalogError, ModelDetail};
use crate::config::HubConfig;
use crate::models::CandidateRecord;

pub struct HuggingFaceCatalog {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

/// One entry of `GET /api/models`.
#[derive(Debug, Deserialize)]
struct HfListItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "modelId")]
    model_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    pipeline_tag: Option<String>,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
    #[serde(default)]
    library_name: Option<String>,
}

impl From<HfListItem> for CandidateRecord {
    fn from(item: HfListItem) -> Self {
        let id = item
            .model_id
            .filter(|s| !s.is_empty())
            .or(item.id)
            .unwrap_or_default();
        CandidateRecord {
            id,
            tags: item.tags,
            pipeline_tag: item.pipeline_tag.filter(|s| !s.is_empty()),
            last_modified: item.last_modified,
            model_type: item.library_name,
        }
    }
}

impl HuggingFaceCatalog {
    pub fn new(hub: &HubConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(hub.user_agent.clone())
            .timeout(Duration::from_secs(hub.timeout_secs))
            .build()
            .map_err(CatalogError::Client)?;

        Ok(Self {
            client,
            endpoint: hub.endpoint.trim_end_matches('/').to_string(),
            token: hub.resolved_token(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| CatalogError::Request {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(|source| CatalogError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| CatalogError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Catalog for HuggingFaceCatalog {
    async fn list_models(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CatalogError> {
        let url = format!("{}/models", self.endpoint);
        debug!(query, limit, "listing models");

        let items: Vec<HfListItem> = self
            .get_json(
                &url,
                &[("search", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(items.into_iter().map(CandidateRecord::from).collect())
    }

    async fn model_detail(&self, id: &str) -> Result<ModelDetail, CatalogError> {
        let url = format!("{}/models/{}", self.endpoint, id);
        debug!(id, "fetching model detail");
        self.get_json(&url, &[]).await
    }
}
