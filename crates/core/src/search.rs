use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogError};
use crate::config::Config;
use crate::metrics::MetricResolver;
use crate::models::{CandidateRecord, ScoredResult};
use crate::ranker::{rank, RankFilters, RankingProfile, SortMode};

pub const DEFAULT_FETCH_LIMIT: usize = 80;
pub const DEFAULT_TOP_N: usize = 10;

/// Free-text keyword search.
pub async fn search_by_name<C: Catalog + ?Sized>(
    catalog: &C,
    keyword: &str,
    fetch_limit: usize,
) -> Result<Vec<CandidateRecord>, CatalogError> {
    catalog.list_models(keyword, fetch_limit).await
}

/// Keyword search narrowed to candidates carrying `tag` (case-insensitive)
/// as a tag or pipeline tag, or containing it in their id.
pub async fn search_by_tag<C: Catalog + ?Sized>(
    catalog: &C,
    tag: &str,
    fetch_limit: usize,
) -> Result<Vec<CandidateRecord>, CatalogError> {
    let models = catalog.list_models(tag, fetch_limit).await?;
    let fetched = models.len();
    let matching: Vec<_> = models.into_iter().filter(|m| matches_tag(m, tag)).collect();
    debug!(tag, fetched, kept = matching.len(), "filtered by tag");
    Ok(matching)
}

fn matches_tag(record: &CandidateRecord, tag: &str) -> bool {
    let wanted = tag.to_lowercase();
    record.has_tag(tag)
        || record
            .pipeline_tag
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(tag))
        || record.id.to_lowercase().contains(&wanted)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Name(String),
    Tag(String),
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchQuery::Name(keyword) => write!(f, "name keyword: {}", keyword),
            SearchQuery::Tag(tag) => write!(f, "tag: {}", tag),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub fetch_limit: usize,
    pub top_n: usize,
    pub sort_mode: SortMode,
    pub filters: RankFilters,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fetch_limit: DEFAULT_FETCH_LIMIT,
            top_n: DEFAULT_TOP_N,
            sort_mode: SortMode::default(),
            filters: RankFilters::default(),
        }
    }
}

impl SearchOptions {
    /// Options seeded from the `[search]` config section.
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_limit: config.search.fetch_limit,
            top_n: config.search.top_n,
            sort_mode: config.search.sort,
            filters: RankFilters::default(),
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    /// Candidates returned by the catalog, before any filtering
    pub candidates_fetched: usize,
    pub results: Vec<ScoredResult>,
}

/// Search, resolve metrics, rank.
pub struct ModelSearch<C> {
    catalog: C,
    resolver: MetricResolver,
    profile: RankingProfile,
}

impl<C: Catalog> ModelSearch<C> {
    pub fn new(catalog: C, resolver: MetricResolver, profile: RankingProfile) -> Self {
        Self {
            catalog,
            resolver,
            profile,
        }
    }

    /// Wire up a search from config: throttle, deadline and ranking profile.
    pub fn from_config(catalog: C, config: &Config) -> Self {
        let resolver = MetricResolver::new(Duration::from_millis(config.search.throttle_ms))
            .with_deadline(config.search.deadline_secs.map(Duration::from_secs));
        Self::new(catalog, resolver, config.ranking.clone())
    }

    pub async fn run<F>(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
        on_progress: F,
    ) -> Result<SearchOutcome, CatalogError>
    where
        F: FnMut(&CandidateRecord),
    {
        let candidates = match query {
            SearchQuery::Name(keyword) => {
                search_by_name(&self.catalog, keyword, options.fetch_limit).await?
            }
            SearchQuery::Tag(tag) => search_by_tag(&self.catalog, tag, options.fetch_limit).await?,
        };
        let candidates_fetched = candidates.len();
        info!(%query, candidates_fetched, "catalog search complete");

        let resolved = self
            .resolver
            .resolve_batch(&self.catalog, candidates, on_progress)
            .await;

        let results = rank(
            resolved,
            options.sort_mode,
            options.top_n,
            &options.filters,
            &self.profile,
            Utc::now(),
        );

        Ok(SearchOutcome {
            candidates_fetched,
            results,
        })
    }
}
