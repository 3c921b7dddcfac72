//! hfscout_core - Core library for HuggingFace model discovery
//!
//! This crate provides:
//! - HuggingFace catalog client (search and per-model detail)
//! - Metric resolution with throttling and failure tolerance
//! - Model ranking (downloads, likes, composite score) and filters
//! - Configuration

pub mod catalog;
pub mod config;
pub mod metrics;
pub mod models;
pub mod params;
pub mod ranker;
pub mod search;

pub use catalog::{Catalog, CatalogError, HuggingFaceCatalog, ModelDetail};
pub use config::{Config, ConfigError};
pub use metrics::MetricResolver;
pub use models::{CandidateRecord, MetricSnapshot, ScoredResult, WeightType};
pub use ranker::{rank, RankFilters, RankingProfile, SortMode};
pub use search::{ModelSearch, SearchOptions, SearchOutcome, SearchQuery};
