use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ranker::{RankingProfile, SortMode};

pub const HF_API_BASE: &str = "https://huggingface.co/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog connection settings
    #[serde(default)]
    pub hub: HubConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Ranking weights and trusted publishers
    #[serde(default)]
    pub ranking: RankingProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HuggingFace token, overridden by the HF_TOKEN environment variable
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates fetched from the catalog before ranking
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    /// Results shown after ranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub sort: SortMode,

    /// Delay between per-model detail lookups
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Stop fetching metrics after this many seconds and rank what was gathered
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_endpoint() -> String {
    HF_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("hfscout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_fetch_limit() -> usize {
    80
}

fn default_top_n() -> usize {
    10
}

fn default_throttle_ms() -> u64 {
    100
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fetch_limit: default_fetch_limit(),
            top_n: default_top_n(),
            sort: SortMode::default(),
            throttle_ms: default_throttle_ms(),
            deadline_secs: None,
        }
    }
}

impl HubConfig {
    /// Token from HF_TOKEN if set and non-empty, else from the config file.
    pub fn resolved_token(&self) -> Option<String> {
        self.token_with_env(std::env::var("HF_TOKEN").ok())
    }

    fn token_with_env(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.is_empty()))
    }
}

impl Config {
    /// Get the base directory: ~/.config/hfscout/
    pub fn base_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(".config").join("hfscout"))
    }

    /// Get the config file path: ~/.config/hfscout/config.toml
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::base_dir()?.join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
