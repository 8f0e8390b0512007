use crate::models::Vendor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraping: ScrapingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub boards: Vec<BoardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Hard per-request timeout handed to the HTTP client
    pub timeout_seconds: u64,
    pub retries: usize,
    pub backoff_ms: u64,
    pub backoff_max_ms: u64,
    /// Politeness delay band between requests to the same host
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Boards fetched in parallel; 1 reproduces the sequential behavior
    pub concurrent_boards: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        ScrapingConfig {
            timeout_seconds: 25,
            retries: 2,
            backoff_ms: 500,
            backoff_max_ms: 4_000,
            delay_min_ms: 300,
            delay_max_ms: 800,
            concurrent_boards: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_path: String,
    pub state_path: String,
    /// Write fetched HTML to debug_dir for offline diagnosis
    pub debug_snapshots: bool,
    pub debug_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            data_path: "docs/data.json".to_string(),
            state_path: "state/db.json".to_string(),
            debug_snapshots: false,
            debug_dir: "cache/debug".to_string(),
        }
    }
}

/// One board as written in the config file; vendor still a raw string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEntry {
    pub vendor: String,
    pub model: String,
    /// Overrides support-URL guessing when set
    #[serde(default)]
    pub url: Option<String>,
}

/// A board entry with its vendor resolved
#[derive(Debug, Clone)]
pub struct Board {
    pub vendor: Vendor,
    pub model: String,
    pub url: Option<String>,
}

impl Board {
    /// Stable identity used as the state-snapshot key
    pub fn key(&self) -> String {
        format!("{}/{}", self.vendor, self.model)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }

    /// Resolve board entries to vendors. An unknown vendor is a per-board
    /// config error: logged, the board skipped, the batch unaffected.
    pub fn resolved_boards(&self) -> Vec<Board> {
        let mut boards = Vec::new();
        for entry in &self.boards {
            match Vendor::parse(&entry.vendor) {
                Some(vendor) => boards.push(Board {
                    vendor,
                    model: entry.model.clone(),
                    url: entry.url.clone(),
                }),
                None => {
                    tracing::warn!(
                        board = %entry.model,
                        vendor = %entry.vendor,
                        "unknown vendor in config, skipping board"
                    );
                }
            }
        }
        boards
    }
}
