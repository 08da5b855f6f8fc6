//! Run and cluster configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use webrank_algorithms::PageRankConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parameters of one PageRank run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Graph file (read by the coordinator only)
    pub input: PathBuf,
    /// Result file (written by the coordinator only)
    pub output: PathBuf,
    /// Damping factor
    pub damping_factor: f64,
    /// Fixed number of iterations
    pub iterations: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let defaults = PageRankConfig::default();
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            damping_factor: defaults.damping_factor,
            iterations: defaults.iterations,
        }
    }
}

impl RunConfig {
    /// Create a configuration with default damping factor and iteration count
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn page_rank_config(&self) -> PageRankConfig {
        PageRankConfig {
            damping_factor: self.damping_factor,
            iterations: self.iterations,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input file is required".to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output file is required".to_string()));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(ConfigError::Invalid(format!(
                "damping factor {} is outside [0, 1]",
                self.damping_factor
            )));
        }
        Ok(())
    }
}

/// Where and how many ranks meet for a TCP run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Coordinator listen address (`host:port`)
    pub coordinator: String,
    /// Number of ranks, coordinator included
    pub workers: usize,
    /// How long a worker keeps retrying to reach the coordinator
    pub connect_timeout_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            coordinator: "127.0.0.1:7070".to_string(),
            workers: 1,
            connect_timeout_ms: 30_000,
        }
    }
}

impl ClusterConfig {
    /// Read a YAML cluster description; missing keys take their defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: ClusterConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("worker count must be positive".to_string()));
        }
        if self.coordinator.is_empty() {
            return Err(ConfigError::Invalid("coordinator address is required".to_string()));
        }
        Ok(())
    }
}
