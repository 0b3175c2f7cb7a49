//! Optional TOML configuration for `pathminer mine`.
//!
//! ```toml
//! [extractor]
//! max_path_length = 8
//! max_path_width = 2
//!
//! [pipeline]
//! workers = 8
//! timeout_secs = 600
//! splits = ["train", "test", "val"]
//! fragment_extension = "c2v"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::domain::path::{DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_PATH_WIDTH, MergeLimits};
use super::concurrency::default_workers;

pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_FRAGMENT_EXTENSION: &str = "c2v";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorSettings {
    pub max_path_length: usize,
    pub max_path_width: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_path_width: DEFAULT_MAX_PATH_WIDTH,
        }
    }
}

impl ExtractorSettings {
    pub fn limits(&self) -> MergeLimits {
        MergeLimits {
            max_path_length: self.max_path_length,
            max_path_width: self.max_path_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    pub workers: usize,
    pub timeout_secs: u64,
    pub splits: Vec<String>,
    pub fragment_extension: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            splits: vec!["train".to_string(), "test".to_string(), "val".to_string()],
            fragment_extension: DEFAULT_FRAGMENT_EXTENSION.to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub extractor: ExtractorSettings,
    pub pipeline: PipelineSettings,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).context("invalid configuration")?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.max_path_length == 0 {
            bail!("max_path_length must be at least 1");
        }
        if self.pipeline.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.pipeline.splits.is_empty() {
            bail!("at least one split must be configured");
        }
        if self.pipeline.fragment_extension.is_empty()
            || self.pipeline.fragment_extension.contains(['/', '\\', '.'])
        {
            bail!(
                "invalid fragment extension {:?}",
                self.pipeline.fragment_extension
            );
        }
        Ok(())
    }
}
