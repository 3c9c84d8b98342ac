//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The `[estimator]` section only supplies default toggles; every
//! computation still receives its options explicitly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::types::{EstimateOptions, ScratcherError};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub estimator: EstimatorConfig,
    pub fetch: FetchConfig,
    pub snapshot: SnapshotConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EstimatorConfig {
    #[serde(default = "default_true")]
    pub include_small_prizes: bool,
    #[serde(default)]
    pub apply_tax: bool,
    #[serde(default)]
    pub tax_rate_percent: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    pub enabled: bool,
    pub listing_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "scratcher-ev/0.1.0".to_string()
}

impl EstimatorConfig {
    /// Default toggles for computations that don't specify their own.
    pub fn default_options(&self) -> EstimateOptions {
        EstimateOptions {
            include_small_prizes: self.include_small_prizes,
            apply_tax: self.apply_tax,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Parse and validate configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ScratcherError> {
        let rate = self.estimator.tax_rate_percent;
        if !rate.is_finite() || !(0.0..100.0).contains(&rate) {
            return Err(ScratcherError::Config(format!(
                "estimator.tax_rate_percent must be in [0, 100), got {rate}"
            )));
        }
        if self.fetch.enabled && self.fetch.listing_url.trim().is_empty() {
            return Err(ScratcherError::Config(
                "fetch.listing_url is required when fetch is enabled".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ScratcherError::Config("fetch.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
