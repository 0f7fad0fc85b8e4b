//! Configuration loading from TOML files

mod constants;
mod kit;
mod scenario;

pub use constants::SearchConstants;
pub use kit::{
    default_kit, load_kit_config, parse_kit_config, AbilityConfig, BaseStatsConfig, BasicAttackConfig,
    EmpowerConfig, KitConfig, VitalConfig,
};
pub use scenario::{load_scenario, parse_scenario, Scenario, ScenarioParts, TargetConfig};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
