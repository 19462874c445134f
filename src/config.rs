//! Configuration management for the APA102 strip driver.
//!
//! Handles loading, saving, and validating configuration from JSON files.

use crate::strip::gpio::{pins, DEFAULT_CHIP};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/apa102-gpio/config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Strip wiring and startup behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StripConfig {
    /// GPIO chip carrying the lines (path or name)
    #[serde(default = "default_chip")]
    pub chip: String,

    /// Clock line offset (BCM numbering)
    #[serde(default = "default_clock_line")]
    pub clock_line: u8,

    /// Data line offset (BCM numbering)
    #[serde(default = "default_data_line")]
    pub data_line: u8,

    /// Number of LEDs in the chain
    #[serde(default = "default_led_count")]
    pub led_count: usize,

    /// Turn all LEDs off when the strip is opened
    #[serde(default)]
    pub reset_on_init: bool,
}

fn default_chip() -> String {
    DEFAULT_CHIP.to_string()
}

fn default_clock_line() -> u8 {
    pins::CLK
}

fn default_data_line() -> u8 {
    pins::DATA
}

fn default_led_count() -> usize {
    1
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            chip: default_chip(),
            clock_line: default_clock_line(),
            data_line: default_data_line(),
            led_count: default_led_count(),
            reset_on_init: false,
        }
    }
}

impl StripConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: StripConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file atomically
    ///
    /// Writes to a temporary file first and renames it into place, so a
    /// power cut never leaves a half-written config behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)?;

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ConfigError::ReadError(e)
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chip.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "GPIO chip cannot be empty".to_string(),
            ));
        }

        if self.clock_line == self.data_line {
            return Err(ConfigError::ValidationError(format!(
                "Clock and data must be different lines (both set to {})",
                self.clock_line
            )));
        }

        Ok(())
    }
}
