//! Configuration
//!
//! TOML configuration for the parts of the engine that are tunable: the
//! two byte-rate budget tiers and logging. The protocol admission tables
//! (listening ports, admitted ICMP/ICMPv6 types, egress peer ports) are
//! fixed policy and deliberately not configurable here.

use crate::telemetry::LogConfig;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration (config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Budget tier configuration. Rates are bytes per second, bursts are
/// bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitConfig {
    #[serde(default = "default_primary_rate")]
    pub primary_rate: u64,
    #[serde(default = "default_primary_burst")]
    pub primary_burst: u64,
    #[serde(default = "default_secondary_rate")]
    pub secondary_rate: u64,
    #[serde(default = "default_secondary_burst")]
    pub secondary_burst: u64,
}

// 100 Mbit/s primary with a one-MTU-heavy burst; the secondary tier gets
// 1% of that, which is plenty for echo traffic and path-MTU errors.
fn default_primary_rate() -> u64 {
    12_500_000
}
fn default_primary_burst() -> u64 {
    1_500_000
}
fn default_secondary_rate() -> u64 {
    125_000
}
fn default_secondary_burst() -> u64 {
    15_000
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            primary_rate: default_primary_rate(),
            primary_burst: default_primary_burst(),
            secondary_rate: default_secondary_rate(),
            secondary_burst: default_secondary_burst(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();
    let limits = &config.limits;

    if limits.primary_rate == 0 || limits.primary_burst == 0 {
        result.error("primary budget rate and burst must be non-zero");
    }
    if limits.secondary_rate == 0 || limits.secondary_burst == 0 {
        result.error("secondary budget rate and burst must be non-zero");
    }
    if limits.secondary_rate >= limits.primary_rate && limits.primary_rate > 0 {
        result.warn(
            "secondary rate is not below the primary rate; \
             the secondary tier no longer restricts fragment/ICMP traffic",
        );
    }
    if limits.primary_burst < 1500 {
        result.warn("primary burst below one MTU; full-size packets will never pass");
    }

    result
}
