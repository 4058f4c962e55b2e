//! Configuration loading and representation.
//!
//! All settings come from `HEMOLINK_*` environment variables; every one has a
//! default so the service starts with no configuration at all.

use std::net::SocketAddr;
use std::path::PathBuf;

use hemolink_stock::{FixedBreakpointPolicy, MinimumThresholdPolicy, StockPolicy};
use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "HEMOLINK_BIND_ADDR";
pub const DATA_DIR_VAR: &str = "HEMOLINK_DATA_DIR";
pub const STATUS_POLICY_VAR: &str = "HEMOLINK_STATUS_POLICY";
pub const DONATION_REWARD_VAR: &str = "HEMOLINK_DONATION_REWARD";
pub const SEED_VAR: &str = "HEMOLINK_SEED";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Points credited to a donor per completed donation.
pub const DEFAULT_DONATION_REWARD: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Directory of the JSON file store. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub status_policy: StockPolicy,
    pub donation_reward: u32,
    /// Load sample data when the store is empty.
    pub seed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            data_dir: None,
            status_policy: StockPolicy::default(),
            donation_reward: DEFAULT_DONATION_REWARD,
            seed: true,
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(raw) = non_empty(lookup(BIND_ADDR_VAR)) {
            config.bind_addr = raw
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid(BIND_ADDR_VAR, &raw, e.to_string()))?;
        }

        config.data_dir = non_empty(lookup(DATA_DIR_VAR)).map(PathBuf::from);

        if let Some(raw) = non_empty(lookup(STATUS_POLICY_VAR)) {
            config.status_policy = parse_policy(&raw)?;
        }

        if let Some(raw) = non_empty(lookup(DONATION_REWARD_VAR)) {
            config.donation_reward = raw
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(DONATION_REWARD_VAR, &raw, e.to_string()))?;
        }

        if let Some(raw) = non_empty(lookup(SEED_VAR)) {
            config.seed = parse_bool(SEED_VAR, &raw)?;
        }

        Ok(config)
    }
}

fn parse_policy(raw: &str) -> Result<StockPolicy, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "threshold" | "minimum" => Ok(StockPolicy::MinimumThreshold(MinimumThresholdPolicy)),
        "breakpoints" | "fixed" => Ok(StockPolicy::FixedBreakpoints(FixedBreakpointPolicy::default())),
        _ => Err(invalid(
            STATUS_POLICY_VAR,
            raw,
            "expected `threshold` or `breakpoints`".to_string(),
        )),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw, "expected a boolean".to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn invalid(var: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    }
}
