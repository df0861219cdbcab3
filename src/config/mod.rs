//! Configuration module for EDMAS.
//!
//! Structured configuration loading from environment variables, organized by
//! concern: document store, agent restore behavior, and observability.

mod observability_config;
mod store_config;

pub use observability_config::ObservabilityEnvConfig;
pub use store_config::{DEFAULT_DATABASE_URL, DEFAULT_PROJECT_ID, StoreEnvConfig};

use anyhow::Result;
use std::str::FromStr;

/// What an agent does when its stored state cannot be decoded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// Log the problem and start from a fresh snapshot
    #[default]
    Fresh,
    /// Refuse to start
    Fail,
}

impl FromStr for RestorePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fresh" => Ok(RestorePolicy::Fresh),
            "fail" => Ok(RestorePolicy::Fail),
            _ => anyhow::bail!(
                "Invalid EDMAS_RESTORE_POLICY: {}. Must be 'fresh' or 'fail'",
                s
            ),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub store: StoreEnvConfig,
    pub restore_policy: RestorePolicy,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let restore_policy = match get("EDMAS_RESTORE_POLICY") {
            Some(value) => RestorePolicy::from_str(&value)?,
            None => RestorePolicy::default(),
        };

        Ok(Self {
            store: StoreEnvConfig::from_source(&get),
            restore_policy,
            observability: ObservabilityEnvConfig::from_source(&get),
        })
    }
}
