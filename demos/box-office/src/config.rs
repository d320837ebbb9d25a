//! Configuration management for the box office.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::checkout::DEFAULT_PAYMENT_DELAY;
use crate::environment::{EntropySeeds, SeedSource, SequentialSeeds};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "box_office=info,marquee_runtime=warn";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// First seat map seed (`BOX_OFFICE_SEED`); entropy when unset
    pub seed: Option<u64>,
    /// Simulated payment time in milliseconds (`BOX_OFFICE_PAYMENT_DELAY_MS`)
    pub payment_delay_ms: u64,
    /// Catalog file to load instead of the demo events (`BOX_OFFICE_CATALOG`)
    pub catalog_path: Option<PathBuf>,
    /// Tracing filter directives (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            payment_delay_ms: u64::try_from(DEFAULT_PAYMENT_DELAY.as_millis()).unwrap_or(1500),
            catalog_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            seed: lookup("BOX_OFFICE_SEED").and_then(|s| s.trim().parse().ok()),
            payment_delay_ms: lookup("BOX_OFFICE_PAYMENT_DELAY_MS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.payment_delay_ms),
            catalog_path: lookup("BOX_OFFICE_CATALOG")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_filter: lookup("RUST_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Simulated payment time
    #[must_use]
    pub const fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Seed source for booking flows
    #[must_use]
    pub fn seed_source(&self) -> Arc<dyn SeedSource> {
        match self.seed {
            Some(start) => Arc::new(SequentialSeeds::new(start)),
            None => Arc::new(EntropySeeds),
        }
    }
}
