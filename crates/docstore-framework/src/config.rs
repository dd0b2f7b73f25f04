//! # Store Configuration
//!
//! Channel sizes for the in-memory store and the diagnostics feed. Defaults suit tests and
//! the demo; deployments can override them through the environment.
//!
//! Capacities are [`NonZeroUsize`]: Tokio channels panic on a zero capacity, so a zero is
//! rejected wherever a config is built (deserialization, the environment, the builders).

use serde::Deserialize;
use std::num::NonZeroUsize;
use tracing::warn;

/// Environment variable overriding [`StoreConfig::channel_capacity`].
pub const CHANNEL_CAPACITY_VAR: &str = "DOCSTORE_CHANNEL_CAPACITY";

/// Environment variable overriding [`StoreConfig::diagnostics_capacity`].
pub const DIAGNOSTICS_CAPACITY_VAR: &str = "DOCSTORE_DIAGNOSTICS_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of the store actor's request channel. When it is full, callers wait.
    pub channel_capacity: NonZeroUsize,
    /// How many diagnostics a slow subscriber may lag behind before it starts missing them.
    pub diagnostics_capacity: NonZeroUsize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: capacity(32),
            diagnostics_capacity: capacity(256),
        }
    }
}

pub(crate) fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

impl StoreConfig {
    /// Defaults, overridden by `DOCSTORE_*` environment variables when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            channel_capacity: capacity_from_env(CHANNEL_CAPACITY_VAR, defaults.channel_capacity),
            diagnostics_capacity: capacity_from_env(
                DIAGNOSTICS_CAPACITY_VAR,
                defaults.diagnostics_capacity,
            ),
        }
    }

    pub fn with_channel_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_diagnostics_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.diagnostics_capacity = capacity;
        self
    }
}

fn capacity_from_env(var: &str, default: NonZeroUsize) -> NonZeroUsize {
    match std::env::var(var) {
        Ok(raw) => parse_capacity(&raw).unwrap_or_else(|| {
            warn!(var, value = %raw, default = default.get(), "Ignoring invalid capacity");
            default
        }),
        Err(_) => default,
    }
}

fn parse_capacity(raw: &str) -> Option<NonZeroUsize> {
    raw.trim().parse().ok()
}
