//! Engine configuration.
//!
//! Kept deliberately small: all commission parameters live in the database
//! (product rates, rank shares), not here. This covers only engine-level
//! switches the operator may want to tune per deployment.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Write ledger rows for evaluated roles even when the amount is zero.
    /// Keeps a record that the role was considered during the split.
    #[serde(default = "default_record_zero_amounts")]
    pub record_zero_amounts: bool,

    /// SQLite busy timeout. Racing writers on the same database wait this
    /// long for the write lock before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub db_busy_timeout_ms: u64,
}

fn default_record_zero_amounts() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            record_zero_amounts: default_record_zero_amounts(),
            db_busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file, e.g. the runner's `--config` flag.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
