//! Configuration for the gm-core session-state system.
//!
//! Maps directly to `gm.toml`. Every field has a serde default so a partial
//! (or empty) file is valid.

use serde::{Deserialize, Serialize};

/// Top-level gm-core configuration, loadable from TOML.
///
/// Subscriber/log-output setup belongs to the embedding application; this
/// crate only emits `tracing` events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GmConfig {
    /// Backing-store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Operation behavior settings.
    #[serde(default)]
    pub ops: OpsConfig,
}

impl GmConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `GmError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::GmError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// SQLite backing-store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Enable WAL journaling for concurrent reads during play.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout_ms: 5000,
        }
    }
}

/// Behavior of the read-modify-write operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    /// How many times an operation re-reads and re-applies its mutation
    /// after a version conflict before giving up.
    #[serde(default = "default_write_attempts")]
    pub max_write_attempts: u32,
    /// Display name substituted when a combatant's name cannot be resolved
    /// while rendering a history description.
    #[serde(default = "default_unknown_combatant")]
    pub unknown_combatant_name: String,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 3,
            unknown_combatant_name: "an unknown combatant".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_write_attempts() -> u32 {
    3
}

fn default_unknown_combatant() -> String {
    "an unknown combatant".to_string()
}
