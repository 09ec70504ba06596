//! Store configuration via `streamstate.toml`
//!
//! Only file-backed endpoints read a config file. On first connect a default
//! `streamstate.toml` is written into the endpoint's root directory; edit it
//! and reconnect to change settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use streamstate_core::{Error, Result};
use streamstate_storage::wal::DurabilityMode;

/// Config file name placed in the endpoint root directory.
pub const CONFIG_FILE_NAME: &str = "streamstate.toml";

/// Store configuration loaded from `streamstate.toml`.
///
/// # Example
///
/// ```toml
/// # "standard" (default) or "always"
/// durability = "standard"
/// sync_every = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Durability mode: `"standard"` or `"always"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Log records between fsyncs in standard mode.
    #[serde(default = "default_sync_every")]
    pub sync_every: usize,
}

fn default_durability_str() -> String {
    "standard".to_string()
}

fn default_sync_every() -> usize {
    DurabilityMode::DEFAULT_SYNC_EVERY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            sync_every: default_sync_every(),
        }
    }
}

impl StoreConfig {
    /// Parse the durability string into a `DurabilityMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"standard"` or `"always"`, or
    /// if `sync_every` is zero.
    pub fn durability_mode(&self) -> Result<DurabilityMode> {
        match self.durability.as_str() {
            "standard" if self.sync_every == 0 => Err(Error::invalid_input(format!(
                "Invalid sync_every 0 in {}. Expected a positive record count.",
                CONFIG_FILE_NAME
            ))),
            "standard" => Ok(DurabilityMode::Standard {
                sync_every: self.sync_every,
            }),
            "always" => Ok(DurabilityMode::Always),
            other => Err(Error::invalid_input(format!(
                "Invalid durability mode '{}' in {}. Expected \"standard\" or \"always\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Streamstate store configuration
#
# Durability mode: "standard" (default) or "always"
#   "standard" = fsync every `sync_every` log records, may lose the tail on crash
#   "always"   = fsync every write, zero data loss
durability = "standard"

# Log records between fsyncs in standard mode (default: 64)
sync_every = 64
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::unavailable(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.durability_mode()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::unavailable(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::unavailable(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
