//! Configuration for CaskKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CaskError, Result};

/// Main configuration for a CaskKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every segment file of the store
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── 01760000000000000001.data   (archived)
    ///     └── 01760000000000000002.data   (active this session)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the active segment
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Recovery Configuration
    // -------------------------------------------------------------------------
    /// Read buffer capacity used while scanning segments on open (bytes)
    pub scan_buffer_size: usize,
}

/// Active segment sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every record (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records
    EveryNWrites { count: usize },

    /// Never fsync explicitly; the OS flushes dirty pages on its own schedule
    OsManaged,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./caskkv_data"),
            sync_strategy: SyncStrategy::OsManaged,
            scan_buffer_size: 64 * 1024, // 64 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the store cannot run with
    pub fn validate(&self) -> Result<()> {
        if let SyncStrategy::EveryNWrites { count: 0 } = self.sync_strategy {
            return Err(CaskError::Config(
                "EveryNWrites sync count must be at least 1".to_string(),
            ));
        }
        if self.scan_buffer_size == 0 {
            return Err(CaskError::Config(
                "scan_buffer_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the recovery scan buffer size (in bytes)
    pub fn scan_buffer_size(mut self, size: usize) -> Self {
        self.config.scan_buffer_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
