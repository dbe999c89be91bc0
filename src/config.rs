//! Runtime configuration shared by the library and the `qrinv` binary

use std::path::{Path, PathBuf};

use crate::inventory::StoreOptions;
use crate::scanner::ScanConfig;

/// Default location of the record file
pub const DEFAULT_DATA_FILE: &str = "inventory.csv";

/// Settings for an [`Inventory`](crate::inventory::Inventory).
///
/// The library never reads the environment; the binary fills this from its
/// command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// CSV file backing the record store
    pub data_file: PathBuf,
    /// Reject inserts whose code already exists
    pub enforce_unique_codes: bool,
    /// Longest image side fed to the decoder; `None` keeps full resolution
    pub max_scan_dimension: Option<u32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            enforce_unique_codes: false,
            max_scan_dimension: ScanConfig::default().max_dimension,
        }
    }
}

impl InventoryConfig {
    /// Defaults with a different data file
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            ..Self::default()
        }
    }

    /// Turn the duplicate-code check on or off
    pub fn with_unique_codes(mut self, enforce: bool) -> Self {
        self.enforce_unique_codes = enforce;
        self
    }

    /// Set the downscale limit for scanned images
    pub fn with_max_scan_dimension(mut self, max: Option<u32>) -> Self {
        self.max_scan_dimension = max;
        self
    }

    /// Path of the record file
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Store options derived from this configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            enforce_unique_codes: self.enforce_unique_codes,
        }
    }

    /// Scanner settings derived from this configuration
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            max_dimension: self.max_scan_dimension,
        }
    }
}
