//! Inventory records keyed by QR payload
//!
//! [`RecordStore`] owns the CSV file; [`Inventory`] adds the find-or-create
//! workflow on top of it and the scanner.

mod record;
mod stats;
mod store;

pub use record::{Category, InventoryRecord, NewRecord, HEADER, TIMESTAMP_FORMAT};
pub use stats::Statistics;
pub use store::{Clock, RecordStore, StoreOptions, local_now};

use std::path::Path;

use crate::config::InventoryConfig;
use crate::error::{Result, StoreResult};
use crate::scanner::{ScanImage, Scanner};

/// Result of resolving a typed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A record carries this code
    Found(InventoryRecord),
    /// No record yet; the code can be registered
    Missing {
        /// The code that was looked up
        code: String,
    },
}

/// Result of resolving a photographed code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanLookup {
    /// No symbol could be decoded in any orientation
    NoSymbol,
    /// Decoded and known
    Found(InventoryRecord),
    /// Decoded but not registered
    Missing {
        /// Decoded payload
        code: String,
    },
}

/// Result of a registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new record was written
    Created(InventoryRecord),
    /// The code was already registered; nothing was written
    AlreadyExists(InventoryRecord),
}

impl Registration {
    /// The stored record in either case
    pub fn record(&self) -> &InventoryRecord {
        match self {
            Registration::Created(record) | Registration::AlreadyExists(record) => record,
        }
    }
}

/// Scanner plus record store
#[derive(Debug)]
pub struct Inventory {
    store: RecordStore,
    scanner: Scanner,
}

impl Inventory {
    /// Build from configuration
    pub fn new(config: &InventoryConfig) -> Self {
        let store = RecordStore::new(config.data_file()).with_options(config.store_options());
        let scanner = Scanner::new().with_config(config.scan_config());
        Self { store, scanner }
    }

    /// Build around an existing store with the default scanner
    pub fn with_store(store: RecordStore) -> Self {
        Self {
            store,
            scanner: Scanner::new(),
        }
    }

    /// Underlying store
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Scanner used by [`Inventory::resolve_image`]
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Look up a code typed by the user
    pub fn resolve_code(&self, code: &str) -> StoreResult<Lookup> {
        Ok(match self.store.lookup(code)? {
            Some(record) => Lookup::Found(record),
            None => Lookup::Missing {
                code: code.to_string(),
            },
        })
    }

    /// Decode `image` and look up its payload
    pub fn resolve_image(&self, image: &ScanImage) -> StoreResult<ScanLookup> {
        let Some(code) = self.scanner.decode(image) else {
            tracing::info!("no QR code found in image");
            return Ok(ScanLookup::NoSymbol);
        };
        Ok(match self.resolve_code(&code)? {
            Lookup::Found(record) => ScanLookup::Found(record),
            Lookup::Missing { code } => ScanLookup::Missing { code },
        })
    }

    /// Decode PNG or JPEG bytes and look up the payload
    pub fn resolve_image_bytes(&self, bytes: &[u8]) -> Result<ScanLookup> {
        let image = ScanImage::from_bytes(bytes)?;
        Ok(self.resolve_image(&image)?)
    }

    /// Read an image file and look up the payload it carries
    pub fn resolve_image_file(&self, path: impl AsRef<Path>) -> Result<ScanLookup> {
        let image = ScanImage::open(path)?;
        Ok(self.resolve_image(&image)?)
    }

    /// Create the record unless its code is already registered
    pub fn register(&self, new: NewRecord) -> StoreResult<Registration> {
        if let Some(existing) = self.store.lookup(&new.code)? {
            tracing::debug!(code = %new.code, "already registered");
            return Ok(Registration::AlreadyExists(existing));
        }
        self.store.insert(new).map(Registration::Created)
    }
}
