use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};
use parking_lot::Mutex;

use super::record::{HEADER, InventoryRecord, NewRecord};
use super::stats::Statistics;
use crate::error::{StoreError, StoreResult};

/// Source of creation timestamps
pub type Clock = fn() -> NaiveDateTime;

/// Current local time, truncated to whole seconds
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Behaviour switches of a [`RecordStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject inserts whose code is already present
    pub enforce_unique_codes: bool,
}

/// CSV-backed record collection.
///
/// Every read loads the whole file and every insert rewrites it through a
/// temporary sibling that is renamed over the target. One store value
/// serialises its own read-modify-write cycles; separate processes writing
/// the same file are not coordinated.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    options: StoreOptions,
    clock: Clock,
    lock: Mutex<()>,
}

impl RecordStore {
    /// Store backed by `path`. Nothing touches the disk until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: StoreOptions::default(),
            clock: local_now,
            lock: Mutex::new(()),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current options
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// All records in file order. Creates an empty file on first access.
    pub fn load(&self) -> StoreResult<Vec<InventoryRecord>> {
        let _guard = self.lock.lock();
        self.read_all()
    }

    /// First record whose code equals `code` exactly
    pub fn lookup(&self, code: &str) -> StoreResult<Option<InventoryRecord>> {
        let found = self.load()?.into_iter().find(|record| record.code == code);
        tracing::debug!(code, found = found.is_some(), "lookup");
        Ok(found)
    }

    /// Append a record stamped with the store clock and persist the collection
    pub fn insert(&self, new: NewRecord) -> StoreResult<InventoryRecord> {
        new.validate()?;

        let _guard = self.lock.lock();
        let mut records = self.read_all()?;
        if self.options.enforce_unique_codes && records.iter().any(|r| r.code == new.code) {
            return Err(StoreError::DuplicateCode { code: new.code });
        }

        let record = new.into_record((self.clock)());
        records.push(record.clone());
        self.write_all(&records)?;

        tracing::info!(
            code = %record.code,
            category = %record.category,
            total = records.len(),
            "record created"
        );
        Ok(record)
    }

    /// Totals with "today" taken from the store clock
    pub fn statistics(&self) -> StoreResult<Statistics> {
        self.statistics_on((self.clock)().date())
    }

    /// Totals with an explicit reference date
    pub fn statistics_on(&self, today: NaiveDate) -> StoreResult<Statistics> {
        Ok(Statistics::compute(&self.load()?, today))
    }

    /// Write the collection in the persisted CSV layout; returns the row count
    pub fn export<W: io::Write>(&self, writer: W) -> StoreResult<usize> {
        let records = self.load()?;
        let mut csv = csv_writer(writer);
        write_rows(&mut csv, &records)?;
        csv.flush()?;
        Ok(records.len())
    }

    /// Read the file, creating it with just the header when missing
    fn read_all(&self) -> StoreResult<Vec<InventoryRecord>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "creating empty record file");
            self.write_all(&[])?;
        }

        let mut reader = csv::ReaderBuilder::new().from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<InventoryRecord>, _>>()?;
        tracing::trace!(path = %self.path.display(), records = records.len(), "loaded");
        Ok(records)
    }

    /// Replace the file atomically with `records`
    fn write_all(&self, records: &[InventoryRecord]) -> StoreResult<()> {
        let tmp = self.temp_path()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let result = (|| -> StoreResult<()> {
            let mut csv = csv_writer(fs::File::create(&tmp)?);
            write_rows(&mut csv, records)?;
            let file = csv.into_inner().map_err(|err| err.into_error())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        })();

        if result.is_err() && tmp.exists() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// `.name.tmp` next to the target
    fn temp_path(&self) -> StoreResult<PathBuf> {
        let name = self.path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file path", self.path.display()),
            )
        })?;
        Ok(self
            .path
            .with_file_name(format!(".{}.tmp", name.to_string_lossy())))
    }
}

/// The header is written by hand so an empty collection still gets one
fn csv_writer<W: io::Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(writer)
}

fn write_rows<W: io::Write>(csv: &mut csv::Writer<W>, records: &[InventoryRecord]) -> StoreResult<()> {
    csv.write_record(HEADER)?;
    for record in records {
        csv.serialize(record)?;
    }
    Ok(())
}
