// 🗄️ Reservation Record Store
//
// In-memory ordered collection of reservations plus the flat file that
// mirrors it. Every mutation rewrites the whole file before returning.
//
// File format (headerless CSV, one reservation per line):
//   username,roomCategory,nights,totalPrice,month
//   alice,Standard,3,3000.00,January

use crate::error::ReservationError;
use crate::pricing::{self, RoomCategory};
use crate::season;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize, Serializer};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const RESERVATION_FIELDS: usize = 5;

// ============================================================================
// RESERVATION RECORD
// ============================================================================

/// One booking. `total_price` is always derived from category, nights and
/// month; it is never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Username of the account that made the booking
    pub owner: String,

    /// Fixed at booking time
    pub category: RoomCategory,

    pub nights: u32,

    /// Persisted with exactly two decimals
    #[serde(serialize_with = "serialize_price")]
    pub total_price: f64,

    /// Canonical month name ("January")
    pub month: String,
}

fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:.2}", price))
}

impl Reservation {
    /// Build a reservation and compute its price.
    ///
    /// `month` must already be a valid month name (any case); it is stored in
    /// canonical form.
    pub fn priced(owner: &str, category: RoomCategory, nights: u32, month: &str) -> Self {
        let month = season::normalize_month(month);
        let total_price = pricing::price(category, nights, season::is_peak_season(&month));

        Reservation {
            owner: owner.to_string(),
            category,
            nights,
            total_price,
            month,
        }
    }

    pub fn is_peak_season(&self) -> bool {
        season::is_peak_season(&self.month)
    }
}

// ============================================================================
// CSV CODEC
// ============================================================================

/// A persisted line that was dropped while loading
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
}

/// Result of parsing a reservations file
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub reservations: Vec<Reservation>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse reservations, skipping malformed lines instead of failing.
pub fn read_records<R: Read>(reader: R) -> ParsedRecords {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedRecords::default();
    let mut record = StringRecord::new();

    loop {
        let line = rdr.position().line();
        match rdr.read_record(&mut record) {
            Ok(true) => match parse_reservation(&record) {
                Ok(reservation) => parsed.reservations.push(reservation),
                Err(reason) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(line);
                    parsed.skipped.push(SkippedLine { line, reason });
                }
            },
            Ok(false) => break,
            Err(e) if e.is_io_error() => {
                parsed.skipped.push(SkippedLine {
                    line,
                    reason: e.to_string(),
                });
                break;
            }
            Err(e) => parsed.skipped.push(SkippedLine {
                line,
                reason: e.to_string(),
            }),
        }
    }

    parsed
}

fn parse_reservation(record: &StringRecord) -> std::result::Result<Reservation, String> {
    if record.len() != RESERVATION_FIELDS {
        return Err(format!(
            "expected {} fields, found {}",
            RESERVATION_FIELDS,
            record.len()
        ));
    }

    let mut reservation: Reservation = record.deserialize(None).map_err(|e| e.to_string())?;

    if reservation.nights == 0 {
        return Err("nights must be at least 1".to_string());
    }
    if !reservation.total_price.is_finite() || reservation.total_price < 0.0 {
        return Err(format!("invalid total price {}", reservation.total_price));
    }
    if !season::is_valid_month(&reservation.month) {
        return Err(format!("invalid month {:?}", reservation.month));
    }
    reservation.month = season::normalize_month(&reservation.month);

    Ok(reservation)
}

/// Serialize reservations, one line each, prices with two decimals.
pub fn write_records<W: Write>(writer: W, records: &[Reservation]) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    for reservation in records {
        wtr.serialize(reservation)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a file by filling a sibling `.tmp` file and renaming it over the
/// target, so readers never observe a half-written file.
pub(crate) fn replace_file<F>(path: &Path, fill: F) -> csv::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> csv::Result<()>,
{
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);

    let result = (|| -> csv::Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        fill(&mut writer)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", tmp_path.display(), e);
            }
        }
    }

    result
}

/// Open `path` for reading; a missing file reads as empty.
pub(crate) fn open_if_exists(path: &Path) -> io::Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

// ============================================================================
// BACKENDS
// ============================================================================

/// Where the reservation collection is persisted
pub trait ReservationBackend {
    /// Read every persisted reservation
    fn load(&self) -> Result<ParsedRecords>;

    /// Overwrite persisted state with `records`
    fn save(&mut self, records: &[Reservation]) -> std::result::Result<(), ReservationError>;
}

/// Flat file on disk
#[derive(Debug, Clone)]
pub struct CsvFileBackend {
    path: PathBuf,
}

impl CsvFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReservationBackend for CsvFileBackend {
    fn load(&self) -> Result<ParsedRecords> {
        let file = open_if_exists(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        Ok(file.map(read_records).unwrap_or_default())
    }

    fn save(&mut self, records: &[Reservation]) -> std::result::Result<(), ReservationError> {
        replace_file(&self.path, |w| write_records(w, records)).map_err(|source| {
            ReservationError::PersistenceWriteFailure {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// In-memory buffer using the same line format as the file backend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    buffer: Vec<u8>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing file contents
    pub fn from_text(text: &str) -> Self {
        MemoryBackend {
            buffer: text.as_bytes().to_vec(),
        }
    }

    /// Current persisted contents
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

impl ReservationBackend for MemoryBackend {
    fn load(&self) -> Result<ParsedRecords> {
        Ok(read_records(self.buffer.as_slice()))
    }

    fn save(&mut self, records: &[Reservation]) -> std::result::Result<(), ReservationError> {
        let mut buffer = Vec::new();
        write_records(&mut buffer, records).map_err(|source| {
            ReservationError::PersistenceWriteFailure {
                path: PathBuf::from("<memory>"),
                source,
            }
        })?;
        self.buffer = buffer;
        Ok(())
    }
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Sole owner of the reservation collection and its persisted copy.
///
/// Mutations are flushed synchronously. If the flush fails the in-memory
/// change is undone, so memory and storage never diverge.
pub struct ReservationStore<B: ReservationBackend> {
    backend: B,
    records: Vec<Reservation>,
    skipped: Vec<SkippedLine>,
}

impl<B: ReservationBackend> ReservationStore<B> {
    /// Load the collection from `backend`
    pub fn open(backend: B) -> Result<Self> {
        let mut store = ReservationStore {
            backend,
            records: Vec::new(),
            skipped: Vec::new(),
        };
        store.load_all()?;
        Ok(store)
    }

    /// Replace the in-memory collection with what the backend holds.
    /// Malformed lines are skipped and logged.
    pub fn load_all(&mut self) -> Result<&[Reservation]> {
        let parsed = self.backend.load().context("Failed to load reservations")?;

        for skipped in &parsed.skipped {
            log::warn!(
                "Skipping malformed reservation on line {}: {}",
                skipped.line,
                skipped.reason
            );
        }

        self.records = parsed.reservations;
        self.skipped = parsed.skipped;
        Ok(&self.records)
    }

    /// Rewrite persisted state from the in-memory collection
    pub fn save_all(&mut self) -> std::result::Result<(), ReservationError> {
        self.backend.save(&self.records).inspect_err(|e| {
            log::error!("{}", e);
        })
    }

    pub fn records(&self) -> &[Reservation] {
        &self.records
    }

    /// Lines dropped by the last load
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, reservation: Reservation) -> std::result::Result<(), ReservationError> {
        self.records.push(reservation);

        if let Err(e) = self.save_all() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Swap the record at `index`, returning the previous value
    pub fn replace(
        &mut self,
        index: usize,
        reservation: Reservation,
    ) -> std::result::Result<Reservation, ReservationError> {
        let slot = self.slot(index)?;
        let previous = std::mem::replace(&mut self.records[slot], reservation);

        if let Err(e) = self.save_all() {
            self.records[slot] = previous;
            return Err(e);
        }
        Ok(previous)
    }

    pub fn remove_at(&mut self, index: usize) -> std::result::Result<Reservation, ReservationError> {
        let slot = self.slot(index)?;
        let removed = self.records.remove(slot);

        if let Err(e) = self.save_all() {
            self.records.insert(slot, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Owner's reservations in collection order, paired with their internal
    /// index. Indices are only valid until the next mutation.
    pub fn find_by_owner(&self, owner: &str) -> Vec<(usize, &Reservation)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.owner == owner)
            .collect()
    }

    fn slot(&self, index: usize) -> std::result::Result<usize, ReservationError> {
        if index < self.records.len() {
            Ok(index)
        } else {
            Err(ReservationError::InvalidSelection {
                index,
                count: self.records.len(),
            })
        }
    }
}
