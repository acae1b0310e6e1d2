// Hotel Reservations - Core Library
// Pricing, season rules, the reservation store and lifecycle, and accounts.
// Used by the terminal front end and the tests.

pub mod accounts;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod season;
pub mod store;

// Re-export commonly used types
pub use accounts::{Account, AccountStore};
pub use config::StoreConfig;
pub use error::{AccountError, ReservationError};
pub use lifecycle::{
    summarize_by_owner, AdminSummary, OwnerSummary, ReservationManager, ReservationUpdate,
};
pub use pricing::{price, RoomCategory, PEAK_SURCHARGE};
pub use season::{is_peak_season, is_valid_month, normalize_month, parse_month};
pub use store::{
    read_records, write_records, CsvFileBackend, MemoryBackend, ParsedRecords, Reservation,
    ReservationBackend, ReservationStore, SkippedLine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
