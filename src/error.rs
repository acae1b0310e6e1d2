// Error taxonomy for the reservation core and the account store.
// Every variant is recoverable: the front end decides how to show it and
// whether to re-prompt.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReservationError {
    /// Category choice matched none of Standard/Deluxe/Suite
    #[error("invalid room category: {0:?}")]
    InvalidCategory(String),

    /// Night count was zero or negative
    #[error("number of nights must be at least 1 (got {0})")]
    InvalidNights(i64),

    /// Not one of the twelve calendar month names
    #[error("invalid month: {0:?}")]
    InvalidMonth(String),

    #[error("you have no reservations")]
    NoReservations,

    /// Display index outside `1..=count`
    #[error("invalid selection {index}: choose between 1 and {count}")]
    InvalidSelection { index: usize, count: usize },

    /// The reservations file could not be written; the in-memory change was
    /// rolled back.
    #[error("failed to write reservations to {}", .path.display())]
    PersistenceWriteFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum AccountError {
    /// Empty after trimming, or contains the field delimiter
    #[error("invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("username {0:?} is already taken")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("failed to write accounts to {}", .path.display())]
    PersistenceWriteFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
