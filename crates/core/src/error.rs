use thiserror::Error;

/// Main error type for bggstats operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if error is a data-unavailable error
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Error::DataUnavailable(_))
    }
}
