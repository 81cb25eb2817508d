//! Error handling for horscan
//!
//! Configuration and table-schema problems invalidate the whole run and are
//! surfaced to the caller before any scanning starts. Shape problems inside a
//! single array are recovered locally by the array builder (skip and count)
//! and never reach this type.

use thiserror::Error;

/// Error type for all horscan operations
#[derive(Error, Debug)]
pub enum HorScanError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Monomer table parsing errors from the csv reader
    #[error("Monomer table error: {0}")]
    Table(#[from] csv::Error),

    /// Structurally invalid monomer table (missing columns, bad values)
    #[error("Invalid monomer table at line {line}: {message}")]
    InvalidTable { line: usize, message: String },

    /// Detection parameters outside their valid ranges
    #[error("Invalid detection parameters: {0}")]
    InvalidParams(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Thread pool build error: {0}")]
    ThreadPoolBuild(#[from] rayon::ThreadPoolBuildError),
}

impl HorScanError {
    /// Create an InvalidTable error with line number and message
    pub fn invalid_table(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidTable {
            line,
            message: message.into(),
        }
    }

    /// Create an InvalidParams error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an I/O error from a plain message
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            message.into(),
        ))
    }
}

/// Result type alias for horscan operations
pub type Result<T> = std::result::Result<T, HorScanError>;
