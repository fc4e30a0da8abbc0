//! Error types for placebook.
//!
//! This module defines the crate-wide error type. Form validation failures
//! have their own enum ([`ValidationError`]) which is wrapped here so callers
//! can propagate it with `?`. Map service failures
//! ([`ServiceError`](crate::services::ServiceError)) never reach this type:
//! a failed lookup only leaves the location unset.

use std::path::PathBuf;
use thiserror::Error;

use crate::form::ValidationError;
use crate::place::PlaceId;

/// The main error type for placebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to bring the schema up to date.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Closing the database connection failed.
    #[error("failed to close database: {0}")]
    DatabaseClose(#[source] rusqlite::Error),

    /// The store could not be initialized at startup.
    #[error("place store is unavailable (initialization failed at startup)")]
    StoreUnavailable,

    /// No place with the given id exists.
    #[error("no place with id {id}")]
    PlaceNotFound {
        /// The id that was looked up.
        id: PlaceId,
    },

    // === Input Errors ===
    /// A place draft was incomplete or invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for placebook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Check if this error came from form validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the local store.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DatabaseClose(_)
                | Self::StoreUnavailable
                | Self::DirectoryCreate { .. }
        )
    }
}
