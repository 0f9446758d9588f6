//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `AttendanceService`.
///
/// Already-checked-in and empty-snack cases are outcomes, not errors; only a
/// failing backend ends up here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttendanceServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `VocabService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VocabServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("database URL cannot be empty")]
    EmptyDatabaseUrl,
    #[error("invalid database URL: {raw}")]
    InvalidDatabaseUrl { raw: String },
    #[error("invalid value for {name}: {raw}")]
    InvalidFlag { name: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("failed to prepare database file: {0}")]
    Io(#[from] std::io::Error),
}
