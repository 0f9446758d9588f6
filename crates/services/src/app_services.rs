use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::attendance_service::AttendanceService;
use crate::config::{CompanionConfig, is_in_memory_url};
use crate::error::{AppServicesError, ConfigError};
use crate::logging::init_tracing;
use crate::vocab_service::VocabService;

/// Assembles the engine services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    attendance: Arc<AttendanceService>,
    vocab: Arc<VocabService>,
}

impl AppServices {
    /// Build services over an already-open storage backend.
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, seed_starter_deck: bool) -> Self {
        let attendance = Arc::new(AttendanceService::new(
            clock,
            Arc::clone(&storage.documents),
        ));
        let vocab = Arc::new(
            VocabService::new(Arc::clone(&storage.documents)).with_starter_deck(seed_starter_deck),
        );
        Self { attendance, vocab }
    }

    /// Build services backed by an in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, &Storage::in_memory(), false)
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database file cannot be prepared or
    /// storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        seed_starter_deck: bool,
    ) -> Result<Self, AppServicesError> {
        prepare_sqlite_file(db_url)?;
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(db_url, "engine storage ready");
        Ok(Self::new(clock, &storage, seed_starter_deck))
    }

    /// Build services from validated configuration using the system clock.
    ///
    /// Installs the global `tracing` subscriber with the configured filter
    /// unless the host already installed one.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn from_config(config: &CompanionConfig) -> Result<Self, AppServicesError> {
        let installed = init_tracing(config.log_filter());
        tracing::debug!(installed, filter = config.log_filter(), "tracing configured");
        Self::new_sqlite(
            config.database_url(),
            Clock::default_clock(),
            config.seed_starter_deck(),
        )
        .await
    }

    #[must_use]
    pub fn attendance(&self) -> Arc<AttendanceService> {
        Arc::clone(&self.attendance)
    }

    #[must_use]
    pub fn vocab(&self) -> Arc<VocabService> {
        Arc::clone(&self.vocab)
    }
}

/// Make sure the parent directory and the database file exist before connecting.
fn prepare_sqlite_file(db_url: &str) -> Result<(), AppServicesError> {
    if is_in_memory_url(db_url) {
        return Ok(());
    }

    let path = db_url.strip_prefix("sqlite://").ok_or_else(|| {
        ConfigError::InvalidDatabaseUrl {
            raw: db_url.to_string(),
        }
    })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDatabaseUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDraft;
    use practice_core::time::fixed_clock;

    #[tokio::test]
    async fn in_memory_services_share_storage() {
        let services = AppServices::in_memory(fixed_clock());
        services.vocab().import_bulk("a - 1").await.unwrap();
        let clone = services.clone();
        assert_eq!(clone.vocab().deck().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn from_config_opens_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("companion.sqlite3");
        let config = ConfigDraft {
            database_url: Some(format!("sqlite:{}", path.display())),
            log_filter: Some("warn".to_owned()),
            seed_starter_deck: Some(true),
        }
        .validate()
        .unwrap();

        let services = AppServices::from_config(&config).await.unwrap();
        assert!(path.exists());
        assert_eq!(services.vocab().deck().await.unwrap().len(), 3);
        assert!(services.attendance().can_check_in_today().await.unwrap());
    }

    #[test]
    fn prepare_rejects_non_sqlite_urls() {
        let err = prepare_sqlite_file("postgres://localhost/db").unwrap_err();
        assert!(matches!(err, AppServicesError::Config(_)));
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("practice.sqlite3");
        let url = format!("sqlite://{}", path.display());

        prepare_sqlite_file(&url).unwrap();
        assert!(path.exists());
    }
}
