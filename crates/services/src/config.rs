//! Runtime configuration for the practice companion.
//!
//! Read from the environment:
//! - `COMPANION_DB_URL`: SQLite URL or path (default `sqlite:companion.sqlite3`)
//! - `COMPANION_LOG`: tracing filter directive (default `info`)
//! - `COMPANION_STARTER_DECK`: seed sample words into an unreadable deck (default off)

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;

pub const DB_URL_ENV: &str = "COMPANION_DB_URL";
pub const LOG_ENV: &str = "COMPANION_LOG";
pub const STARTER_DECK_ENV: &str = "COMPANION_STARTER_DECK";

const DEFAULT_DB_URL: &str = "sqlite:companion.sqlite3";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanionConfig {
    database_url: String,
    log_filter: String,
    seed_starter_deck: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigDraft {
    pub database_url: Option<String>,
    pub log_filter: Option<String>,
    pub seed_starter_deck: Option<bool>,
}

impl ConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is present but blank, or unparseable.
    pub fn validate(self) -> Result<CompanionConfig, ConfigError> {
        let raw_url = match self.database_url {
            Some(url) => normalize_optional(Some(url)).ok_or(ConfigError::EmptyDatabaseUrl)?,
            None => DEFAULT_DB_URL.to_owned(),
        };
        let database_url = normalize_sqlite_url(raw_url);
        if Url::parse(&database_url).is_err() {
            return Err(ConfigError::InvalidDatabaseUrl { raw: database_url });
        }

        let log_filter =
            normalize_optional(self.log_filter).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(CompanionConfig {
            database_url,
            log_filter,
            seed_starter_deck: self.seed_starter_deck.unwrap_or(false),
        })
    }
}

impl CompanionConfig {
    /// Build configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seed_starter_deck = lookup(STARTER_DECK_ENV)
            .map(|raw| parse_flag(STARTER_DECK_ENV, &raw))
            .transpose()?;

        ConfigDraft {
            database_url: lookup(DB_URL_ENV),
            log_filter: lookup(LOG_ENV),
            seed_starter_deck,
        }
        .validate()
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    #[must_use]
    pub fn seed_starter_deck(&self) -> bool {
        self.seed_starter_deck
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            database_url: normalize_sqlite_url(DEFAULT_DB_URL.to_owned()),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            seed_starter_deck: false,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            raw: raw.to_owned(),
        }),
    }
}

/// Returns true for URLs that never touch the filesystem.
pub(crate) fn is_in_memory_url(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains("mode=memory")
}

/// Turn a bare path or relative `sqlite:` URL into an absolute `sqlite://` URL.
pub(crate) fn normalize_sqlite_url(raw: String) -> String {
    if is_in_memory_url(&raw) || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
