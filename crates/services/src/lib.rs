#![forbid(unsafe_code)]

pub mod app_services;
pub mod attendance_service;
pub mod config;
pub mod error;
pub mod logging;
pub mod vocab_service;

pub use practice_core::Clock;

pub use app_services::AppServices;
pub use attendance_service::AttendanceService;
pub use config::{CompanionConfig, ConfigDraft};
pub use error::{AppServicesError, AttendanceServiceError, ConfigError, VocabServiceError};
pub use logging::init_tracing;
pub use vocab_service::VocabService;
