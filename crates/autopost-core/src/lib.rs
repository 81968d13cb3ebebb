//! Autopost Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! configuration-provider interface shared by every Autopost component.

pub mod config;
pub mod error;
pub mod models;
pub mod provider;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, WatchConfig, MAX_UPLOAD_BYTES};
pub use error::AppError;
pub use models::{FailureReason, LogEntry, LogLevel, UploadId, UploadState, UploadSummary};
pub use provider::{ConfigProvider, SharedConfig};
