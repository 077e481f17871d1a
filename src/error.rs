//! Error types for answer-forge operations.
//!
//! Defines error types for each analytical subsystem:
//! - Access-log scanning (window counts, top consumers)
//! - Sales record loading and city clustering
//! - Resolver configuration

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning an access log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Malformed log line {line_number}: {reason}")]
    MalformedLine { line_number: usize, reason: String },

    #[error("Invalid timestamp '{value}' on log line {line_number}")]
    InvalidTimestamp { line_number: usize, value: String },

    #[error("Invalid clock time '{0}': expected HH:MM")]
    InvalidClock(String),

    #[error("Invalid weekday '{0}': expected a full English day name")]
    InvalidWeekday(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid status range [{low}, {high})")]
    InvalidStatusRange { low: u16, high: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading or aggregating sales records.
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Sales input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid sales record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Invalid sales file format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
