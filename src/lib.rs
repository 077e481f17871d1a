//! answer-forge: access-log window analytics and phonetic city clustering.
//!
//! This library answers two families of data questions over a single input
//! file: request counts and top byte consumers from web-server access logs,
//! and per-city sales totals where city names may be misspelt.

pub mod cities;
pub mod cli;
pub mod config;
pub mod error;
pub mod logs;

// Re-export commonly used error types
pub use config::ResolverConfig;
pub use error::{ConfigError, LogError, SalesError};
