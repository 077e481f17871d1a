//! Resolver configuration.
//!
//! Controls how aggressively city-name variants are merged: the similarity
//! threshold applied to phonetic codes and an optional cap on code length.

use crate::error::ConfigError;

/// Default similarity score (0-100) two phonetic codes need to share a cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 80.0;

/// Environment variable overriding the similarity threshold.
pub const ENV_SIMILARITY_THRESHOLD: &str = "ANSWER_FORGE_SIMILARITY_THRESHOLD";

/// Environment variable capping phonetic code length.
pub const ENV_PHONETIC_MAX_LENGTH: &str = "ANSWER_FORGE_PHONETIC_MAX_LENGTH";

/// Configuration for the phonetic city resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Minimum similarity score (0-100) for a code to join a cluster.
    pub similarity_threshold: f64,
    /// Maximum phonetic code length. `None` keeps the full code.
    pub max_code_length: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_code_length: None,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANSWER_FORGE_SIMILARITY_THRESHOLD`: Similarity threshold (default: 80)
    /// - `ANSWER_FORGE_PHONETIC_MAX_LENGTH`: Phonetic code length cap (default: unlimited)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_SIMILARITY_THRESHOLD) {
            config.similarity_threshold = parse_env_value(&val, ENV_SIMILARITY_THRESHOLD)?;
        }

        if let Some(val) = lookup(ENV_PHONETIC_MAX_LENGTH) {
            config.max_code_length = Some(parse_env_value(&val, ENV_PHONETIC_MAX_LENGTH)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::ValidationFailed(
                "similarity_threshold must be between 0 and 100".to_string(),
            ));
        }

        if self.max_code_length == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "max_code_length must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the similarity threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Builder method to cap phonetic code length.
    pub fn with_max_code_length(mut self, max: usize) -> Self {
        self.max_code_length = Some(max);
        self
    }
}

/// Parse an environment variable value.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
