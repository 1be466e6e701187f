//! Configuration errors with constant messages and structured context.

use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading startup configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was absent or empty.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// An environment variable held an unusable value.
    #[error("invalid environment configuration")]
    InvalidEnv {
        /// Name of the offending variable.
        name: &'static str,
        /// Static reason the value was rejected.
        reason: &'static str,
        /// Offending value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_constant() {
        let missing = ConfigError::MissingEnv {
            name: "LINKARR_SONARR_URL",
        };
        assert_eq!(missing.to_string(), "missing environment configuration");

        let invalid = ConfigError::InvalidEnv {
            name: "LINKARR_PORT",
            reason: "not a port number",
            value: "lots".into(),
        };
        assert_eq!(invalid.to_string(), "invalid environment configuration");
    }
}
