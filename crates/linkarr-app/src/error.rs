//! # Design
//!
//! - Centralize application-level errors for the boot sequence.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading configuration from the environment failed.
    #[error("configuration loading failed")]
    Config {
        /// Source configuration error.
        source: linkarr_config::ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry initialisation failed")]
    Telemetry {
        /// Source telemetry error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The download directory failed the hardlink capability probe.
    #[error("hardlink capability probe failed")]
    Probe {
        /// Source filesystem error.
        source: linkarr_fsops::FsOpsError,
    },
    /// Building the download client failed.
    #[error("download client construction failed")]
    DownloadClient {
        /// Source client error.
        source: linkarr_core::DownloadClientError,
    },
    /// Building the library manager client failed.
    #[error("library manager construction failed")]
    LibraryManager {
        /// Source client error.
        source: linkarr_core::LibraryManagerError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Source API server error.
        source: linkarr_api::ApiServerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkarr_config::ConfigError;
    use std::error::Error;

    #[test]
    fn app_error_keeps_constant_message_and_source() {
        let err = AppError::Config {
            source: ConfigError::MissingEnv {
                name: "LINKARR_SONARR_URL",
            },
        };
        assert_eq!(err.to_string(), "configuration loading failed");
        assert!(err.source().is_some());
    }
}
