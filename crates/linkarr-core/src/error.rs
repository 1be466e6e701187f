//! # Design
//!
//! - One terminal error per reconciliation, tagged with a stable failure
//!   reason the HTTP caller can act on.
//! - Constant messages; operational context lives in structured fields.
//! - Collaborator errors are preserved as sources, never re-rendered.

use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::FailureReason;

/// Result alias for reconciliation steps.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors raised by a download client adapter.
#[derive(Debug, Error)]
pub enum DownloadClientError {
    /// The client rejected the configured credentials.
    #[error("download client rejected credentials")]
    Unauthorized,
    /// The client does not know the download.
    #[error("download not found")]
    NotFound {
        /// Identifier that failed lookup.
        download_id: String,
    },
    /// Transport-level failure talking to the client.
    #[error("download client request failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The client answered a request with a non-success status.
    #[error("download client returned an error status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned by the client.
        status: u16,
    },
    /// The client answered with something the adapter cannot interpret.
    #[error("download client protocol violation")]
    Protocol {
        /// Operation identifier.
        operation: &'static str,
        /// Static description of the violation.
        detail: &'static str,
    },
}

/// Errors raised by a library manager adapter.
#[derive(Debug, Error)]
pub enum LibraryManagerError {
    /// The manager rejected the configured API key.
    #[error("library manager rejected credentials")]
    Unauthorized,
    /// The manager rejected a command.
    #[error("library manager rejected command")]
    CommandRejected {
        /// Command name as sent to the manager.
        command: &'static str,
        /// HTTP status code returned by the manager.
        status: u16,
    },
    /// Transport-level failure talking to the manager.
    #[error("library manager request failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The manager answered a query with a non-success status.
    #[error("library manager returned an error status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned by the manager.
        status: u16,
    },
    /// The manager answered with something the adapter cannot interpret.
    #[error("library manager protocol violation")]
    Protocol {
        /// Operation identifier.
        operation: &'static str,
        /// Static description of the violation.
        detail: &'static str,
    },
}

/// Terminal failure of one reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The inbound event was malformed or incomplete. No side effects.
    #[error("invalid grab event")]
    Validation {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
    },
    /// A collaborator rejected the configured credentials.
    #[error("collaborator rejected credentials")]
    Authentication {
        /// Which collaborator rejected us.
        service: &'static str,
    },
    /// The download never stabilised within the polling budget.
    #[error("download did not stabilise in time")]
    CompletionTimeout {
        /// Download the waiter was watching.
        download_id: String,
        /// Number of polls performed before giving up.
        attempts: u32,
    },
    /// The download client could not be consulted.
    #[error("download client failure")]
    Download {
        /// Operation identifier.
        operation: &'static str,
        /// Download involved in the failure.
        download_id: String,
        /// Underlying client error.
        #[source]
        source: DownloadClientError,
    },
    /// No manifest entry survived the selection policy.
    #[error("no usable file in download")]
    NoCandidate {
        /// Download whose manifest was inspected.
        download_id: String,
        /// Static reason no candidate survived.
        reason: &'static str,
    },
    /// Placing the hardlink failed.
    #[error("failed to link file into library")]
    Link {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The refresh command failed.
    #[error("series refresh failed")]
    Refresh {
        /// Series the refresh targeted.
        series_id: i64,
        /// Underlying manager error.
        #[source]
        source: LibraryManagerError,
    },
    /// The rename preview was unavailable, empty, or malformed.
    #[error("rename preview failed")]
    RenameQuery {
        /// Series the preview targeted.
        series_id: i64,
        /// Static reason the preview was unusable.
        reason: &'static str,
        /// Underlying manager error, when the query itself failed.
        #[source]
        source: Option<LibraryManagerError>,
    },
    /// The rename commit failed.
    #[error("rename commit failed")]
    RenameCommit {
        /// Series the rename targeted.
        series_id: i64,
        /// Episode file the rename targeted.
        episode_file_id: i64,
        /// Underlying manager error.
        #[source]
        source: LibraryManagerError,
    },
}

impl ReconcileError {
    /// Wrap a download client failure, folding credential rejections into
    /// the authentication category.
    #[must_use]
    pub fn download(
        operation: &'static str,
        download_id: &str,
        source: DownloadClientError,
    ) -> Self {
        match source {
            DownloadClientError::Unauthorized => Self::Authentication {
                service: "download client",
            },
            other => Self::Download {
                operation,
                download_id: download_id.to_string(),
                source: other,
            },
        }
    }

    /// Wrap a refresh failure, folding credential rejections into the
    /// authentication category.
    #[must_use]
    pub fn refresh(series_id: i64, source: LibraryManagerError) -> Self {
        match source {
            LibraryManagerError::Unauthorized => Self::Authentication {
                service: "library manager",
            },
            other => Self::Refresh {
                series_id,
                source: other,
            },
        }
    }

    /// Wrap a rename preview failure, folding credential rejections into
    /// the authentication category.
    #[must_use]
    pub fn rename_query(
        series_id: i64,
        reason: &'static str,
        source: Option<LibraryManagerError>,
    ) -> Self {
        match source {
            Some(LibraryManagerError::Unauthorized) => Self::Authentication {
                service: "library manager",
            },
            other => Self::RenameQuery {
                series_id,
                reason,
                source: other,
            },
        }
    }

    /// Wrap a rename commit failure, folding credential rejections into
    /// the authentication category.
    #[must_use]
    pub fn rename_commit(
        series_id: i64,
        episode_file_id: i64,
        source: LibraryManagerError,
    ) -> Self {
        match source {
            LibraryManagerError::Unauthorized => Self::Authentication {
                service: "library manager",
            },
            other => Self::RenameCommit {
                series_id,
                episode_file_id,
                source: other,
            },
        }
    }

    /// Stable failure category for reporting and the terminal state tag.
    #[must_use]
    pub const fn reason(&self) -> FailureReason {
        match self {
            Self::Validation { .. } => FailureReason::Validation,
            Self::Authentication { .. } => FailureReason::Authentication,
            Self::CompletionTimeout { .. } => FailureReason::CompletionTimeout,
            Self::Download { .. } => FailureReason::DownloadClient,
            Self::NoCandidate { .. } => FailureReason::NoCandidate,
            Self::Link { .. } => FailureReason::Link,
            Self::Refresh { .. } => FailureReason::Refresh,
            Self::RenameQuery { .. } => FailureReason::RenameQuery,
            Self::RenameCommit { .. } => FailureReason::RenameCommit,
        }
    }
}
