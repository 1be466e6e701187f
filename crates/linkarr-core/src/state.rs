//! Explicit reconciliation state, transitioned only through its successor.

use serde::Serialize;

/// Stable failure category tagged onto the terminal `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Malformed or incomplete inbound event.
    Validation,
    /// Either external service rejected credentials.
    Authentication,
    /// The download never stabilised within the polling budget.
    CompletionTimeout,
    /// The download client could not be consulted.
    DownloadClient,
    /// No manifest entry survived the selection policy.
    NoCandidate,
    /// The hardlink could not be placed.
    Link,
    /// The series refresh command failed.
    Refresh,
    /// The rename preview was unavailable or empty.
    RenameQuery,
    /// The rename commit command failed.
    RenameCommit,
}

impl FailureReason {
    /// Machine-readable reason string for the response contract.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Authentication => "authentication_error",
            Self::CompletionTimeout => "completion_timeout",
            Self::DownloadClient => "download_client_error",
            Self::NoCandidate => "no_candidate_error",
            Self::Link => "link_error",
            Self::Refresh => "refresh_error",
            Self::RenameQuery => "rename_query_error",
            Self::RenameCommit => "rename_commit_error",
        }
    }
}

/// Progress of one reconciliation.
///
/// The workflow advances strictly along the successor chain; `Failed` is
/// reachable from every non-terminal state and carries the reason category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// Event received, nothing verified yet.
    Received,
    /// Event validated; the season directory exists.
    Validated,
    /// Waiting for the download to stop writing.
    AwaitingDownload,
    /// Exactly one candidate picked from the manifest.
    FileSelected,
    /// Hardlink placed in the library tree.
    Linked,
    /// Refresh command accepted by the library manager.
    Refreshed,
    /// Rename preview returned a usable episode file id.
    RenameQueried,
    /// Rename committed; the reconciliation succeeded.
    Complete,
    /// The reconciliation failed at some step.
    Failed(FailureReason),
}

impl ReconcileState {
    /// Next state along the happy path, or `None` from a terminal state.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Validated),
            Self::Validated => Some(Self::AwaitingDownload),
            Self::AwaitingDownload => Some(Self::FileSelected),
            Self::FileSelected => Some(Self::Linked),
            Self::Linked => Some(Self::Refreshed),
            Self::Refreshed => Some(Self::RenameQueried),
            Self::RenameQueried => Some(Self::Complete),
            Self::Complete | Self::Failed(_) => None,
        }
    }

    /// Whether the state ends the reconciliation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::AwaitingDownload => "awaiting_download",
            Self::FileSelected => "file_selected",
            Self::Linked => "linked",
            Self::Refreshed => "refreshed",
            Self::RenameQueried => "rename_queried",
            Self::Complete => "complete",
            Self::Failed(_) => "failed",
        }
    }
}
