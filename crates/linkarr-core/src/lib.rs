//! Collaborator-agnostic interfaces and DTOs for the reconciliation workflow.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod error;
mod model;
mod state;

pub use error::{DownloadClientError, LibraryManagerError, ReconcileError, ReconcileResult};
pub use model::{
    DownloadActivity, DownloadFiles, EpisodeRef, FileCandidate, GrabEvent, LinkResult,
    ReconciliationRequest, RenameOutcome, RenamePreview, SeriesRef,
};
pub use state::{FailureReason, ReconcileState};

use async_trait::async_trait;

/// Access to the download client's view of a single download.
#[async_trait]
pub trait DownloadClient: Send + Sync {
    /// Classify whether the download is still being written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadClientError`] when the client cannot be consulted.
    async fn activity(&self, download_id: &str) -> Result<DownloadActivity, DownloadClientError>;

    /// Fetch the download's file manifest and base save path.
    ///
    /// The manifest order is significant: selection picks the first
    /// acceptable entry in the order the client reports.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadClientError::NotFound`] when the client does not
    /// know the download, or another [`DownloadClientError`] when the query
    /// fails.
    async fn files(&self, download_id: &str) -> Result<DownloadFiles, DownloadClientError>;
}

/// Commands and queries the library manager must expose.
#[async_trait]
pub trait LibraryManager: Send + Sync {
    /// Ask the manager to rescan a series from disk. Fire-and-forget on the
    /// manager's side; completion is not reported synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryManagerError`] when the manager rejects the command.
    async fn refresh_series(&self, series_id: i64) -> Result<(), LibraryManagerError>;

    /// Query the manager's proposed rename mapping for a series.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryManagerError`] when the query fails or the response
    /// cannot be interpreted.
    async fn rename_preview(
        &self,
        series_id: i64,
    ) -> Result<Vec<RenamePreview>, LibraryManagerError>;

    /// Commit a rename for the given episode file identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryManagerError`] when the manager rejects the command.
    async fn rename_files(
        &self,
        series_id: i64,
        episode_file_ids: &[i64],
    ) -> Result<(), LibraryManagerError>;
}
