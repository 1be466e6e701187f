//! Rename orchestration against the library manager.
//!
//! The manager's command API is fire-and-forget: a refresh command is
//! accepted before it has taken effect, so a settle delay sits between the
//! refresh and the rename preview query. Every step failure is terminal for
//! the reconciliation; retries belong to whoever re-triggers the workflow.

use std::sync::Arc;
use std::time::Duration;

use linkarr_core::{LibraryManager, ReconcileError, ReconcileResult, RenameOutcome};
use tracing::{debug, info};

/// Drives the refresh → settle → preview → commit sequence.
pub struct RenameOrchestrator {
    library: Arc<dyn LibraryManager>,
    settle_delay: Duration,
}

impl RenameOrchestrator {
    /// Build an orchestrator over a library manager handle.
    #[must_use]
    pub const fn new(library: Arc<dyn LibraryManager>, settle_delay: Duration) -> Self {
        Self {
            library,
            settle_delay,
        }
    }

    /// Issue the series refresh command.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Refresh`] (or the authentication category)
    /// when the manager rejects the command.
    pub async fn refresh(&self, series_id: i64) -> ReconcileResult<()> {
        self.library
            .refresh_series(series_id)
            .await
            .map_err(|err| ReconcileError::refresh(series_id, err))?;
        info!(series_id, "refresh command issued");
        Ok(())
    }

    /// Let the asynchronous refresh begin taking effect before querying.
    pub async fn settle(&self) {
        debug!(delay_secs = self.settle_delay.as_secs(), "settling after refresh");
        tokio::time::sleep(self.settle_delay).await;
    }

    /// Query the rename preview and resolve the episode file to rename.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::RenameQuery`] when the query fails or the
    /// preview is empty.
    pub async fn query_rename(&self, series_id: i64) -> ReconcileResult<RenameOutcome> {
        let preview = self
            .library
            .rename_preview(series_id)
            .await
            .map_err(|err| ReconcileError::rename_query(series_id, "preview query failed", Some(err)))?;
        let first = preview
            .first()
            .ok_or_else(|| ReconcileError::rename_query(series_id, "preview is empty", None))?;
        info!(
            series_id,
            episode_file_id = first.episode_file_id,
            entries = preview.len(),
            "rename preview resolved"
        );
        Ok(RenameOutcome {
            episode_file_id: first.episode_file_id,
        })
    }

    /// Commit the rename for a previously resolved episode file.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::RenameCommit`] when the manager rejects the
    /// command.
    pub async fn commit_rename(
        &self,
        series_id: i64,
        outcome: RenameOutcome,
    ) -> ReconcileResult<()> {
        self.library
            .rename_files(series_id, &[outcome.episode_file_id])
            .await
            .map_err(|err| ReconcileError::rename_commit(series_id, outcome.episode_file_id, err))?;
        info!(
            series_id,
            episode_file_id = outcome.episode_file_id,
            "rename committed"
        );
        Ok(())
    }
}
