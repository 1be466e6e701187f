//! Sequencing of one reconciliation, owning the state machine.

use std::path::PathBuf;
use std::sync::Arc;

use linkarr_config::WorkflowConfig;
use linkarr_core::{
    DownloadClient, LibraryManager, ReconcileError, ReconcileResult, ReconcileState,
    ReconciliationRequest,
};
use linkarr_fsops::{FsOpsError, SelectionPolicy, ensure_season_dir, link_into_library};
use tracing::{error, info};

use crate::orchestrator::RenameOrchestrator;
use crate::waiter::wait_for_completion;

/// Runs reconciliations against injected collaborator handles.
///
/// Each call to [`ReconcileController::run`] is an independent unit of work;
/// the controller holds no mutable state, so concurrent runs share nothing
/// but the filesystem and the collaborators themselves.
pub struct ReconcileController {
    downloads: Arc<dyn DownloadClient>,
    library: Arc<dyn LibraryManager>,
    policy: SelectionPolicy,
    workflow: WorkflowConfig,
}

/// Terminal outcome of one reconciliation.
#[derive(Debug)]
pub struct ReconcileReport {
    /// `Complete`, or `Failed` tagged with the reason category.
    pub state: ReconcileState,
    /// Library path of the placed link, on success.
    pub target_path: Option<PathBuf>,
    /// Episode file the rename was committed for, on success.
    pub episode_file_id: Option<i64>,
    /// The terminal error, on failure.
    pub error: Option<ReconcileError>,
}

impl ReconcileController {
    /// Build a controller with the default selection policy.
    #[must_use]
    pub fn new(
        downloads: Arc<dyn DownloadClient>,
        library: Arc<dyn LibraryManager>,
        workflow: WorkflowConfig,
    ) -> Self {
        Self {
            downloads,
            library,
            policy: SelectionPolicy::default(),
            workflow,
        }
    }

    /// Run one reconciliation to its terminal state.
    ///
    /// Failures are folded into the report; they never propagate out of the
    /// workflow, and nothing already done is rolled back.
    pub async fn run(&self, request: ReconciliationRequest) -> ReconcileReport {
        let mut state = ReconcileState::Received;
        match self.execute(&request, &mut state).await {
            Ok((target_path, episode_file_id)) => ReconcileReport {
                state,
                target_path: Some(target_path),
                episode_file_id: Some(episode_file_id),
                error: None,
            },
            Err(err) => {
                let reason = err.reason();
                error!(
                    download_id = %request.download_id,
                    series_id = request.series_id,
                    state = state.as_str(),
                    reason = reason.as_str(),
                    error = %err,
                    "reconciliation failed"
                );
                ReconcileReport {
                    state: ReconcileState::Failed(reason),
                    target_path: None,
                    episode_file_id: None,
                    error: Some(err),
                }
            }
        }
    }

    async fn execute(
        &self,
        request: &ReconciliationRequest,
        state: &mut ReconcileState,
    ) -> ReconcileResult<(PathBuf, i64)> {
        let season_dir =
            ensure_season_dir(request).map_err(|err| fs_error("season_dir.create", err))?;
        advance(state, request); // Validated

        advance(state, request); // AwaitingDownload
        wait_for_completion(
            self.downloads.as_ref(),
            &request.download_id,
            self.workflow.completion,
        )
        .await?;

        let manifest = self
            .downloads
            .files(&request.download_id)
            .await
            .map_err(|err| ReconcileError::download("files", &request.download_id, err))?;
        let candidate = self
            .policy
            .select(&manifest)
            .map_err(|err| selection_error(&request.download_id, err))?;
        advance(state, request); // FileSelected
        info!(
            download_id = %request.download_id,
            candidate = %candidate.relative_name,
            "candidate selected"
        );

        let link = link_into_library(&candidate.absolute_path, &season_dir)
            .map_err(|err| fs_error("library.link", err))?;
        advance(state, request); // Linked

        let orchestrator =
            RenameOrchestrator::new(Arc::clone(&self.library), self.workflow.settle_delay);
        orchestrator.refresh(request.series_id).await?;
        advance(state, request); // Refreshed
        orchestrator.settle().await;
        let outcome = orchestrator.query_rename(request.series_id).await?;
        advance(state, request); // RenameQueried
        orchestrator.commit_rename(request.series_id, outcome).await?;
        advance(state, request); // Complete

        info!(
            download_id = %request.download_id,
            series_id = request.series_id,
            target = %link.target_path.display(),
            episode_file_id = outcome.episode_file_id,
            "reconciliation complete"
        );
        Ok((link.target_path, outcome.episode_file_id))
    }
}

fn advance(state: &mut ReconcileState, request: &ReconciliationRequest) {
    if let Some(next) = state.successor() {
        *state = next;
        info!(
            download_id = %request.download_id,
            state = next.as_str(),
            "state advanced"
        );
    }
}

fn selection_error(download_id: &str, err: FsOpsError) -> ReconcileError {
    match err {
        FsOpsError::NoCandidate { reason } => ReconcileError::NoCandidate {
            download_id: download_id.to_string(),
            reason,
        },
        other => fs_error("select", other),
    }
}

fn fs_error(operation: &'static str, err: FsOpsError) -> ReconcileError {
    let path = match &err {
        FsOpsError::Io { path, .. }
        | FsOpsError::TargetExists { path }
        | FsOpsError::SourceMissing { path }
        | FsOpsError::InvalidSource { path } => path.clone(),
        FsOpsError::ProbeIdentity { dir } => dir.clone(),
        FsOpsError::NoCandidate { .. } => PathBuf::new(),
    };
    ReconcileError::Link {
        operation,
        path,
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use linkarr_config::CompletionStrategy;
    use linkarr_core::{
        DownloadActivity, DownloadClientError, DownloadFiles, FailureReason, LibraryManagerError,
        RenamePreview,
    };
    use std::error::Error;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    struct FakeDownloads {
        manifest: DownloadFiles,
    }

    #[async_trait]
    impl DownloadClient for FakeDownloads {
        async fn activity(&self, _: &str) -> Result<DownloadActivity, DownloadClientError> {
            Ok(DownloadActivity::Stable)
        }

        async fn files(&self, _: &str) -> Result<DownloadFiles, DownloadClientError> {
            Ok(self.manifest.clone())
        }
    }

    #[derive(Default)]
    struct FakeLibrary {
        preview: Vec<RenamePreview>,
        refreshes: AtomicU32,
        commits: Mutex<Vec<(i64, Vec<i64>)>>,
    }

    #[async_trait]
    impl LibraryManager for FakeLibrary {
        async fn refresh_series(&self, _: i64) -> Result<(), LibraryManagerError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn rename_preview(&self, _: i64) -> Result<Vec<RenamePreview>, LibraryManagerError> {
            Ok(self.preview.clone())
        }

        async fn rename_files(
            &self,
            series_id: i64,
            episode_file_ids: &[i64],
        ) -> Result<(), LibraryManagerError> {
            self.commits
                .lock()
                .expect("lock")
                .push((series_id, episode_file_ids.to_vec()));
            Ok(())
        }
    }

    fn workflow() -> WorkflowConfig {
        WorkflowConfig {
            completion: CompletionStrategy::Poll {
                interval: Duration::from_millis(1),
                max_attempts: 3,
            },
            settle_delay: Duration::from_millis(1),
        }
    }

    fn seed_download(dir: &Path, names: &[&str]) -> Result<DownloadFiles, Box<dyn Error>> {
        for name in names {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, b"episode")?;
        }
        Ok(DownloadFiles {
            save_path: dir.to_path_buf(),
            files: names.iter().map(ToString::to_string).collect(),
        })
    }

    fn request(library_root: &Path) -> ReconciliationRequest {
        ReconciliationRequest {
            download_id: "abc123".into(),
            library_path: library_root.join("Show"),
            series_id: 42,
            season_number: 1,
        }
    }

    fn controller(
        downloads: FakeDownloads,
        library: Arc<FakeLibrary>,
    ) -> ReconcileController {
        ReconcileController::new(Arc::new(downloads), library, workflow())
    }

    #[tokio::test]
    async fn grab_event_reconciles_end_to_end() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let manifest =
            seed_download(temp.path(), &["Show.S01E01.sample.mkv", "Show.S01E01.mkv"])?;
        let library = Arc::new(FakeLibrary {
            preview: vec![RenamePreview {
                episode_file_id: 7,
                existing_path: None,
                new_path: None,
            }],
            ..FakeLibrary::default()
        });

        let controller = controller(FakeDownloads { manifest }, Arc::clone(&library));
        let report = controller.run(request(temp.path())).await;

        assert_eq!(report.state, ReconcileState::Complete);
        assert_eq!(report.episode_file_id, Some(7));
        let target = temp.path().join("Show/Season 01/Show.S01E01.mkv");
        assert_eq!(report.target_path.as_deref(), Some(target.as_path()));
        assert!(target.is_file());
        assert_eq!(library.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            library.commits.lock().expect("lock").as_slice(),
            &[(42, vec![7])]
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_preview_fails_without_committing() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let manifest = seed_download(temp.path(), &["Show.S01E01.mkv"])?;
        let library = Arc::new(FakeLibrary::default());

        let controller = controller(FakeDownloads { manifest }, Arc::clone(&library));
        let report = controller.run(request(temp.path())).await;

        assert_eq!(
            report.state,
            ReconcileState::Failed(FailureReason::RenameQuery)
        );
        assert!(library.commits.lock().expect("lock").is_empty());
        // No rollback: the link placed before the failure stays on disk.
        assert!(temp.path().join("Show/Season 01/Show.S01E01.mkv").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn sample_only_manifest_fails_with_no_candidate() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let manifest = seed_download(temp.path(), &["Show.S01E01.sample.mkv"])?;
        let library = Arc::new(FakeLibrary::default());

        let controller = controller(FakeDownloads { manifest }, Arc::clone(&library));
        let report = controller.run(request(temp.path())).await;

        assert_eq!(
            report.state,
            ReconcileState::Failed(FailureReason::NoCandidate)
        );
        assert_eq!(library.refreshes.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn replayed_event_fails_on_the_existing_link() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let manifest = seed_download(temp.path(), &["Show.S01E01.mkv"])?;
        let library = Arc::new(FakeLibrary {
            preview: vec![RenamePreview {
                episode_file_id: 7,
                existing_path: None,
                new_path: None,
            }],
            ..FakeLibrary::default()
        });

        let controller = controller(
            FakeDownloads {
                manifest: manifest.clone(),
            },
            Arc::clone(&library),
        );
        let first = controller.run(request(temp.path())).await;
        assert_eq!(first.state, ReconcileState::Complete);

        let second = controller.run(request(temp.path())).await;
        assert_eq!(second.state, ReconcileState::Failed(FailureReason::Link));
        Ok(())
    }
}
