//! The inbound webhook handler.
//!
//! # Design
//!
//! - Every delivery is answered with a definitive acknowledgement; the
//!   reconciliation runs to its terminal state before the response is sent.
//! - Failure reasons surface verbatim in the response body so the sending
//!   system's activity log records why a delivery was not ingested.

use std::error::Error;
use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use linkarr_core::{FailureReason, GrabEvent, ReconcileState};
use linkarr_reconcile::{EventDisposition, classify};
use serde::Serialize;
use tracing::{info, warn};

use crate::state::ApiState;

/// Acknowledgement body returned for every webhook delivery.
#[derive(Debug, Serialize)]
pub(crate) struct WebhookAck {
    pub(crate) status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

/// Accept a delivery, run the reconciliation, and report its outcome.
pub(crate) async fn sonarr_webhook(
    State(state): State<Arc<ApiState>>,
    Json(event): Json<GrabEvent>,
) -> (StatusCode, Json<WebhookAck>) {
    let request = match classify(&event) {
        Ok(EventDisposition::TestProbe) => {
            info!("acknowledged connectivity test event");
            return (
                StatusCode::OK,
                Json(WebhookAck {
                    status: "ok",
                    reason: None,
                    message: Some("test event acknowledged".to_string()),
                }),
            );
        }
        Ok(EventDisposition::Ignored { event_type }) => {
            info!(event_type = %event_type, "ignoring unsupported event type");
            return (
                StatusCode::OK,
                Json(WebhookAck {
                    status: "ignored",
                    reason: None,
                    message: None,
                }),
            );
        }
        Ok(EventDisposition::Reconcile(request)) => request,
        Err(error) => {
            warn!(error = %error, "rejected malformed event");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookAck {
                    status: "failed",
                    reason: Some(error.reason().as_str()),
                    message: Some(render_chain(&error)),
                }),
            );
        }
    };

    let report = state.reconciler.run(request).await;
    if let ReconcileState::Failed(reason) = report.state {
        let message = report.error.as_ref().map(|error| render_chain(error));
        return (
            status_for(reason),
            Json(WebhookAck {
                status: "failed",
                reason: Some(reason.as_str()),
                message,
            }),
        );
    }
    (
        StatusCode::OK,
        Json(WebhookAck {
            status: "ok",
            reason: None,
            message: None,
        }),
    )
}

const fn status_for(reason: FailureReason) -> StatusCode {
    match reason {
        FailureReason::Validation => StatusCode::BAD_REQUEST,
        FailureReason::NoCandidate | FailureReason::Link => StatusCode::INTERNAL_SERVER_ERROR,
        FailureReason::Authentication
        | FailureReason::CompletionTimeout
        | FailureReason::DownloadClient
        | FailureReason::Refresh
        | FailureReason::RenameQuery
        | FailureReason::RenameCommit => StatusCode::BAD_GATEWAY,
    }
}

fn render_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut cursor = error.source();
    while let Some(cause) = cursor {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        cursor = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use linkarr_config::{CompletionStrategy, WorkflowConfig};
    use linkarr_core::{
        DownloadActivity, DownloadClient, DownloadClientError, DownloadFiles, LibraryManager,
        LibraryManagerError, RenamePreview,
    };
    use linkarr_reconcile::ReconcileController;
    use serde_json::json;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    struct UnreachableDownloads;

    #[async_trait]
    impl DownloadClient for UnreachableDownloads {
        async fn activity(
            &self,
            _download_id: &str,
        ) -> Result<DownloadActivity, DownloadClientError> {
            unreachable!("download client must not be consulted");
        }

        async fn files(&self, _download_id: &str) -> Result<DownloadFiles, DownloadClientError> {
            unreachable!("download client must not be consulted");
        }
    }

    struct UnreachableLibrary;

    #[async_trait]
    impl LibraryManager for UnreachableLibrary {
        async fn refresh_series(&self, _series_id: i64) -> Result<(), LibraryManagerError> {
            unreachable!("library manager must not be consulted");
        }

        async fn rename_preview(
            &self,
            _series_id: i64,
        ) -> Result<Vec<RenamePreview>, LibraryManagerError> {
            unreachable!("library manager must not be consulted");
        }

        async fn rename_files(
            &self,
            _series_id: i64,
            _episode_file_ids: &[i64],
        ) -> Result<(), LibraryManagerError> {
            unreachable!("library manager must not be consulted");
        }
    }

    struct StableDownloads {
        manifest: DownloadFiles,
    }

    #[async_trait]
    impl DownloadClient for StableDownloads {
        async fn activity(
            &self,
            _download_id: &str,
        ) -> Result<DownloadActivity, DownloadClientError> {
            Ok(DownloadActivity::Stable)
        }

        async fn files(&self, _download_id: &str) -> Result<DownloadFiles, DownloadClientError> {
            Ok(DownloadFiles {
                save_path: self.manifest.save_path.clone(),
                files: self.manifest.files.clone(),
            })
        }
    }

    struct RecordingLibrary {
        committed: Mutex<Vec<(i64, Vec<i64>)>>,
    }

    #[async_trait]
    impl LibraryManager for RecordingLibrary {
        async fn refresh_series(&self, _series_id: i64) -> Result<(), LibraryManagerError> {
            Ok(())
        }

        async fn rename_preview(
            &self,
            _series_id: i64,
        ) -> Result<Vec<RenamePreview>, LibraryManagerError> {
            Ok(vec![RenamePreview {
                episode_file_id: 7,
                existing_path: Some("old".to_string()),
                new_path: Some("new".to_string()),
            }])
        }

        async fn rename_files(
            &self,
            series_id: i64,
            episode_file_ids: &[i64],
        ) -> Result<(), LibraryManagerError> {
            self.committed
                .lock()
                .expect("lock")
                .push((series_id, episode_file_ids.to_vec()));
            Ok(())
        }
    }

    fn immediate_workflow() -> WorkflowConfig {
        WorkflowConfig {
            completion: CompletionStrategy::Poll {
                interval: Duration::ZERO,
                max_attempts: 1,
            },
            settle_delay: Duration::ZERO,
        }
    }

    fn state_with(
        downloads: Arc<dyn DownloadClient>,
        library: Arc<dyn LibraryManager>,
    ) -> Arc<ApiState> {
        Arc::new(ApiState::new(ReconcileController::new(
            downloads,
            library,
            immediate_workflow(),
        )))
    }

    #[tokio::test]
    async fn test_event_is_acknowledged_without_collaborator_calls() {
        let state = state_with(Arc::new(UnreachableDownloads), Arc::new(UnreachableLibrary));
        let event: GrabEvent =
            serde_json::from_value(json!({ "eventType": "Test" })).expect("event");

        let (status, Json(ack)) = sonarr_webhook(State(state), Json(event)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.status, "ok");
        assert!(ack.reason.is_none());
    }

    #[tokio::test]
    async fn non_grab_events_are_ignored() {
        let state = state_with(Arc::new(UnreachableDownloads), Arc::new(UnreachableLibrary));
        let event: GrabEvent =
            serde_json::from_value(json!({ "eventType": "Download" })).expect("event");

        let (status, Json(ack)) = sonarr_webhook(State(state), Json(event)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.status, "ignored");
    }

    #[tokio::test]
    async fn malformed_grab_event_maps_to_bad_request() {
        let state = state_with(Arc::new(UnreachableDownloads), Arc::new(UnreachableLibrary));
        let event: GrabEvent =
            serde_json::from_value(json!({ "eventType": "Grab" })).expect("event");

        let (status, Json(ack)) = sonarr_webhook(State(state), Json(event)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(ack.status, "failed");
        assert_eq!(ack.reason, Some("validation_error"));
        assert!(ack.message.is_some());
    }

    #[tokio::test]
    async fn grab_event_runs_to_completion() {
        let downloads_dir = TempDir::new().expect("downloads dir");
        let library_dir = TempDir::new().expect("library dir");
        fs::write(downloads_dir.path().join("episode.mkv"), b"payload").expect("source file");

        let downloads = Arc::new(StableDownloads {
            manifest: DownloadFiles {
                save_path: downloads_dir.path().to_path_buf(),
                files: vec!["episode.mkv".to_string()],
            },
        });
        let library = Arc::new(RecordingLibrary {
            committed: Mutex::new(Vec::new()),
        });
        let state = state_with(downloads, Arc::clone(&library) as Arc<dyn LibraryManager>);

        let event: GrabEvent = serde_json::from_value(json!({
            "eventType": "Grab",
            "downloadId": "ABCDEF",
            "series": { "path": library_dir.path() },
            "episodes": [{ "seriesId": 42, "seasonNumber": 3 }],
        }))
        .expect("event");

        let (status, Json(ack)) = sonarr_webhook(State(state), Json(event)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.status, "ok");
        assert!(
            library_dir
                .path()
                .join("Season 03")
                .join("episode.mkv")
                .exists()
        );
        assert_eq!(
            library.committed.lock().expect("lock").as_slice(),
            &[(42, vec![7])]
        );
    }

    struct TimedOutDownloads;

    #[async_trait]
    impl DownloadClient for TimedOutDownloads {
        async fn activity(
            &self,
            _download_id: &str,
        ) -> Result<DownloadActivity, DownloadClientError> {
            Ok(DownloadActivity::Writing)
        }

        async fn files(&self, _download_id: &str) -> Result<DownloadFiles, DownloadClientError> {
            unreachable!("files must not be requested before completion");
        }
    }

    #[tokio::test]
    async fn completion_timeout_maps_to_bad_gateway() {
        let library_dir = TempDir::new().expect("library dir");
        let state = state_with(Arc::new(TimedOutDownloads), Arc::new(UnreachableLibrary));

        let event: GrabEvent = serde_json::from_value(json!({
            "eventType": "Grab",
            "downloadId": "abcdef",
            "series": { "path": library_dir.path() },
            "episodes": [{ "seriesId": 42, "seasonNumber": 1 }],
        }))
        .expect("event");

        let (status, Json(ack)) = sonarr_webhook(State(state), Json(event)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(ack.status, "failed");
        assert_eq!(ack.reason, Some("completion_timeout"));
    }

    #[test]
    fn status_mapping_separates_local_and_upstream_failures() {
        assert_eq!(
            status_for(FailureReason::Validation),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(FailureReason::Link),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(FailureReason::NoCandidate),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(FailureReason::Refresh), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(FailureReason::Authentication),
            StatusCode::BAD_GATEWAY
        );
    }
}
