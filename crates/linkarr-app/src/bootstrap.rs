//! Application bootstrap wiring.
//!
//! # Design
//!
//! - Load configuration and install telemetry before anything else runs.
//! - Probe the download directory for hardlink support and refuse to serve
//!   when the mount cannot place links; a broken mount would fail every
//!   delivery at the link step instead.
//! - Wire the HTTP clients into the controller and hand it to the API server.

use std::net::SocketAddr;
use std::sync::Arc;

use linkarr_api::{ApiServer, ApiState};
use linkarr_config::AppConfig;
use linkarr_core::{DownloadClient, LibraryManager};
use linkarr_fsops::verify_hardlink_support;
use linkarr_qbit::QbitClient;
use linkarr_reconcile::ReconcileController;
use linkarr_sonarr::SonarrClient;
use linkarr_telemetry::{LoggingConfig, init_logging};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Entry point for the application boot sequence.
///
/// # Errors
///
/// Returns an error when configuration is incomplete, telemetry cannot be
/// installed, the download directory fails the hardlink probe, or the API
/// server cannot bind.
pub async fn run_app() -> AppResult<()> {
    let config = AppConfig::from_env().map_err(|source| AppError::Config { source })?;
    init_logging(&LoggingConfig {
        level: &config.log_level,
        ..LoggingConfig::default()
    })
    .map_err(|err| AppError::Telemetry { source: err.into() })?;

    info!(download_dir = %config.download_dir.display(), "probing download directory");
    verify_hardlink_support(&config.download_dir)
        .map_err(|source| AppError::Probe { source })?;

    let downloads: Arc<dyn DownloadClient> = Arc::new(
        QbitClient::new(
            &config.qbit.base_url,
            config.qbit.username.clone(),
            config.qbit.password.clone(),
        )
        .map_err(|source| AppError::DownloadClient { source })?,
    );
    let library: Arc<dyn LibraryManager> = Arc::new(
        SonarrClient::new(&config.sonarr.base_url, &config.sonarr.api_key)
            .map_err(|source| AppError::LibraryManager { source })?,
    );

    let controller = ReconcileController::new(downloads, library, config.workflow);
    let state = Arc::new(ApiState::new(controller));
    let addr = SocketAddr::new(config.http.bind_addr, config.http.port);

    ApiServer::new(state)
        .serve(addr)
        .await
        .map_err(|source| AppError::ApiServer { source })
}
