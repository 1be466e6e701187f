//! Configuration model.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Full startup configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Library manager endpoint and credentials.
    pub sonarr: SonarrConfig,
    /// Download client endpoint and credentials.
    pub qbit: QbitConfig,
    /// Shared filesystem mount the downloads land on; the hardlink probe
    /// runs here at startup.
    pub download_dir: PathBuf,
    /// Inbound HTTP listener settings.
    pub http: HttpConfig,
    /// Workflow timing knobs.
    pub workflow: WorkflowConfig,
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,
}

/// Library manager (Sonarr) connection settings.
#[derive(Debug, Clone)]
pub struct SonarrConfig {
    /// Base URL, e.g. `http://sonarr:8989`.
    pub base_url: String,
    /// Static API key sent as `X-Api-Key`.
    pub api_key: String,
}

/// Download client (qBittorrent) connection settings.
#[derive(Debug, Clone)]
pub struct QbitConfig {
    /// Base URL of the Web API, e.g. `http://qbittorrent:8080`.
    pub base_url: String,
    /// Web API username.
    pub username: String,
    /// Web API password.
    pub password: String,
}

/// Inbound HTTP listener settings.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Address to bind.
    pub bind_addr: IpAddr,
    /// Port to bind.
    pub port: u16,
}

/// Workflow timing configuration.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig {
    /// How the completion waiter decides the download is stable.
    pub completion: CompletionStrategy,
    /// Pause between the refresh command and the rename preview query; the
    /// manager's command API is fire-and-forget.
    pub settle_delay: Duration,
}

/// Strategy for waiting until a download's files stop changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStrategy {
    /// One fixed quiescence delay before any manifest access. The original
    /// deployed behavior, kept available through configuration.
    FixedDelay(Duration),
    /// Poll the download client's activity until it reports stable, bounded
    /// by an attempt budget.
    Poll {
        /// Pause between polls.
        interval: Duration,
        /// Polls before giving up and failing the reconciliation.
        max_attempts: u32,
    },
}
