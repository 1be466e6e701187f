//! qBittorrent Web API adapter for the download client seam.
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

use std::time::Duration;

use async_trait::async_trait;
use linkarr_core::{DownloadActivity, DownloadClient, DownloadClientError, DownloadFiles};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Torrent states in which qBittorrent has finished writing file data.
const STABLE_STATES: &[&str] = &[
    "uploading",
    "pausedUP",
    "stoppedUP",
    "stalledUP",
    "queuedUP",
    "forcedUP",
    "checkingUP",
];

/// Client for the qBittorrent Web API (`/api/v2`).
///
/// Authentication is cookie-based: the cookie store carries the `SID`
/// session across requests, and a login is performed only when the API
/// answers 403, so repeated status polls reuse one session. Torrent hashes
/// are normalised to lower case, which is how qBittorrent keys them.
pub struct QbitClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TorrentInfo {
    state: String,
    save_path: String,
}

#[derive(Debug, Deserialize)]
struct TorrentFile {
    name: String,
}

impl QbitClient {
    /// Build a client for the given Web API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadClientError::Transport`] when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: &str,
        username: String,
        password: String,
    ) -> Result<Self, DownloadClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| DownloadClientError::Transport {
                operation: "client.build",
                source: Box::new(err),
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    async fn login(&self) -> Result<(), DownloadClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|err| DownloadClientError::Transport {
                operation: "auth.login",
                source: Box::new(err),
            })?;
        if response.status() == StatusCode::FORBIDDEN {
            return Err(DownloadClientError::Unauthorized);
        }
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadClientError::Status {
                operation: "auth.login",
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|err| DownloadClientError::Transport {
                operation: "auth.login",
                source: Box::new(err),
            })?;
        // qBittorrent reports bad credentials with a 200 and a "Fails." body.
        if body.trim() != "Ok." {
            return Err(DownloadClientError::Unauthorized);
        }
        debug!(url, "qbittorrent session established");
        Ok(())
    }

    /// Issue a GET, logging in and retrying once when the session cookie is
    /// absent or expired.
    async fn get_with_session(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, DownloadClientError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| DownloadClientError::Transport {
                operation,
                source: Box::new(err),
            })?;
        if response.status() != StatusCode::FORBIDDEN {
            return Ok(response);
        }
        self.login().await?;
        self.http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| DownloadClientError::Transport {
                operation,
                source: Box::new(err),
            })
    }

    async fn torrent_info(&self, hash: &str) -> Result<Option<TorrentInfo>, DownloadClientError> {
        let url = format!("{}/api/v2/torrents/info", self.base_url);
        let response = self
            .get_with_session("torrents.info", &url, &[("hashes", hash)])
            .await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(DownloadClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(DownloadClientError::Status {
                operation: "torrents.info",
                status: status.as_u16(),
            });
        }
        let mut torrents: Vec<TorrentInfo> =
            response
                .json()
                .await
                .map_err(|err| DownloadClientError::Transport {
                    operation: "torrents.info",
                    source: Box::new(err),
                })?;
        if torrents.is_empty() {
            return Ok(None);
        }
        Ok(Some(torrents.remove(0)))
    }
}

fn classify_state(state: &str) -> DownloadActivity {
    if STABLE_STATES.contains(&state) {
        DownloadActivity::Stable
    } else {
        DownloadActivity::Writing
    }
}

#[async_trait]
impl DownloadClient for QbitClient {
    async fn activity(&self, download_id: &str) -> Result<DownloadActivity, DownloadClientError> {
        let hash = download_id.to_ascii_lowercase();
        match self.torrent_info(&hash).await? {
            None => Ok(DownloadActivity::Missing),
            Some(info) => Ok(classify_state(&info.state)),
        }
    }

    async fn files(&self, download_id: &str) -> Result<DownloadFiles, DownloadClientError> {
        let hash = download_id.to_ascii_lowercase();
        let info = self
            .torrent_info(&hash)
            .await?
            .ok_or_else(|| DownloadClientError::NotFound {
                download_id: download_id.to_string(),
            })?;

        let url = format!("{}/api/v2/torrents/files", self.base_url);
        let response = self
            .get_with_session("torrents.files", &url, &[("hash", hash.as_str())])
            .await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(DownloadClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(DownloadClientError::Status {
                operation: "torrents.files",
                status: status.as_u16(),
            });
        }
        let files: Vec<TorrentFile> =
            response
                .json()
                .await
                .map_err(|err| DownloadClientError::Transport {
                    operation: "torrents.files",
                    source: Box::new(err),
                })?;

        Ok(DownloadFiles {
            save_path: info.save_path.into(),
            files: files.into_iter().map(|file| file.name).collect(),
        })
    }
}
