//! Sonarr v3 API adapter for the library manager seam.
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
use linkarr_core::{LibraryManager, LibraryManagerError, RenamePreview};
use reqwest::{Client, StatusCode, header::HeaderMap, header::HeaderValue};
use serde_json::json;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const HEADER_API_KEY: &str = "x-api-key";

/// Client for the Sonarr v3 API.
///
/// Authenticates every request with the static `X-Api-Key` header. Commands
/// go through the shared `/api/v3/command` endpoint and are fire-and-forget
/// on Sonarr's side.
pub struct SonarrClient {
    http: Client,
    base_url: String,
}

impl SonarrClient {
    /// Build a client for the given Sonarr endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryManagerError::Transport`] when the API key is not a
    /// valid header value or the HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LibraryManagerError> {
        let mut default_headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|err| {
            LibraryManagerError::Transport {
                operation: "client.build",
                source: Box::new(err),
            }
        })?;
        default_headers.insert(HEADER_API_KEY, key);
        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| LibraryManagerError::Transport {
                operation: "client.build",
                source: Box::new(err),
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn command(
        &self,
        command: &'static str,
        body: serde_json::Value,
    ) -> Result<(), LibraryManagerError> {
        let url = format!("{}/api/v3/command", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| LibraryManagerError::Transport {
                operation: "command",
                source: Box::new(err),
            })?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LibraryManagerError::Unauthorized);
        }
        if !status.is_success() {
            return Err(LibraryManagerError::CommandRejected {
                command,
                status: status.as_u16(),
            });
        }
        debug!(command, "command accepted");
        Ok(())
    }
}

#[async_trait]
impl LibraryManager for SonarrClient {
    async fn refresh_series(&self, series_id: i64) -> Result<(), LibraryManagerError> {
        self.command(
            "RefreshSeries",
            json!({"name": "RefreshSeries", "seriesId": series_id}),
        )
        .await
    }

    async fn rename_preview(
        &self,
        series_id: i64,
    ) -> Result<Vec<RenamePreview>, LibraryManagerError> {
        let url = format!("{}/api/v3/rename", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("seriesId", series_id)])
            .send()
            .await
            .map_err(|err| LibraryManagerError::Transport {
                operation: "rename.preview",
                source: Box::new(err),
            })?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LibraryManagerError::Unauthorized);
        }
        if !status.is_success() {
            return Err(LibraryManagerError::Status {
                operation: "rename.preview",
                status: status.as_u16(),
            });
        }
        response
            .json()
            .await
            .map_err(|err| LibraryManagerError::Transport {
                operation: "rename.preview",
                source: Box::new(err),
            })
    }

    async fn rename_files(
        &self,
        series_id: i64,
        episode_file_ids: &[i64],
    ) -> Result<(), LibraryManagerError> {
        self.command(
            "RenameFiles",
            json!({
                "name": "RenameFiles",
                "seriesId": series_id,
                "files": episode_file_ids,
            }),
        )
        .await
    }
}
