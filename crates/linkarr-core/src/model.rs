//! Domain types for one reconciliation run.

use std::path::PathBuf;

use serde::Deserialize;

/// Validated input for one reconciliation, derived from a grab event.
///
/// Immutable for the lifetime of the run; the controller owns it exclusively
/// and nothing derived from it outlives the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRequest {
    /// Opaque token identifying the download in the download client.
    pub download_id: String,
    /// Absolute directory path for the series in the library tree.
    pub library_path: PathBuf,
    /// Series identifier in the library manager.
    pub series_id: i64,
    /// Season number; defaults to 1 when the event omits it.
    pub season_number: u32,
}

impl ReconciliationRequest {
    /// Name the season directory, zero-padded to two digits (`Season 03`).
    #[must_use]
    pub fn season_dir_name(&self) -> String {
        format!("Season {:02}", self.season_number)
    }

    /// Full path of the season directory inside the library tree.
    #[must_use]
    pub fn season_dir(&self) -> PathBuf {
        self.library_path.join(self.season_dir_name())
    }
}

/// One entry of a download's file manifest, resolved against its save path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path of the file within the download, as reported by the client.
    pub relative_name: String,
    /// Resolved filesystem path of the file.
    pub absolute_path: PathBuf,
    /// Lower-cased extension without the leading dot.
    pub extension: String,
}

/// A download's file manifest plus the directory the client saves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFiles {
    /// Base directory the relative names resolve against.
    pub save_path: PathBuf,
    /// Relative file names in the client's manifest order.
    pub files: Vec<String>,
}

/// Classification of a download's write activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadActivity {
    /// The client is still writing file data.
    Writing,
    /// All file data is on disk and no longer changing.
    Stable,
    /// The client does not know the download.
    Missing,
}

/// Hardlink placement result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// Final path of the link inside the library tree.
    pub target_path: PathBuf,
}

/// One entry of the library manager's rename preview.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenamePreview {
    /// Identifier of the ingested episode file.
    pub episode_file_id: i64,
    /// Current path of the file, when the manager reports one.
    #[serde(default)]
    pub existing_path: Option<String>,
    /// Path the manager would rename the file to.
    #[serde(default)]
    pub new_path: Option<String>,
}

/// Outcome of a completed rename preview; required before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Identifier returned by the manager after ingesting the new file.
    pub episode_file_id: i64,
}

/// Raw inbound webhook payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrabEvent {
    /// Event type marker; `test` probes short-circuit, `Grab` is processed.
    #[serde(default)]
    pub event_type: Option<String>,
    /// Download identifier in the download client.
    #[serde(default)]
    pub download_id: Option<String>,
    /// Series descriptor.
    #[serde(default)]
    pub series: Option<SeriesRef>,
    /// Episode descriptors; the first one carries the identifiers used here.
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
}

impl GrabEvent {
    /// Whether the event is a lifecycle test probe.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("test"))
    }

    /// Whether the event announces a grabbed download.
    #[must_use]
    pub fn is_grab(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("grab"))
    }
}

/// Series fields carried by the webhook payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRef {
    /// Root directory of the series in the library tree.
    #[serde(default)]
    pub path: Option<String>,
}

/// Episode fields carried by the webhook payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    /// Series identifier in the library manager.
    #[serde(default)]
    pub series_id: Option<i64>,
    /// Season number within the series.
    #[serde(default)]
    pub season_number: Option<u32>,
}
