//! Deterministic candidate selection over a download's file manifest.

use linkarr_core::{DownloadFiles, FileCandidate};

use crate::error::{FsOpsError, FsOpsResult};

/// Video container extensions accepted as primary episode files.
pub const VIDEO_EXTENSIONS: &[&str] = &["avi", "m4v", "mkv", "mov", "mp4", "ts", "webm", "wmv"];

/// Path markers that flag an entry as a non-primary artifact. Matched
/// case-insensitively as substrings over the manifest-relative path, since
/// release groups put these in parent directory names as often as in the
/// file name itself. The save directory is not part of the haystack; it is
/// operator-chosen and must not disqualify candidates.
pub const SKIP_MARKERS: &[&str] = &["sample", "extras", "proof", "screens", "trailer"];

/// Ordered selection rules: extension allow-list, marker rejection, first
/// survivor in manifest order.
///
/// Selection is a pure function of the manifest and the policy; re-running
/// on the same manifest yields the same candidate.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    allowed_extensions: &'static [&'static str],
    skip_markers: &'static [&'static str],
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: VIDEO_EXTENSIONS,
            skip_markers: SKIP_MARKERS,
        }
    }
}

impl SelectionPolicy {
    /// Pick the single file to act on, or fail when nothing qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::NoCandidate`] when the manifest is empty or no
    /// entry survives the rules.
    pub fn select(&self, manifest: &DownloadFiles) -> FsOpsResult<FileCandidate> {
        if manifest.files.is_empty() {
            return Err(FsOpsError::NoCandidate {
                reason: "manifest is empty",
            });
        }
        for relative in &manifest.files {
            let Some(extension) = extension_of(relative) else {
                continue;
            };
            if !self.allowed_extensions.contains(&extension.as_str()) {
                continue;
            }
            let haystack = relative.to_lowercase();
            if self.skip_markers.iter().any(|m| haystack.contains(m)) {
                continue;
            }
            return Ok(FileCandidate {
                relative_name: relative.clone(),
                absolute_path: manifest.save_path.join(relative),
                extension,
            });
        }
        Err(FsOpsError::NoCandidate {
            reason: "no allow-listed entry without a skip marker",
        })
    }
}

fn extension_of(name: &str) -> Option<String> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
