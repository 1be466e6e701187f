//! # Design
//!
//! - Structured, constant-message errors for filesystem operations.
//! - Capture the operation and path so failures are reproducible in tests.
//! - Preserve IO sources without interpolating context into messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced by selection, linking, and the capability probe.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// No manifest entry survived the selection policy.
    #[error("no usable file in manifest")]
    NoCandidate {
        /// Static reason no candidate survived.
        reason: &'static str,
    },
    /// The link target already exists; never overwritten.
    #[error("link target already exists")]
    TargetExists {
        /// Path that was already occupied.
        path: PathBuf,
    },
    /// The selected source file is missing on disk.
    #[error("link source missing")]
    SourceMissing {
        /// Path that failed the existence check.
        path: PathBuf,
    },
    /// The selected source path has no usable file name.
    #[error("link source has no file name")]
    InvalidSource {
        /// Offending path.
        path: PathBuf,
    },
    /// The probe link does not share identity with its source file.
    #[error("hardlink probe produced a distinct file")]
    ProbeIdentity {
        /// Directory the probe ran in.
        dir: PathBuf,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
