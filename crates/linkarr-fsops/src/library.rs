//! Season directory derivation and hardlink placement.

use std::fs;
use std::path::{Path, PathBuf};

use linkarr_core::{LinkResult, ReconciliationRequest};
use tracing::info;

use crate::error::{FsOpsError, FsOpsResult};

/// Create the season directory for a request if it does not exist.
///
/// Already-existing directories are success; concurrent reconciliations may
/// race on the same season directory.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when the directory cannot be created.
pub fn ensure_season_dir(request: &ReconciliationRequest) -> FsOpsResult<PathBuf> {
    let season_dir = request.season_dir();
    fs::create_dir_all(&season_dir)
        .map_err(|source| FsOpsError::io("season_dir.create", &season_dir, source))?;
    Ok(season_dir)
}

/// Hardlink `source` into `season_dir` under its own base name.
///
/// The link is placed with the platform's native link primitive so the
/// on-disk bytes are shared, and its error is surfaced directly. An existing
/// target is fatal; it is never overwritten or skipped.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidSource`] when the source path has no file
/// name, [`FsOpsError::SourceMissing`] when it is absent on disk,
/// [`FsOpsError::TargetExists`] when the target name is occupied, and
/// [`FsOpsError::Io`] when the link call itself fails (including
/// cross-device attempts).
pub fn link_into_library(source: &Path, season_dir: &Path) -> FsOpsResult<LinkResult> {
    let name = source
        .file_name()
        .ok_or_else(|| FsOpsError::InvalidSource {
            path: source.to_path_buf(),
        })?;
    if !source.exists() {
        return Err(FsOpsError::SourceMissing {
            path: source.to_path_buf(),
        });
    }
    let target_path = season_dir.join(name);
    if target_path.exists() {
        return Err(FsOpsError::TargetExists { path: target_path });
    }
    fs::hard_link(source, &target_path)
        .map_err(|source_err| FsOpsError::io("library.link_file", &target_path, source_err))?;
    info!(
        source = %source.display(),
        target = %target_path.display(),
        "linked file into library"
    );
    Ok(LinkResult { target_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    fn request_in(root: &Path, season: u32) -> ReconciliationRequest {
        ReconciliationRequest {
            download_id: "abc123".into(),
            library_path: root.join("Show"),
            series_id: 42,
            season_number: season,
        }
    }

    #[test]
    fn season_dir_is_created_and_zero_padded() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let created = ensure_season_dir(&request_in(temp.path(), 3))?;
        assert!(created.is_dir());
        assert!(created.ends_with("Show/Season 03"));
        Ok(())
    }

    #[test]
    fn season_dir_creation_is_idempotent() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let request = request_in(temp.path(), 12);
        let first = ensure_season_dir(&request)?;
        let second = ensure_season_dir(&request)?;
        assert_eq!(first, second);
        assert!(first.ends_with("Season 12"));
        Ok(())
    }

    #[test]
    fn link_shares_data_without_copying() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let source = temp.path().join("Show.S01E01.mkv");
        fs::write(&source, b"episode")?;
        let season_dir = temp.path().join("Season 01");
        fs::create_dir_all(&season_dir)?;

        let result = link_into_library(&source, &season_dir)?;
        assert_eq!(result.target_path, season_dir.join("Show.S01E01.mkv"));
        assert_eq!(fs::read(&result.target_path)?, b"episode");

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            assert_eq!(
                fs::metadata(&source)?.ino(),
                fs::metadata(&result.target_path)?.ino()
            );
        }
        Ok(())
    }

    #[test]
    fn linking_twice_fails_without_overwriting() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let source = temp.path().join("Show.S01E01.mkv");
        fs::write(&source, b"episode")?;
        let season_dir = temp.path().join("Season 01");
        fs::create_dir_all(&season_dir)?;

        link_into_library(&source, &season_dir)?;
        let err = link_into_library(&source, &season_dir).expect_err("second link should fail");
        assert!(matches!(err, FsOpsError::TargetExists { .. }));
        assert_eq!(fs::read(season_dir.join("Show.S01E01.mkv"))?, b"episode");
        Ok(())
    }

    #[test]
    fn missing_source_is_reported() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let season_dir = temp.path().join("Season 01");
        fs::create_dir_all(&season_dir)?;
        let err = link_into_library(&temp.path().join("absent.mkv"), &season_dir)
            .expect_err("link should fail");
        assert!(matches!(err, FsOpsError::SourceMissing { .. }));
        Ok(())
    }
}
