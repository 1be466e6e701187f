//! One-time startup probe verifying hardlinks work on the shared mount.

use std::fs;
use std::path::Path;

use tracing::info;
use uuid::Uuid;

use crate::error::{FsOpsError, FsOpsResult};

/// Verify that hardlinking is possible inside `dir`.
///
/// Creates a scratch file and a hardlink next to it, checks that both names
/// resolve to the same underlying file, and removes both. Run once before
/// accepting traffic; a failure here means every reconciliation would fail
/// at the link step, so startup must abort instead.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] when the scratch file or link cannot be
/// created, and [`FsOpsError::ProbeIdentity`] when the link does not share
/// identity with its source.
pub fn verify_hardlink_support(dir: &Path) -> FsOpsResult<()> {
    let token = Uuid::new_v4().simple().to_string();
    let file = dir.join(format!(".linkarr-probe-{token}"));
    let link = dir.join(format!(".linkarr-probe-{token}.link"));

    let outcome = run_probe(dir, &file, &link);
    // Scratch cleanup is best-effort; the probe verdict already stands.
    let _ = fs::remove_file(&link);
    let _ = fs::remove_file(&file);
    outcome
}

fn run_probe(dir: &Path, file: &Path, link: &Path) -> FsOpsResult<()> {
    fs::write(file, b"linkarr probe").map_err(|source| FsOpsError::io("probe.write", file, source))?;
    fs::hard_link(file, link).map_err(|source| FsOpsError::io("probe.link", link, source))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let file_meta =
            fs::metadata(file).map_err(|source| FsOpsError::io("probe.stat_file", file, source))?;
        let link_meta =
            fs::metadata(link).map_err(|source| FsOpsError::io("probe.stat_link", link, source))?;
        if file_meta.ino() != link_meta.ino() || file_meta.dev() != link_meta.dev() {
            return Err(FsOpsError::ProbeIdentity {
                dir: dir.to_path_buf(),
            });
        }
    }
    #[cfg(not(unix))]
    let _ = dir;

    info!(dir = %dir.display(), "hardlink capability verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    #[test]
    fn probe_succeeds_on_a_writable_directory() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        verify_hardlink_support(temp.path())?;
        Ok(())
    }

    #[test]
    fn probe_cleans_up_its_scratch_files() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        verify_hardlink_support(temp.path())?;
        let leftovers: Vec<_> = fs::read_dir(temp.path())?.collect();
        assert!(leftovers.is_empty());
        Ok(())
    }

    #[test]
    fn probe_fails_on_a_missing_directory() {
        let err = verify_hardlink_support(Path::new("/nonexistent/linkarr"))
            .expect_err("probe should fail");
        assert!(matches!(err, FsOpsError::Io { .. }));
    }
}
