//! Filesystem side of the reconciliation: candidate selection, season
//! directory derivation, hardlink placement, and the startup capability
//! probe.
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

mod error;
mod library;
mod probe;
mod select;

pub use error::{FsOpsError, FsOpsResult};
pub use library::{ensure_season_dir, link_into_library};
pub use probe::verify_hardlink_support;
pub use select::{SKIP_MARKERS, SelectionPolicy, VIDEO_EXTENSIONS};
