//! Application bootstrap wiring for the reconciliation service.
//!
//! Layout: `bootstrap.rs` (configuration, telemetry, probe, service wiring),
//! `error.rs` (application-level errors).
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

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level error types.
pub mod error;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
