//! Environment-sourced startup configuration.
//!
//! All collaborator endpoints and credentials arrive through the process
//! environment; a missing required value is a startup-time fatal condition,
//! never a per-request error.
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
mod loader;
mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::ENV_PREFIX;
pub use model::{AppConfig, CompletionStrategy, HttpConfig, QbitConfig, SonarrConfig, WorkflowConfig};
