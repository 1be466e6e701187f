//! HTTP surface: the Sonarr webhook endpoint and health diagnostics.
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
#![allow(
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::redundant_pub_crate
)]

mod error;
mod http;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
pub use state::ApiState;
