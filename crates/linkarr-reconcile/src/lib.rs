//! The download-to-library reconciliation workflow.
//!
//! One inbound grab event is reconciled end to end: validate the event, wait
//! for the download to stop writing, pick the single real media file from
//! the manifest, hardlink it into the season directory, and drive the
//! library manager's refresh → rename-preview → rename-commit sequence.
//!
//! # Consistency boundary
//!
//! The workflow is not transactionally atomic across the download client,
//! the filesystem, and the library manager. When a run fails after a side
//! effect has happened, nothing is rolled back: an already-created hardlink
//! stays on disk and an already-issued manager command keeps running. The
//! manager's commands are not guaranteed idempotent to resend blindly, so
//! there are no automatic retries anywhere; a failed reconciliation is
//! re-triggered by the operator.
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

mod controller;
mod orchestrator;
mod validate;
mod waiter;

pub use controller::{ReconcileController, ReconcileReport};
pub use orchestrator::RenameOrchestrator;
pub use validate::{EventDisposition, classify};
pub use waiter::wait_for_completion;
