//! HTTP surface: routing, the webhook handler, and health diagnostics.

pub(crate) mod health;
pub(crate) mod router;
pub(crate) mod webhook;
