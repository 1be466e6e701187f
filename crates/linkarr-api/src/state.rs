//! Shared application state wired through every HTTP handler.

use linkarr_reconcile::ReconcileController;

/// Dependencies handlers need to process a webhook delivery.
pub struct ApiState {
    pub(crate) reconciler: ReconcileController,
}

impl ApiState {
    /// Build the handler state around a reconciliation controller.
    #[must_use]
    pub const fn new(reconciler: ReconcileController) -> Self {
        Self { reconciler }
    }
}
