//! OS signal handling.
//!
//! SIGINT (Ctrl-C) cancels any in-flight confirmation wait, which then
//! surfaces `DeploymentCancelled` instead of waiting out the block budget.

use std::sync::Arc;

use crate::lifecycle::cancel::Cancellation;

/// Trigger `cancellation` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(cancellation: Arc<Cancellation>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling deployment");
                cancellation.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}
