//! Asynchronous, ordering-preserving handoff from the tap's synchronous
//! decision to the activation call.
//!
//! The tap callback pushes the selected candidate onto an unbounded channel
//! and returns immediately; a single drain task consumes requests in send
//! order and spawns one task per activation. Starts are therefore ordered,
//! completions deliberately are not: a cold launch on one key must never
//! delay switching on another. Correctness does not depend on completion
//! order because the cycle cursor was finalized synchronously before the
//! request was enqueued.

use std::sync::Arc;

use mac_activate::{Activator, AppId};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{trace, warn};

/// Create the activation channel and spawn the drain task.
///
/// Must be called within a tokio runtime. The returned sender is handed to
/// the tap callback; sending never blocks.
pub(crate) fn spawn(activator: Arc<dyn Activator>) -> UnboundedSender<AppId> {
    let (tx, rx) = unbounded_channel();
    tokio::spawn(drain(activator, rx));
    tx
}

/// Consume requests in order, one activation task each.
///
/// Failures are logged and otherwise inert: no retry, no effect on the cycle
/// cursors, no backpressure on the tap.
async fn drain(activator: Arc<dyn Activator>, mut rx: UnboundedReceiver<AppId>) {
    while let Some(id) = rx.recv().await {
        trace!(app = %id, "activation_dispatch");
        let activator = activator.clone();
        tokio::spawn(async move {
            if let Err(err) = activator.activate(&id).await {
                warn!(app = %id, error = %err, "activation_failed");
            }
        });
    }
    trace!("activation_channel_drained");
}
