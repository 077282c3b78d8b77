//! Background eviction of expired conversation contexts

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use bank_assistant_agent::ConversationContextStore;

use crate::metrics::record_active_sessions;

/// Run `evict_expired` every `interval` until `true` is sent on the
/// returned channel.
pub fn start_context_sweeper(
    store: Arc<ConversationContextStore>,
    interval: Duration,
) -> (watch::Sender<bool>, JoinHandle<()>) {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    store.evict_expired();
                    record_active_sessions(store.len());
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("Context sweeper shutting down");
                        break;
                    }
                }
            }
        }
    });

    (shutdown_tx, handle)
}
