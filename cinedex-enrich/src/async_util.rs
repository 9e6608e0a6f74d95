//! Drive an async task while draining its event channel.
//!
//! The coordinator reports progress through an unbounded mpsc channel; the
//! CLI runs it through here so events render while the task is in flight.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Maximum time to drain remaining events after the task completes, in
/// case a sender clone is still alive somewhere.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, calling `on_event` for each event received on
/// `event_rx`. Returns the task's result after the channel is drained.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut result = None;

    loop {
        tokio::select! {
            r = &mut task, if result.is_none() => {
                result = Some(r);
                break;
            }
            event = event_rx.recv() => {
                match event {
                    Some(e) => on_event(e),
                    // Channel closed before the task finished (unusual but safe)
                    None => break,
                }
            }
        }
    }

    if result.is_some() {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while let Ok(Some(e)) = tokio::time::timeout_at(deadline, event_rx.recv()).await {
            on_event(e);
        }
    }

    match result {
        Some(r) => r,
        None => task.await,
    }
}
