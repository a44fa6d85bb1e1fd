//! Single worker that applies queued webhook events in arrival order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sorter::{Sorter, WebhookOutcome};
use crate::todoist::WebhookEvent;

/// Default number of queued events before new ones are refused.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Start the webhook worker.
///
/// Returns the queue sender and the worker task. The worker exits when every
/// sender is dropped or `cancel` fires, after handling whatever is queued.
#[must_use]
pub fn spawn_webhook_worker(
    sorter: Sorter,
    capacity: usize,
    cancel: CancellationToken,
) -> (mpsc::Sender<WebhookEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(run_worker(sorter, rx, cancel));
    (tx, handle)
}

async fn run_worker(
    sorter: Sorter,
    mut rx: mpsc::Receiver<WebhookEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        process(&sorter, event).await;
    }

    // Events already answered with 200 are still handled
    rx.close();
    let mut drained = 0usize;
    while let Ok(event) = rx.try_recv() {
        process(&sorter, event).await;
        drained += 1;
    }
    tracing::debug!(drained, "Webhook worker stopped");
}

async fn process(sorter: &Sorter, event: WebhookEvent) {
    let name = event.event_name.clone();
    let task_id = event.event_data.id.clone();

    match sorter.handle_event(event).await {
        Ok(WebhookOutcome::Sorted(outcome)) => tracing::debug!(
            event = %name,
            task_id = %task_id,
            renamed_to = ?outcome.renamed_to,
            learned = ?outcome.learned,
            moved_to = ?outcome.moved_to,
            "Handled webhook event"
        ),
        Ok(WebhookOutcome::Learned(learned)) if learned.is_write() => tracing::info!(
            event = %name,
            task_id = %task_id,
            ?learned,
            "Learned section from webhook event"
        ),
        Ok(WebhookOutcome::Learned(learned)) => tracing::debug!(
            event = %name,
            task_id = %task_id,
            ?learned,
            "Handled webhook event"
        ),
        Err(e) => tracing::warn!(
            event = %name,
            task_id = %task_id,
            error = %e,
            "Dropped webhook event"
        ),
    }
}
