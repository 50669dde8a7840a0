use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use invoicer_events::{DeliveryEvent, EventBus, Subscription};
use invoicer_invoicing::DeliveryCallback;

use super::WorkerHandle;

/// Feeds delivery events from a bus into a [`DeliveryCallback`].
///
/// - Subscribes before the thread starts, so nothing published after `spawn`
///   returns is missed
/// - Only `delivered` events reach the callback; other actions are logged and skipped
/// - A failing callback is logged and the event is dropped; nothing redelivers
///   it, so the invoice stays in `Sending` until another report arrives (for
///   example through the webhook)
#[derive(Debug)]
pub struct ConfirmationWorker;

impl ConfirmationWorker {
    pub fn spawn<B, C>(name: &'static str, bus: &B, callback: C) -> io::Result<WorkerHandle>
    where
        B: EventBus<DeliveryEvent>,
        C: DeliveryCallback + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, &callback))?;

        Ok(WorkerHandle::new(shutdown_tx, join))
    }
}

fn worker_loop<C>(
    name: &'static str,
    sub: Subscription<DeliveryEvent>,
    shutdown_rx: mpsc::Receiver<()>,
    callback: &C,
) where
    C: DeliveryCallback,
{
    let tick = Duration::from_millis(100);
    info!(worker = name, "confirmation worker started");

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(event) => {
                if !event.action.is_delivered() {
                    debug!(worker = name, action = %event.action, reference = %event.reference, "skipping delivery event");
                    continue;
                }

                match callback.delivered(&event.reference) {
                    Ok(outcome) => {
                        debug!(worker = name, reference = %event.reference, ?outcome, "delivery event applied");
                    }
                    Err(err) => {
                        warn!(worker = name, reference = %event.reference, error = %err, "delivery confirmation failed");
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(worker = name, "confirmation worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    use invoicer_events::{DeliveryAction, InMemoryEventBus};
    use invoicer_invoicing::{DeliveryOutcome, RepositoryError};

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingCallback {
        references: Mutex<Vec<String>>,
    }

    impl DeliveryCallback for RecordingCallback {
        fn delivered(&self, reference: &str) -> Result<DeliveryOutcome, RepositoryError> {
            self.references.lock().unwrap().push(reference.to_string());
            Ok(DeliveryOutcome::UnknownInvoice)
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn forwards_only_delivered_events() {
        let bus: InMemoryEventBus<DeliveryEvent> = InMemoryEventBus::new();
        let callback = Arc::new(RecordingCallback::default());
        let handle = ConfirmationWorker::spawn("test-confirmations", &bus, callback.clone()).unwrap();

        bus.publish(DeliveryEvent {
            action: DeliveryAction::from("opened"),
            ..DeliveryEvent::delivered("skip-me")
        })
        .unwrap();
        bus.publish(DeliveryEvent::delivered("ref-1")).unwrap();
        bus.publish(DeliveryEvent::delivered("ref-1")).unwrap();

        assert!(wait_for(|| callback.references.lock().unwrap().len() == 2));
        handle.shutdown();

        assert_eq!(
            *callback.references.lock().unwrap(),
            vec!["ref-1".to_string(), "ref-1".to_string()]
        );
    }

    #[test]
    fn stops_on_shutdown() {
        let bus: InMemoryEventBus<DeliveryEvent> = InMemoryEventBus::new();
        let handle =
            ConfirmationWorker::spawn("test-shutdown", &bus, Arc::new(RecordingCallback::default())).unwrap();

        let started = Instant::now();
        handle.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
