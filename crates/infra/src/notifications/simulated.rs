use std::io;
use std::sync::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use invoicer_events::{DeliveryEvent, EventBus};
use invoicer_invoicing::{DeliveryMessage, NotificationGateway};

use crate::workers::WorkerHandle;

/// Simulated provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedProviderConfig {
    /// Time between accepting a message and reporting it delivered.
    pub delivery_delay: Duration,
    /// How many `delivered` callbacks are emitted per message (at-least-once).
    pub duplicate_deliveries: u32,
    /// Name of the scheduler thread.
    pub name: String,
}

impl Default for SimulatedProviderConfig {
    fn default() -> Self {
        Self {
            delivery_delay: Duration::from_secs(2),
            duplicate_deliveries: 1,
            name: "simulated-provider".to_string(),
        }
    }
}

impl SimulatedProviderConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = delay;
        self
    }

    pub fn with_duplicates(mut self, duplicates: u32) -> Self {
        self.duplicate_deliveries = duplicates;
        self
    }
}

#[derive(Debug)]
struct ScheduledDelivery {
    reference: String,
    due: Instant,
}

/// Notification driver that behaves like a hosted email provider: it accepts
/// the message immediately and later reports delivery through the delivery
/// event bus, possibly more than once.
///
/// Delivery reports are produced by a background scheduler thread. Once that
/// thread is gone the provider rejects new messages.
#[derive(Debug)]
pub struct SimulatedProvider {
    scheduler: Mutex<mpsc::Sender<ScheduledDelivery>>,
    delivery_delay: Duration,
}

impl SimulatedProvider {
    /// Start the scheduler thread publishing onto `bus`.
    pub fn spawn<B>(bus: B, config: SimulatedProviderConfig) -> io::Result<(Self, WorkerHandle)>
    where
        B: EventBus<DeliveryEvent> + 'static,
    {
        let (schedule_tx, schedule_rx) = mpsc::channel::<ScheduledDelivery>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let delivery_delay = config.delivery_delay;

        let join = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || scheduler_loop(bus, config, schedule_rx, shutdown_rx))?;

        let provider = Self {
            scheduler: Mutex::new(schedule_tx),
            delivery_delay,
        };
        Ok((provider, WorkerHandle::new(shutdown_tx, join)))
    }
}

impl NotificationGateway for SimulatedProvider {
    fn send(&self, message: &DeliveryMessage) -> bool {
        let scheduled = ScheduledDelivery {
            reference: message.reference.clone(),
            due: Instant::now() + self.delivery_delay,
        };

        let accepted = match self.scheduler.lock() {
            Ok(tx) => tx.send(scheduled).is_ok(),
            Err(_) => false,
        };

        if accepted {
            info!(
                driver = "simulated",
                to = %message.to_email,
                reference = %message.reference,
                "notification accepted"
            );
        } else {
            warn!(driver = "simulated", reference = %message.reference, "provider scheduler is not running");
        }
        accepted
    }
}

fn scheduler_loop<B>(
    bus: B,
    config: SimulatedProviderConfig,
    schedule_rx: mpsc::Receiver<ScheduledDelivery>,
    shutdown_rx: mpsc::Receiver<()>,
) where
    B: EventBus<DeliveryEvent>,
{
    let idle_tick = Duration::from_millis(100);
    let mut pending: Vec<ScheduledDelivery> = Vec::new();
    info!(provider = %config.name, "simulated provider started");

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        let (due, waiting): (Vec<_>, Vec<_>) = pending.drain(..).partition(|d| d.due <= now);
        pending = waiting;

        for delivery in due {
            for _ in 0..config.duplicate_deliveries {
                if let Err(err) = bus.publish(DeliveryEvent::delivered(delivery.reference.clone())) {
                    warn!(provider = %config.name, reference = %delivery.reference, error = ?err, "failed to publish delivery event");
                }
            }
            debug!(
                provider = %config.name,
                reference = %delivery.reference,
                copies = config.duplicate_deliveries,
                "delivery reported"
            );
        }

        let wait = pending
            .iter()
            .map(|d| d.due.saturating_duration_since(now))
            .min()
            .map_or(idle_tick, |until_next| until_next.min(idle_tick));

        match schedule_rx.recv_timeout(wait) {
            Ok(delivery) => pending.push(delivery),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) if pending.is_empty() => break,
            Err(RecvTimeoutError::Disconnected) => thread::sleep(wait),
        }
    }

    info!(provider = %config.name, dropped = pending.len(), "simulated provider stopped");
}
