//! Service wiring: which repository, which notification driver, which workers.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::info;

use invoicer_events::{DeliveryEvent, InMemoryEventBus};
use invoicer_infra::{
    AppConfig, ConfirmationWorker, DummyDriver, InMemoryInvoiceRepository, NotificationDriverKind,
    SimulatedProvider, WorkerHandle,
};
use invoicer_invoicing::{DeliveryConfirmationHandler, InvoiceService, NotificationGateway};

type Repository = Arc<InMemoryInvoiceRepository>;
type Gateway = Arc<dyn NotificationGateway>;

/// Everything the HTTP handlers need, plus the background workers that keep
/// the delivery pipeline running.
pub struct AppServices {
    pub invoices: InvoiceService<Repository, Gateway>,
    pub confirmations: DeliveryConfirmationHandler<Repository>,
    // Held so the confirmation worker's subscription stays connected.
    bus: Arc<InMemoryEventBus<DeliveryEvent>>,
    workers: Mutex<Vec<WorkerHandle>>,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("invoices", &self.invoices.repository().len())
            .field("bus_subscribers", &self.bus.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl AppServices {
    /// Stop the background workers and wait for them.
    pub fn shutdown(&self) {
        let workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for worker in workers {
            worker.shutdown();
        }
    }
}

/// In-memory wiring (dev/test): repository + delivery bus + confirmation worker
/// + the configured notification driver.
pub fn build_services(config: &AppConfig) -> io::Result<AppServices> {
    let repository: Repository = Arc::new(InMemoryInvoiceRepository::new());
    let bus: Arc<InMemoryEventBus<DeliveryEvent>> = Arc::new(InMemoryEventBus::new());
    let confirmations = DeliveryConfirmationHandler::new(repository.clone());

    let mut workers = Vec::new();

    // Subscribe the confirmation side before any provider can report.
    workers.push(ConfirmationWorker::spawn(
        "delivery-confirmations",
        &bus,
        confirmations.clone(),
    )?);

    let gateway: Gateway = match config.notification_driver {
        NotificationDriverKind::Dummy => Arc::new(DummyDriver::new()),
        NotificationDriverKind::Simulated => {
            let (provider, handle) =
                SimulatedProvider::spawn(bus.clone(), config.simulated_provider())?;
            workers.push(handle);
            Arc::new(provider)
        }
    };

    info!(
        driver = ?config.notification_driver,
        delivery_delay_ms = config.delivery_delay.as_millis() as u64,
        delivery_duplicates = config.delivery_duplicates,
        "services ready"
    );

    Ok(AppServices {
        invoices: InvoiceService::new(repository, gateway),
        confirmations,
        bus,
        workers: Mutex::new(workers),
    })
}
