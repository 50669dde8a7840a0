//! Hand-rolled fakes for the ports, shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use invoicer_core::AggregateRoot;

use crate::invoice::{Invoice, InvoiceId};
use crate::ports::{DeliveryMessage, InvoiceRepository, NotificationGateway, RepositoryError};

/// Versioned map-backed repository that counts calls.
#[derive(Debug, Default)]
pub struct FakeRepository {
    invoices: Mutex<HashMap<InvoiceId, Invoice>>,
    saves: AtomicUsize,
    finds: AtomicUsize,
    /// Number of upcoming updates to fail with a conflict before succeeding.
    injected_conflicts: AtomicUsize,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `invoice` directly (bypassing the save counter).
    pub fn seed(&self, invoice: Invoice) -> InvoiceId {
        let id = invoice.invoice_id().unwrap_or_else(InvoiceId::generate);
        let stored = Invoice::rehydrate(
            id,
            invoice.status(),
            invoice.customer_name(),
            invoice.customer_email(),
            invoice.lines().to_vec(),
            invoice.version().max(1),
        );
        self.invoices.lock().unwrap().insert(id, stored);
        id
    }

    pub fn get(&self, id: InvoiceId) -> Option<Invoice> {
        self.invoices.lock().unwrap().get(&id).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn inject_conflicts(&self, count: usize) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }
}

impl InvoiceRepository for FakeRepository {
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut map = self.invoices.lock().unwrap();

        let Some(id) = invoice.invoice_id() else {
            let id = InvoiceId::generate();
            let stored = Invoice::rehydrate(
                id,
                invoice.status(),
                invoice.customer_name(),
                invoice.customer_email(),
                invoice.lines().to_vec(),
                1,
            );
            map.insert(id, stored.clone());
            return Ok(stored);
        };

        let current = map.get(&id).ok_or(RepositoryError::Missing(id))?;

        let pending = self.injected_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.injected_conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(RepositoryError::Conflict {
                id,
                expected: invoice.version(),
                actual: current.version() + 1,
            });
        }

        if current.version() != invoice.version() {
            return Err(RepositoryError::Conflict {
                id,
                expected: invoice.version(),
                actual: current.version(),
            });
        }

        let stored = Invoice::rehydrate(
            id,
            invoice.status(),
            current.customer_name(),
            current.customer_email(),
            current.lines().to_vec(),
            current.version() + 1,
        );
        map.insert(id, stored.clone());
        Ok(stored)
    }
}

/// Repository whose every call fails.
#[derive(Debug, Default)]
pub struct UnavailableRepository;

impl InvoiceRepository for UnavailableRepository {
    fn find_by_id(&self, _id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn save(&self, _invoice: Invoice) -> Result<Invoice, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }
}

/// Gateway that records every message it is handed.
#[derive(Debug)]
pub struct RecordingGateway {
    sent: Mutex<Vec<DeliveryMessage>>,
    accept: AtomicBool,
}

impl RecordingGateway {
    pub fn accepting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            accept: AtomicBool::new(true),
        }
    }

    pub fn rejecting() -> Self {
        let gateway = Self::accepting();
        gateway.accept.store(false, Ordering::SeqCst);
        gateway
    }

    pub fn sent(&self) -> Vec<DeliveryMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationGateway for RecordingGateway {
    fn send(&self, message: &DeliveryMessage) -> bool {
        self.sent.lock().unwrap().push(message.clone());
        self.accept.load(Ordering::SeqCst)
    }
}
