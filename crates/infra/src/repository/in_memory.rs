use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use invoicer_core::ExpectedVersion;
use invoicer_invoicing::{Invoice, InvoiceId, InvoiceRepository, InvoiceStatus, ProductLine, RepositoryError};

#[derive(Debug, Clone)]
struct StoredInvoice {
    status: InvoiceStatus,
    customer_name: String,
    customer_email: String,
    lines: Vec<ProductLine>,
    version: u64,
}

impl StoredInvoice {
    fn to_invoice(&self, id: InvoiceId) -> Invoice {
        Invoice::rehydrate(
            id,
            self.status,
            self.customer_name.clone(),
            self.customer_email.clone(),
            self.lines.clone(),
            self.version,
        )
    }
}

/// In-memory invoice store.
///
/// Intended for tests/dev. Every save runs under the write lock and checks the
/// caller's version against the stored one, so concurrent read-modify-write
/// cycles on the same invoice serialise: the first writer wins, later writers
/// holding the old version get [`RepositoryError::Conflict`].
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<InvoiceId, StoredInvoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.invoices.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

impl InvoiceRepository for InMemoryInvoiceRepository {
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let map = self.invoices.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).map(|stored| stored.to_invoice(id)))
    }

    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        let mut map = self.invoices.write().map_err(|_| poisoned())?;

        let Some(id) = invoice.invoice_id() else {
            let mut id = InvoiceId::generate();
            while map.contains_key(&id) {
                id = InvoiceId::generate();
            }
            let stored = StoredInvoice {
                status: invoice.status(),
                customer_name: invoice.customer_name().to_string(),
                customer_email: invoice.customer_email().to_string(),
                lines: invoice.lines().to_vec(),
                version: 1,
            };
            let saved = stored.to_invoice(id);
            map.insert(id, stored);
            return Ok(saved);
        };

        let stored = map.get_mut(&id).ok_or(RepositoryError::Missing(id))?;

        let expected = ExpectedVersion::of(&invoice);
        if !expected.matches(stored.version) {
            debug!(
                invoice_id = %id,
                expected = expected.0,
                actual = stored.version,
                "stale invoice write rejected"
            );
            return Err(RepositoryError::Conflict {
                id,
                expected: expected.0,
                actual: stored.version,
            });
        }

        // Lines and customer data are fixed at creation; only status moves.
        stored.status = invoice.status();
        stored.version += 1;

        Ok(stored.to_invoice(id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use invoicer_core::AggregateRoot;

    use super::*;

    fn sendable_draft() -> Invoice {
        Invoice::draft(
            "Jane Doe",
            "jane@example.com",
            vec![ProductLine::new("Widget", 2, 100)],
        )
    }

    #[test]
    fn first_save_assigns_id_and_version() {
        let repo = InMemoryInvoiceRepository::new();

        let saved = repo.save(sendable_draft()).unwrap();

        let id = saved.invoice_id().unwrap();
        assert_eq!(saved.version(), 1);
        assert_eq!(repo.find_by_id(id).unwrap(), Some(saved));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn every_insert_gets_its_own_id() {
        let repo = InMemoryInvoiceRepository::new();
        let a = repo.save(sendable_draft()).unwrap();
        let b = repo.save(sendable_draft()).unwrap();
        assert_ne!(a.invoice_id(), b.invoice_id());
    }

    #[test]
    fn find_unknown_is_none() {
        let repo = InMemoryInvoiceRepository::new();
        assert!(repo.is_empty());
        assert_eq!(repo.find_by_id(InvoiceId::generate()).unwrap(), None);
    }

    #[test]
    fn update_bumps_version_and_keeps_lines() {
        let repo = InMemoryInvoiceRepository::new();
        let mut invoice = repo.save(sendable_draft()).unwrap();
        let id = invoice.invoice_id().unwrap();

        assert!(invoice.mark_as_sending());
        let updated = repo.save(invoice).unwrap();

        assert_eq!(updated.version(), 2);
        assert_eq!(updated.status(), InvoiceStatus::Sending);

        // An update carrying no lines must not wipe the stored ones.
        let stripped = Invoice::rehydrate(
            id,
            InvoiceStatus::Sending,
            "Jane Doe",
            "jane@example.com",
            vec![],
            2,
        );
        let saved = repo.save(stripped).unwrap();
        assert_eq!(saved.lines().len(), 1);
        assert_eq!(saved.total_price(), Some(200));
    }

    #[test]
    fn stale_write_is_a_conflict() {
        let repo = InMemoryInvoiceRepository::new();
        let saved = repo.save(sendable_draft()).unwrap();
        let id = saved.invoice_id().unwrap();

        let mut fresh = saved.clone();
        fresh.mark_as_sending();
        repo.save(fresh).unwrap();

        // `saved` still carries version 1.
        let err = repo.save(saved).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Conflict {
                id,
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(
            repo.find_by_id(id).unwrap().unwrap().status(),
            InvoiceStatus::Sending
        );
    }

    #[test]
    fn updating_unknown_invoice_is_missing() {
        let repo = InMemoryInvoiceRepository::new();
        let id = InvoiceId::generate();
        let ghost = Invoice::rehydrate(id, InvoiceStatus::Sending, "x", "x@example.com", vec![], 1);

        assert_eq!(repo.save(ghost).unwrap_err(), RepositoryError::Missing(id));
    }

    #[test]
    fn racing_writers_from_same_version_only_one_wins() {
        let repo = Arc::new(InMemoryInvoiceRepository::new());
        let mut sending = repo.save(sendable_draft()).unwrap();
        sending.mark_as_sending();
        let sending = repo.save(sending).unwrap();

        let writers = 6;
        let barrier = Arc::new(Barrier::new(writers));
        let results: Vec<Result<Invoice, RepositoryError>> = thread::scope(|s| {
            let joins: Vec<_> = (0..writers)
                .map(|_| {
                    let repo = repo.clone();
                    let barrier = barrier.clone();
                    let mut copy = sending.clone();
                    s.spawn(move || {
                        copy.mark_as_sent_to_client();
                        barrier.wait();
                        repo.save(copy)
                    })
                })
                .collect();
            joins.into_iter().map(|j| j.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, RepositoryError::Conflict { .. }))
        );
    }
}
