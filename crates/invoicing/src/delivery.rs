//! Delivery confirmation: the inbound side of the send protocol.
//!
//! A provider reports "delivered" for a reference some time after the hand-off.
//! The report may come more than once, late, or concurrently from several
//! workers. Applying it is an idempotent read-modify-write: only the first
//! successful application moves the invoice from `Sending` to `SentToClient`;
//! every other one is absorbed as a no-op.

use std::sync::Arc;

use tracing::{debug, info};

use crate::invoice::{InvoiceId, InvoiceStatus};
use crate::ports::{InvoiceRepository, RepositoryError};

/// Attempts at the read-modify-write before a conflict is reported.
pub const MAX_CONFLICT_ATTEMPTS: usize = 3;

/// What a confirmation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// `Sending -> SentToClient` was applied and persisted.
    Confirmed,
    /// The invoice was in another status; nothing changed.
    Ignored(InvoiceStatus),
    /// No invoice matches the reference; the signal was dropped.
    UnknownInvoice,
}

/// Applies "delivered" signals to invoices.
#[derive(Debug, Clone)]
pub struct DeliveryConfirmationHandler<R> {
    repository: R,
}

impl<R> DeliveryConfirmationHandler<R>
where
    R: InvoiceRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn handle(&self, invoice_id: InvoiceId) -> Result<DeliveryOutcome, RepositoryError> {
        let mut attempt = 1;
        loop {
            let Some(mut invoice) = self.repository.find_by_id(invoice_id)? else {
                debug!(invoice_id = %invoice_id, "delivery confirmation for unknown invoice dropped");
                return Ok(DeliveryOutcome::UnknownInvoice);
            };

            if !invoice.mark_as_sent_to_client() {
                debug!(
                    invoice_id = %invoice_id,
                    status = %invoice.status(),
                    "delivery confirmation ignored"
                );
                return Ok(DeliveryOutcome::Ignored(invoice.status()));
            }

            match self.repository.save(invoice) {
                Ok(_) => {
                    info!(invoice_id = %invoice_id, "invoice marked as sent to client");
                    return Ok(DeliveryOutcome::Confirmed);
                }
                Err(RepositoryError::Conflict { .. }) if attempt < MAX_CONFLICT_ATTEMPTS => {
                    debug!(invoice_id = %invoice_id, attempt, "confirmation lost a write race, reloading");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Inbound delivery callback, keyed by the reference attached at hand-off.
///
/// May be invoked any number of times per reference, in any order.
pub trait DeliveryCallback: Send + Sync {
    fn delivered(&self, reference: &str) -> Result<DeliveryOutcome, RepositoryError>;
}

impl<R> DeliveryCallback for DeliveryConfirmationHandler<R>
where
    R: InvoiceRepository,
{
    fn delivered(&self, reference: &str) -> Result<DeliveryOutcome, RepositoryError> {
        match reference.parse::<InvoiceId>() {
            Ok(id) => self.handle(id),
            Err(_) => {
                debug!(reference, "delivery confirmation with foreign reference dropped");
                Ok(DeliveryOutcome::UnknownInvoice)
            }
        }
    }
}

impl<C> DeliveryCallback for Arc<C>
where
    C: DeliveryCallback + ?Sized,
{
    fn delivered(&self, reference: &str) -> Result<DeliveryOutcome, RepositoryError> {
        (**self).delivered(reference)
    }
}
