//! Invoice use cases: create, fetch, send.

use tracing::{debug, info, warn};

use crate::error::InvoicingError;
use crate::invoice::{Invoice, InvoiceId};
use crate::ports::{DeliveryMessage, InvoiceRepository, NotificationGateway};
use crate::product_line::ProductLine;

/// Subject line of every invoice notification.
pub const INVOICE_SUBJECT: &str = "Your Invoice is Ready";

/// Build the notification for a persisted invoice, or `None` when its total
/// cannot be represented.
pub fn delivery_message(invoice: &Invoice, id: InvoiceId) -> Option<DeliveryMessage> {
    let total = invoice.total_price()?;
    Some(DeliveryMessage {
        to_email: invoice.customer_email().to_string(),
        subject: INVOICE_SUBJECT.to_string(),
        body: format!(
            "Dear {}, your invoice #{} is ready for review. Total amount: {}.",
            invoice.customer_name(),
            id,
            total
        ),
        reference: id.to_string(),
    })
}

/// Orchestrates the invoice use cases over a repository and a gateway.
///
/// Sending is fire-and-forget: `send_invoice` returns once the gateway accepted
/// the hand-off and never waits for the delivery confirmation.
#[derive(Debug, Clone)]
pub struct InvoiceService<R, G> {
    repository: R,
    gateway: G,
}

impl<R, G> InvoiceService<R, G>
where
    R: InvoiceRepository,
    G: NotificationGateway,
{
    pub fn new(repository: R, gateway: G) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a draft invoice with its full line set and persist it.
    pub fn create_invoice(
        &self,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        lines: Vec<ProductLine>,
    ) -> Result<Invoice, InvoicingError> {
        let invoice = Invoice::draft(customer_name, customer_email, lines);
        let stored = self.repository.save(invoice)?;

        info!(
            invoice_id = ?stored.invoice_id(),
            lines = stored.lines().len(),
            total = ?stored.total_price(),
            "invoice created"
        );
        Ok(stored)
    }

    /// `Ok(None)` when no invoice has this id.
    pub fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoicingError> {
        Ok(self.repository.find_by_id(id)?)
    }

    /// Move a sendable draft to `Sending`, persist it, and hand the notification
    /// to the gateway.
    ///
    /// Precondition failures (`NotFound`, `NotSendable`) have no side effects.
    /// If the gateway rejects the message the invoice has already been saved
    /// as `Sending` and stays there.
    pub fn send_invoice(&self, id: InvoiceId) -> Result<(), InvoicingError> {
        let Some(mut invoice) = self.repository.find_by_id(id)? else {
            debug!(invoice_id = %id, "send requested for unknown invoice");
            return Err(InvoicingError::NotFound(id));
        };

        let message = match delivery_message(&invoice, id) {
            Some(message) if invoice.can_be_sent() => message,
            _ => {
                debug!(invoice_id = %id, status = %invoice.status(), "invoice is not sendable");
                return Err(InvoicingError::NotSendable {
                    id,
                    status: invoice.status(),
                });
            }
        };

        invoice.mark_as_sending();
        let invoice = self.repository.save(invoice)?;
        info!(invoice_id = %id, status = %invoice.status(), "invoice marked as sending");

        if !self.gateway.send(&message) {
            warn!(invoice_id = %id, to = %message.to_email, "notification hand-off rejected");
            return Err(InvoicingError::NotificationRejected(id));
        }

        info!(invoice_id = %id, to = %message.to_email, "invoice notification handed off");
        Ok(())
    }
}
