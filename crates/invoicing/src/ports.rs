//! Boundaries to the outside world: invoice storage and notification hand-off.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::invoice::{Invoice, InvoiceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Another writer saved the invoice since it was loaded.
    #[error("concurrent write detected for invoice {id} (expected version {expected}, found {actual})")]
    Conflict {
        id: InvoiceId,
        expected: u64,
        actual: u64,
    },

    /// An update targeted an invoice the store has never seen.
    #[error("invoice {0} does not exist")]
    Missing(InvoiceId),

    /// The store could not be reached or is in a broken state.
    #[error("invoice store unavailable: {0}")]
    Unavailable(String),
}

/// Invoice persistence.
///
/// Implementations must serialise writes per invoice: `save` of an invoice that
/// was loaded at version `n` succeeds only if the stored version is still `n`,
/// and fails with [`RepositoryError::Conflict`] otherwise. A stale copy must
/// never overwrite newer state.
pub trait InvoiceRepository: Send + Sync {
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError>;

    /// Insert (no id yet: assigns one) or update in place. Returns the stored
    /// invoice with its identifier and new version.
    ///
    /// Lines are immutable after creation; on update only the status is taken
    /// from `invoice`.
    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
}

impl<R> InvoiceRepository for Arc<R>
where
    R: InvoiceRepository + ?Sized,
{
    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn save(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        (**self).save(invoice)
    }
}

/// Outbound notification, tagged with a `reference` the provider echoes back
/// in its delivery callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMessage {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub reference: String,
}

/// Notification transport (email, SMS, ...).
///
/// `send` reports whether the transport *accepted* the message for delivery.
/// Delivery itself is confirmed later, out-of-band, through the delivery
/// callback.
pub trait NotificationGateway: Send + Sync {
    fn send(&self, message: &DeliveryMessage) -> bool;
}

impl<G> NotificationGateway for Arc<G>
where
    G: NotificationGateway + ?Sized,
{
    fn send(&self, message: &DeliveryMessage) -> bool {
        (**self).send(message)
    }
}
