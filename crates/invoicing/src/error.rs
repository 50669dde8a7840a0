use thiserror::Error;

use crate::invoice::{InvoiceId, InvoiceStatus};
use crate::ports::RepositoryError;

/// Failures of the invoicing use cases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoicingError {
    #[error("invoice {0} not found")]
    NotFound(InvoiceId),

    /// Wrong status, no lines, or a line with a non-positive amount.
    #[error("invoice {id} cannot be sent (status: {status})")]
    NotSendable { id: InvoiceId, status: InvoiceStatus },

    /// The gateway refused the hand-off. The invoice stays in `Sending`.
    #[error("notification for invoice {0} was rejected by the gateway")]
    NotificationRejected(InvoiceId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InvoicingError {
    /// True for "fix the invoice and try again" failures, which leave no side
    /// effects behind.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            InvoicingError::NotFound(_) | InvoicingError::NotSendable { .. }
        )
    }
}
