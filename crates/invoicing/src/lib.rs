//! Invoicing domain module.
//!
//! Business rules for invoices and their delivery lifecycle, plus the two use
//! case orchestrators that drive it: [`InvoiceService`] (create/fetch/send) and
//! [`DeliveryConfirmationHandler`] (asynchronous "delivered" callbacks).
//!
//! Storage and notification transport are reached only through the traits in
//! [`ports`]; this crate performs no IO of its own.

pub mod delivery;
pub mod error;
pub mod invoice;
pub mod ports;
pub mod product_line;
pub mod service;

#[cfg(test)]
mod test_support;

pub use delivery::{DeliveryCallback, DeliveryConfirmationHandler, DeliveryOutcome};
pub use error::InvoicingError;
pub use invoice::{Invoice, InvoiceId, InvoiceStatus};
pub use ports::{DeliveryMessage, InvoiceRepository, NotificationGateway, RepositoryError};
pub use product_line::ProductLine;
pub use service::{INVOICE_SUBJECT, InvoiceService, delivery_message};
