//! Notification drivers implementing [`invoicer_invoicing::NotificationGateway`].
//!
//! - [`DummyDriver`]: accepts and logs; nothing ever confirms delivery.
//! - [`SimulatedProvider`]: accepts, then reports `delivered` on the delivery
//!   event bus after a delay, the way a real provider's webhook would.

pub mod dummy;
pub mod simulated;

pub use dummy::DummyDriver;
pub use simulated::{SimulatedProvider, SimulatedProviderConfig};
