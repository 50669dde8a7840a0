//! Delivery events and the in-process bus that carries them.
//!
//! Notification providers report what happened to a message out-of-band. This
//! crate defines the event shape and a transport-agnostic pub/sub contract so
//! the confirmation side can be driven by a webhook, a queue, or an in-memory
//! channel without the domain knowing which.

pub mod bus;
pub mod delivery;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use delivery::{DeliveryAction, DeliveryEvent};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
