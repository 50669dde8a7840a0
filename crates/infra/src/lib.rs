//! Infrastructure layer: storage, notification drivers, background workers, config.

pub mod config;
pub mod notifications;
pub mod repository;
pub mod workers;


pub use config::{AppConfig, ConfigError, NotificationDriverKind};
pub use notifications::{DummyDriver, SimulatedProvider, SimulatedProviderConfig};
pub use repository::InMemoryInvoiceRepository;
pub use workers::{ConfirmationWorker, WorkerHandle};
