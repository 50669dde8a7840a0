use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use invoicer_invoicing::{DeliveryMessage, NotificationGateway};

/// Accepts every message without delivering anything.
#[derive(Debug, Default)]
pub struct DummyDriver {
    accepted: AtomicU64,
}

impl DummyDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
}

impl NotificationGateway for DummyDriver {
    fn send(&self, message: &DeliveryMessage) -> bool {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        info!(
            driver = "dummy",
            to = %message.to_email,
            subject = %message.subject,
            reference = %message.reference,
            "notification accepted"
        );
        true
    }
}
