use core::str::FromStr;

use serde::{Deserialize, Serialize};

use invoicer_core::{AggregateId, AggregateRoot, DomainError};

use crate::product_line::ProductLine;

/// Invoice identifier, assigned by the repository on first save.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(AggregateId);

impl InvoiceId {
    /// Fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for InvoiceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("InvoiceId: {s:?}")))
    }
}

/// Invoice status lifecycle.
///
/// Ordered: a status only ever moves forward, `Draft < Sending < SentToClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStatus {
    Draft,
    Sending,
    SentToClient,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sending => "sending",
            InvoiceStatus::SentToClient => "sent-to-client",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == InvoiceStatus::SentToClient
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sending" => Ok(InvoiceStatus::Sending),
            "sent-to-client" => Ok(InvoiceStatus::SentToClient),
            other => Err(DomainError::validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

/// Aggregate root: Invoice.
///
/// Customer data and lines are fixed at construction. Status changes only via
/// [`Invoice::mark_as_sending`] and [`Invoice::mark_as_sent_to_client`]; both are
/// guarded and turn an out-of-order call into a no-op instead of an error.
/// The aggregate never persists itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: Option<InvoiceId>,
    status: InvoiceStatus,
    customer_name: String,
    customer_email: String,
    lines: Vec<ProductLine>,
    version: u64,
}

impl Invoice {
    /// A new, unsaved invoice in `Draft`.
    pub fn draft(
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        lines: Vec<ProductLine>,
    ) -> Self {
        Self {
            id: None,
            status: InvoiceStatus::Draft,
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            lines,
            version: 0,
        }
    }

    /// Rebuild a persisted invoice. For repository implementations.
    pub fn rehydrate(
        id: InvoiceId,
        status: InvoiceStatus,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        lines: Vec<ProductLine>,
        version: u64,
    ) -> Self {
        Self {
            id: Some(id),
            status,
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            lines,
            version,
        }
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn lines(&self) -> &[ProductLine] {
        &self.lines
    }

    /// Sum of all line totals; `Some(0)` for an invoice without lines, `None`
    /// when a line total or the sum overflows.
    pub fn total_price(&self) -> Option<i64> {
        self.lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.line_total()?))
    }

    /// Invariant: only a draft with at least one line, all with positive
    /// quantity and unit price, and a representable total may be sent.
    pub fn can_be_sent(&self) -> bool {
        self.status == InvoiceStatus::Draft
            && !self.lines.is_empty()
            && self
                .lines
                .iter()
                .all(|line| line.quantity() > 0 && line.unit_price() > 0)
            && self.total_price().is_some()
    }

    /// `Draft -> Sending`, when sendable. Returns whether the status changed.
    pub fn mark_as_sending(&mut self) -> bool {
        if self.status == InvoiceStatus::Draft && self.can_be_sent() {
            self.status = InvoiceStatus::Sending;
            return true;
        }
        false
    }

    /// `Sending -> SentToClient`. Returns whether the status changed.
    pub fn mark_as_sent_to_client(&mut self) -> bool {
        if self.status == InvoiceStatus::Sending {
            self.status = InvoiceStatus::SentToClient;
            return true;
        }
        false
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> Option<&Self::Id> {
        self.id.as_ref()
    }

    fn version(&self) -> u64 {
        self.version
    }
}
