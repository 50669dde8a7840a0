use serde::{Deserialize, Serialize};

use invoicer_core::ValueObject;

/// A single billed product on an invoice.
///
/// Lines are not validated on construction: an invoice may hold a line with a
/// zero or negative amount, it just will not be sendable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    name: String,
    quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    unit_price: i64,
}

impl ProductLine {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> i64 {
        self.unit_price
    }

    /// `quantity * unit_price`, in minor units. `None` when the product does
    /// not fit in an `i64`.
    pub fn line_total(&self) -> Option<i64> {
        self.quantity.checked_mul(self.unit_price)
    }
}

impl ValueObject for ProductLine {}
