use serde::Deserialize;

use invoicer_core::{DomainError, DomainResult};
use invoicer_invoicing::{Invoice, ProductLine};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub product_lines: Vec<ProductLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ProductLineRequest {
    #[serde(alias = "productName", default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    /// Unit price in minor units.
    #[serde(alias = "unitPrice", default)]
    pub price: i64,
}

impl CreateInvoiceRequest {
    /// Customer fields must be present and the invoice total must fit in an
    /// `i64`. Non-positive amounts are left to the send precondition so a
    /// draft can be created and fixed up later.
    pub fn validate(&self) -> DomainResult<()> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer_name must not be empty"));
        }
        if self.customer_email.trim().is_empty() {
            return Err(DomainError::validation("customer_email must not be empty"));
        }
        let total = self.product_lines.iter().try_fold(0i64, |acc, l| {
            l.quantity
                .checked_mul(l.price)
                .and_then(|line_total| acc.checked_add(line_total))
        });
        if total.is_none() {
            return Err(DomainError::validation("product line amounts are too large"));
        }
        Ok(())
    }

    pub fn into_lines(self) -> (String, String, Vec<ProductLine>) {
        let lines = self
            .product_lines
            .into_iter()
            .map(|l| ProductLine::new(l.name, l.quantity, l.price))
            .collect();
        (self.customer_name, self.customer_email, lines)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn invoice_to_json(invoice: &Invoice) -> serde_json::Value {
    serde_json::json!({
        "id": invoice.invoice_id().map(|id| id.to_string()),
        "status": invoice.status().as_str(),
        "customer_name": invoice.customer_name(),
        "customer_email": invoice.customer_email(),
        "product_lines": invoice.lines().iter().map(|l| serde_json::json!({
            "name": l.name(),
            "quantity": l.quantity(),
            "price": l.unit_price(),
            "total_price": l.line_total(),
        })).collect::<Vec<_>>(),
        "total_price": invoice.total_price(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_case_line_fields() {
        let body: CreateInvoiceRequest = serde_json::from_value(serde_json::json!({
            "customer_name": "Jane",
            "customer_email": "jane@example.com",
            "product_lines": [
                { "productName": "Widget", "quantity": 2, "unitPrice": 100 },
                { "name": "Gadget", "quantity": 1, "price": 250 }
            ]
        }))
        .unwrap();

        body.validate().unwrap();
        let (_, _, lines) = body.into_lines();
        assert_eq!(lines[0], ProductLine::new("Widget", 2, 100));
        assert_eq!(lines[1], ProductLine::new("Gadget", 1, 250));
    }

    #[test]
    fn blank_customer_is_rejected() {
        let body = CreateInvoiceRequest {
            customer_name: "  ".to_string(),
            customer_email: "jane@example.com".to_string(),
            product_lines: Vec::new(),
        };
        assert!(matches!(body.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let line = |quantity, price| ProductLineRequest {
            name: "Bulk".to_string(),
            quantity,
            price,
        };
        for product_lines in [
            vec![line(i64::MAX / 2, 3)],
            vec![line(1, i64::MAX), line(1, 1)],
        ] {
            let body = CreateInvoiceRequest {
                customer_name: "Jane".to_string(),
                customer_email: "jane@example.com".to_string(),
                product_lines,
            };
            assert!(matches!(body.validate(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn invoice_json_carries_totals() {
        let invoice = Invoice::draft(
            "Jane",
            "jane@example.com",
            vec![ProductLine::new("Widget", 3, 125)],
        );
        let json = invoice_to_json(&invoice);

        assert_eq!(json["status"], "draft");
        assert!(json["id"].is_null());
        assert_eq!(json["product_lines"][0]["total_price"], 375);
        assert_eq!(json["total_price"], 375);
    }
}
