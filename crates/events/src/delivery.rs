//! Delivery status events reported by a notification provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the provider says happened to a message.
///
/// Only `delivered` drives the invoice lifecycle; anything else is carried
/// through verbatim so consumers can log it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DeliveryAction {
    Delivered,
    Other(String),
}

impl DeliveryAction {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryAction::Delivered => "delivered",
            DeliveryAction::Other(action) => action,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryAction::Delivered)
    }
}

impl From<&str> for DeliveryAction {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("delivered") {
            DeliveryAction::Delivered
        } else {
            DeliveryAction::Other(value.to_string())
        }
    }
}

impl From<String> for DeliveryAction {
    fn from(value: String) -> Self {
        DeliveryAction::from(value.as_str())
    }
}

impl From<DeliveryAction> for String {
    fn from(value: DeliveryAction) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for DeliveryAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider callback: `action` happened to the message tagged `reference`.
///
/// `reference` is whatever the sender attached when handing the message off;
/// for invoices it is the invoice identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub action: DeliveryAction,
    pub reference: String,
    pub occurred_at: DateTime<Utc>,
}

impl DeliveryEvent {
    pub fn delivered(reference: impl Into<String>) -> Self {
        Self {
            action: DeliveryAction::Delivered,
            reference: reference.into(),
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parsing_is_case_insensitive_for_delivered() {
        assert_eq!(DeliveryAction::from("DELIVERED"), DeliveryAction::Delivered);
        assert_eq!(
            DeliveryAction::from("bounced"),
            DeliveryAction::Other("bounced".to_string())
        );
    }

    #[test]
    fn event_serializes_action_as_plain_string() {
        let event = DeliveryEvent::delivered("abc");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "delivered");
        assert_eq!(json["reference"], "abc");

        let back: DeliveryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
