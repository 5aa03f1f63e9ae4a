//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the commerce API.
///
/// Values the client does not know about deserialize to `Unknown` so a new
/// backend status never breaks order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Returns `true` once the order can no longer change.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Online,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let status: OrderStatus = serde_json::from_str("\"returned\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_is_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Pending.is_final());
    }

    #[test]
    fn test_payment_method_default_is_cod() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"cod\"");
    }
}
