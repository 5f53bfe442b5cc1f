//! Status enums and fixed label sets for store entities.
//!
//! Wire names match the hosted collections exactly ("Active", "Pending",
//! "COD", ...) - these are the literal strings the admin tooling writes.

use serde::{Deserialize, Serialize};

/// Product lifecycle status.
///
/// Only `Active` products are ever fetched by the storefront; `Inactive`
/// exists so admin-written records still project cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    /// The wire value stored in the `status` field of product records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

/// Order processing status.
///
/// Orders are write-only from the storefront; every new order starts
/// `Pending`. The remaining states belong to the fulfilment tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment settlement status recorded on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Payment method label chosen at checkout.
///
/// No payment processing happens here - the label is recorded on the order
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    #[serde(rename = "Net Banking")]
    NetBanking,
}

impl PaymentMethod {
    /// All methods offered at checkout, in display order.
    pub const ALL: [Self; 4] = [Self::Cod, Self::Upi, Self::Card, Self::NetBanking];

    /// The wire label recorded on orders.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::NetBanking => "Net Banking",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Upi => "UPI",
            Self::Card => "Card",
            Self::NetBanking => "Net Banking",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "UPI" => Ok(Self::Upi),
            "Card" => Ok(Self::Card),
            "Net Banking" => Ok(Self::NetBanking),
            _ => Err(UnknownLabelError {
                label: s.to_string(),
            }),
        }
    }
}

/// A label that does not belong to the fixed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown label: {label}")]
pub struct UnknownLabelError {
    /// The offending label.
    pub label: String,
}
