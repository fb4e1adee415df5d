//! Orders returned by checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLine;

/// A placed order. Produced by the remote checkout, never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned identifier, e.g. `ORD-3F9A1C2B7D`.
    pub order_id: String,
    pub status: String,
    /// Total as reported by the server.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<CartLine>,
    /// Confirmation message to show the customer.
    #[serde(default)]
    pub message: String,
}

impl Order {
    /// Sum of `unit_price × quantity` over the purchased lines.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }
}
