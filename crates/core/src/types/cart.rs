//! Cart lines and the authoritative cart.
//!
//! The cart never applies local edits. The only way to change it is to take
//! the list the remote service returned and normalize it with
//! [`Cart::from_server_lines`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// One product in the cart.
///
/// Older snapshots used `id`/`price`/`qty`; those names are still accepted
/// when reading, but lines are always written with the canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    /// Display name captured when the line was added.
    pub name: String,
    /// Unit price captured when the line was added.
    #[serde(alias = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(alias = "qty")]
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Ordered cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build the cart from the list the server returned.
    ///
    /// Server order is kept. Zero-quantity lines are dropped, and repeated
    /// product IDs are folded into the first occurrence. For a well-behaved
    /// service the result is exactly the server list.
    #[must_use]
    pub fn from_server_lines(lines: Vec<CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
        let mut positions: HashMap<ProductId, usize> = HashMap::new();

        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match positions.get(&line.product_id) {
                Some(&index) => {
                    if let Some(existing) = merged.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => {
                    positions.insert(line.product_id, merged.len());
                    merged.push(line);
                }
            }
        }

        Self { lines: merged }
    }

    /// Restore a persisted snapshot.
    ///
    /// A missing or unparseable snapshot yields an empty cart.
    #[must_use]
    pub fn from_snapshot(raw: Option<&str>) -> Self {
        raw.and_then(|json| serde_json::from_str::<Vec<CartLine>>(json).ok())
            .map_or_else(Self::empty, Self::from_server_lines)
    }

    /// Serialize to the persisted snapshot format (a JSON array of lines).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for a product, if it is in the cart.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Sum of all line quantities (the badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
