//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryFilter};
use super::id::ProductId;

/// Description given to products loaded from the remote catalog.
pub const SERVER_PRODUCT_DESCRIPTION: &str = "Freshly sourced and quality checked.";

/// A product shown in the grid.
///
/// Immutable for a session; the catalog is replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<Category>,
    /// Unit price charged to the customer.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: Option<String>,
}

/// Keep only the products that pass `filter`, preserving catalog order.
#[must_use]
pub fn filter_products(products: &[Product], filter: CategoryFilter) -> Vec<&Product> {
    products
        .iter()
        .filter(|product| filter.matches(product.category))
        .collect()
}

/// The built-in catalog used whenever the remote catalog is unavailable or empty.
#[must_use]
pub fn fallback_catalog() -> Vec<Product> {
    [
        (1, "Bananas", Category::Produce, 199, "Fresh yellow bananas, 1 lb."),
        (2, "Avocados", Category::Produce, 349, "Hass avocados, pack of 4."),
        (3, "Sourdough Bread", Category::Bakery, 420, "Baked this morning."),
        (4, "Croissants", Category::Bakery, 550, "Buttery french-style croissants."),
        (5, "Whole Milk", Category::Dairy, 315, "1 gallon, vitamin D."),
        (6, "Greek Yogurt", Category::Dairy, 445, "Plain yogurt, 32oz tub."),
    ]
    .into_iter()
    .map(|(id, name, category, cents, description)| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: Some(category),
        price: Decimal::new(cents, 2),
        description: Some(description.to_string()),
    })
    .collect()
}
