//! Remote store API: cart, checkout, and catalog endpoints.
//!
//! # Architecture
//!
//! - The remote cart is the source of truth; every mutation returns the full
//!   authoritative line list
//! - [`StoreApi`] is the seam between the synchronizer and the transport, so
//!   cart rules can be tested without a network
//! - [`HttpStoreClient`] is the `reqwest` implementation; it tags every request
//!   with the session header and caches catalog responses via `moka`
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | GET | `/cart` | | `{ items }` |
//! | POST | `/cart/add` | [`AddLineRequest`] | `{ items }` |
//! | PUT | `/cart/update` | [`UpdateQuantityRequest`] | `{ items }` |
//! | POST | `/cart/remove` | [`RemoveLineRequest`] | `{ items }` |
//! | POST | `/checkout` | [`CheckoutRequest`] | [`Order`] |
//! | GET | `/products/` | | `[RemoteProduct]` |

mod client;

pub use client::HttpStoreClient;

use std::future::Future;

use freshcart_core::{CartLine, Category, Order, Product, ProductId, SERVER_PRODUCT_DESCRIPTION};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StorefrontError;

/// Header carrying the per-browser session identifier.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Operations the storefront needs from the remote service.
///
/// Every cart mutation resolves to the server's authoritative line list.
pub trait StoreApi {
    /// `GET /cart`
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartLine>, StorefrontError>> + Send;

    /// `POST /cart/add`
    fn add_line(
        &self,
        request: AddLineRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, StorefrontError>> + Send;

    /// `PUT /cart/update`
    ///
    /// The quantity is passed through untouched; zero or negative values are
    /// the server's to interpret.
    fn update_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, StorefrontError>> + Send;

    /// `POST /cart/remove`
    fn remove_line(
        &self,
        request: RemoveLineRequest,
    ) -> impl Future<Output = Result<Vec<CartLine>, StorefrontError>> + Send;

    /// `POST /checkout`
    fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> impl Future<Output = Result<Order, StorefrontError>> + Send;

    /// `GET /products/`, optionally limited.
    fn list_products(
        &self,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<RemoteProduct>, StorefrontError>> + Send;
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl AddLineRequest {
    /// Add one unit of a catalog product.
    #[must_use]
    pub fn one(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }
}

/// Body of `PUT /cart/update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Body of `POST /cart/remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoveLineRequest {
    pub product_id: ProductId,
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
}

// =============================================================================
// Response bodies
// =============================================================================

/// `{ items }` envelope returned by every cart endpoint.
///
/// A response without `items` is read as an empty cart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// A product as listed by `GET /products/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: i64,
    pub name: String,
    /// Customer-facing price; older services call this `customer_price`.
    #[serde(
        default,
        alias = "customer_price",
        with = "rust_decimal::serde::float_option"
    )]
    pub price_customer: Option<Decimal>,
}

impl RemoteProduct {
    /// Convert to a catalog product.
    ///
    /// The category is derived from the ID and the description is fixed,
    /// since the service provides neither. A missing price becomes zero.
    #[must_use]
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            category: Category::for_product_id(self.id),
            price: self.price_customer.unwrap_or(Decimal::ZERO),
            description: Some(SERVER_PRODUCT_DESCRIPTION.to_string()),
        }
    }
}

/// Pull the most specific message out of a failure body.
///
/// Understands `{"detail": "..."}` and validation errors shaped like
/// `{"detail": [{"msg": "..."}]}`.
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        serde_json::Value::Array(errors) => errors
            .first()
            .and_then(|error| error.get("msg"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_string() {
        assert_eq!(
            error_detail(r#"{"detail":"Product not in cart"}"#).as_deref(),
            Some("Product not in cart")
        );
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body = r#"{"detail":[
            {"loc":["body","quantity"],"msg":"Input should be greater than or equal to 1"},
            {"loc":["body","name"],"msg":"Field required"}
        ]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("Input should be greater than or equal to 1")
        );
    }

    #[test]
    fn test_error_detail_missing_or_unparseable() {
        assert_eq!(error_detail(""), None);
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail(r#"{"error":"nope"}"#), None);
        assert_eq!(error_detail(r#"{"detail":""}"#), None);
        assert_eq!(error_detail(r#"{"detail":42}"#), None);
    }

    #[test]
    fn test_remote_product_accepts_both_price_names() {
        let a: RemoteProduct =
            serde_json::from_str(r#"{"id":7,"name":"Kale","price_customer":2.5}"#).unwrap();
        let b: RemoteProduct =
            serde_json::from_str(r#"{"id":7,"name":"Kale","customer_price":2.5}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.price_customer, Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_remote_product_into_product() {
        let body = r#"{"id":8,"name":"Cheddar","price_customer":null,"image_url":null}"#;
        let remote: RemoteProduct = serde_json::from_str(body).unwrap();
        let product = remote.into_product();

        assert_eq!(product.id, ProductId::new(8));
        assert_eq!(product.category, Some(Category::Dairy));
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.description.as_deref(), Some(SERVER_PRODUCT_DESCRIPTION));
    }

    #[test]
    fn test_cart_response_without_items_is_empty() {
        let response: CartResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_add_line_request_wire_shape() {
        let request = AddLineRequest {
            product_id: ProductId::new(2),
            name: "Avocados".to_string(),
            unit_price: Decimal::new(349, 2),
            quantity: 1,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"product_id":2,"name":"Avocados","unit_price":3.49,"quantity":1}"#
        );
    }
}
