//! View models and HTML fragments for the product grid, cart, and order
//! confirmation.
//!
//! Views are plain data built from domain types, so they can be checked in
//! tests without any UI toolkit. Templates only lay them out.

use askama::Template;
use freshcart_core::{Cart, CartLine, CategoryFilter, Order, Price, Product, filter_products};

/// Shown instead of an empty grid.
pub const NO_PRODUCTS_MESSAGE: &str = "No products in this category right now.";
/// Shown instead of an empty cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";
/// Tag for products without a category.
pub const DEFAULT_TAG: &str = "grocery";
/// Description for products without one.
pub const NO_DESCRIPTION: &str = "No description available.";

// =============================================================================
// Product grid
// =============================================================================

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: i64,
    pub name: String,
    pub tag: String,
    pub description: String,
    pub price: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            tag: product
                .category
                .map_or_else(|| DEFAULT_TAG.to_string(), |c| c.as_str().to_string()),
            description: product
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            price: Price::usd(product.price).display(),
        }
    }
}

/// Product grid display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGridView {
    pub filter: String,
    pub products: Vec<ProductCardView>,
}

impl ProductGridView {
    /// The products passing `filter`, in catalog order.
    #[must_use]
    pub fn new(products: &[Product], filter: CategoryFilter) -> Self {
        Self {
            filter: filter.to_string(),
            products: filter_products(products, filter)
                .into_iter()
                .map(ProductCardView::from)
                .collect(),
        }
    }

    /// The message to show instead of cards, if the grid is empty.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.products.is_empty().then_some(NO_PRODUCTS_MESSAGE)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart row display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub product_id: i64,
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.as_i64(),
            name: line.name.clone(),
            quantity: line.quantity,
            line_price: Price::usd(line.line_total()).display(),
        }
    }
}

/// Cart drawer display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::empty())
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .filter(|line| line.quantity > 0)
                .map(CartItemView::from)
                .collect(),
            total: Price::usd(cart.subtotal()).display(),
            item_count: cart.total_quantity(),
        }
    }
}

// =============================================================================
// Order confirmation
// =============================================================================

/// Order confirmation row display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
}

/// Confirmation heading when the service sends no message of its own.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed";

/// Order confirmation display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummaryView {
    /// The service's confirmation message
    pub heading: String,
    pub order_id: String,
    pub status: String,
    pub total: String,
    pub items: Vec<OrderItemView>,
}

impl OrderSummaryView {
    /// One-line summary, e.g. `Order ID: ORD-1 • Status: OK • Total: $4.20`.
    #[must_use]
    pub fn meta(&self) -> String {
        format!(
            "Order ID: {} • Status: {} • Total: {}",
            self.order_id, self.status, self.total
        )
    }
}

impl From<&Order> for OrderSummaryView {
    /// The displayed total is recomputed from the purchased lines.
    fn from(order: &Order) -> Self {
        let total = order.items_total();
        if total != order.total {
            tracing::warn!(
                order_id = %order.order_id,
                server_total = %order.total,
                items_total = %total,
                "Order total differs from its lines"
            );
        }

        let heading = if order.message.is_empty() {
            ORDER_PLACED_MESSAGE
        } else {
            order.message.as_str()
        };

        Self {
            heading: heading.to_string(),
            order_id: order.order_id.clone(),
            status: order.status.clone(),
            total: Price::usd(total).display(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_price: Price::usd(item.line_total()).display(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product grid fragment.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: ProductGridView,
}

/// Cart drawer fragment.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Order confirmation fragment.
#[derive(Template)]
#[template(path = "partials/order_confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order: OrderSummaryView,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshcart_core::{Category, ProductId, fallback_catalog};
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::{line, order};

    #[test]
    fn test_product_card_defaults() {
        let product = Product {
            id: ProductId::new(12),
            name: "Mystery Box".to_string(),
            category: None,
            price: Decimal::new(1000, 2),
            description: None,
        };
        let card = ProductCardView::from(&product);

        assert_eq!(card.tag, DEFAULT_TAG);
        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.price, "$10.00");
    }

    #[test]
    fn test_grid_filter_by_category() {
        let grid =
            ProductGridView::new(&fallback_catalog(), CategoryFilter::Only(Category::Bakery));
        let names: Vec<&str> = grid.products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, ["Sourdough Bread", "Croissants"]);
        assert!(grid.products.iter().all(|p| p.tag == "bakery"));
        assert_eq!(grid.empty_message(), None);
    }

    #[test]
    fn test_grid_all_shows_everything() {
        let grid = ProductGridView::new(&fallback_catalog(), CategoryFilter::All);
        assert_eq!(grid.products.len(), 6);
    }

    #[test]
    fn test_empty_grid_renders_message() {
        let grid = ProductGridView::new(&[], CategoryFilter::Only(Category::Dairy));
        assert_eq!(grid.empty_message(), Some(NO_PRODUCTS_MESSAGE));

        let html = ProductGridTemplate { grid }.render().unwrap();
        assert!(html.contains(NO_PRODUCTS_MESSAGE));
        assert!(!html.contains("<article"));
    }

    #[test]
    fn test_grid_escapes_product_names() {
        let product = Product {
            id: ProductId::new(1),
            name: "<script>alert(1)</script>".to_string(),
            category: Some(Category::Produce),
            price: Decimal::ONE,
            description: None,
        };
        let grid = ProductGridView::new(&[product], CategoryFilter::All);
        let html = ProductGridTemplate { grid }.render().unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("data-add=\"1\""));
    }

    #[test]
    fn test_cart_view_totals() {
        let cart = Cart::from_server_lines(vec![
            line(1, "Bananas", 199, 3),
            line(3, "Sourdough Bread", 420, 1),
        ]);
        let view = CartView::from(&cart);

        assert_eq!(view.item_count, 4);
        assert_eq!(view.total, "$10.17");
        assert_eq!(view.items[0].line_price, "$5.97");
    }

    #[test]
    fn test_empty_cart_renders_message() {
        let html = CartItemsTemplate {
            cart: CartView::empty(),
        }
        .render()
        .unwrap();

        assert!(html.contains(EMPTY_CART_MESSAGE));
        assert!(html.contains("$0.00"));
    }

    #[test]
    fn test_cart_renders_quantity_controls() {
        let cart = Cart::from_server_lines(vec![line(5, "Whole Milk", 315, 2)]);
        let html = CartItemsTemplate {
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();

        assert!(html.contains("data-dec=\"5\""));
        assert!(html.contains("data-inc=\"5\""));
        assert!(html.contains("data-remove=\"5\""));
        assert!(html.contains("Qty 2"));
        assert!(html.contains("$6.30"));
    }

    #[test]
    fn test_order_summary_total_is_sum_of_lines() {
        let mut placed = order(
            "ORD-42",
            vec![line(1, "Bananas", 199, 2), line(4, "Croissants", 550, 1)],
        );
        // A server rounding quirk must not change what the customer sees
        placed.total = Decimal::new(948, 2);

        let view = OrderSummaryView::from(&placed);
        assert_eq!(view.total, "$9.48");
        assert_eq!(view.meta(), "Order ID: ORD-42 • Status: OK • Total: $9.48");
        assert_eq!(view.items[0].line_price, "$3.98");

        let html = OrderConfirmationTemplate { order: view }.render().unwrap();
        assert!(html.contains("Croissants × 1"));
    }

    #[test]
    fn test_order_heading_comes_from_service_message() {
        let mut placed = order("ORD-7", vec![line(2, "Bananas", 199, 1)]);
        placed.message = "Thanks, see you soon".to_string();
        let html = OrderConfirmationTemplate {
            order: OrderSummaryView::from(&placed),
        }
        .render()
        .unwrap();
        assert!(html.contains("<h2>Thanks, see you soon</h2>"));

        placed.message.clear();
        assert_eq!(OrderSummaryView::from(&placed).heading, ORDER_PLACED_MESSAGE);
    }
}
