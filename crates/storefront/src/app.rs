//! Storefront controller.
//!
//! Wires the catalog, the cart synchronizer, and the notification slot
//! together, and is the one place errors stop: every failure here becomes a
//! notification and leaves state as it was.

use freshcart_core::{Cart, CategoryFilter, Order, ProductId};
use tracing::{debug, instrument};

use crate::api::{AddLineRequest, StoreApi};
use crate::catalog::{self, CatalogSource};
use crate::config::StorefrontConfig;
use crate::error::{self, StorefrontError, add_breadcrumb};
use crate::render::{
    CartItemsTemplate, CartView, ORDER_PLACED_MESSAGE, OrderConfirmationTemplate, OrderSummaryView,
    ProductGridTemplate, ProductGridView,
};
use crate::state::AppState;
use crate::storage::KeyValueStore;
use crate::sync::CartSynchronizer;

/// Shown after a successful add.
pub const ADDED_MESSAGE: &str = "Added to cart";

/// The storefront: catalog on one side, cart on the other.
pub struct Storefront<A, S> {
    sync: CartSynchronizer<A, S>,
    state: AppState,
    catalog_limit: Option<u32>,
}

impl<A: StoreApi, S: KeyValueStore> Storefront<A, S> {
    /// Build a storefront showing the persisted cart and the built-in
    /// catalog. Nothing is fetched until [`Storefront::start`].
    pub fn new(api: A, store: S, config: &StorefrontConfig) -> Self {
        Self {
            sync: CartSynchronizer::restore(api, store),
            state: AppState::new(config.toast_ttl),
            catalog_limit: config.api.catalog_limit,
        }
    }

    /// Bring the cart and catalog up to date with the service.
    pub async fn start(&mut self) {
        self.sync_cart().await;
        self.load_catalog().await;
    }

    /// Replace the cached cart with the service's copy.
    ///
    /// On failure the cached cart stays on screen.
    #[instrument(skip(self))]
    pub async fn sync_cart(&mut self) -> bool {
        match self.sync.refresh().await {
            Ok(_) => true,
            Err(e) => self.fail(e),
        }
    }

    /// Reload the catalog, falling back to the built-in list.
    #[instrument(skip(self))]
    pub async fn load_catalog(&mut self) -> CatalogSource {
        let loaded = catalog::load_catalog(self.sync.api(), self.catalog_limit).await;
        let source = loaded.source;
        self.state.set_catalog(loaded);
        source
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        let label = filter.to_string();
        add_breadcrumb("catalog", "Filter changed", Some(&[("filter", label.as_str())]));
        self.state.set_filter(filter);
    }

    /// Add one unit of a catalog product.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&mut self, product_id: ProductId) -> bool {
        let id = product_id.to_string();
        add_breadcrumb("cart", "Add to cart", Some(&[("product_id", id.as_str())]));

        let Some(product) = self.state.product(product_id) else {
            return self.fail(StorefrontError::ProductNotFound(product_id));
        };
        let request = AddLineRequest::one(product);

        match self.sync.add_line(request).await {
            Ok(_) => {
                self.state.toast_mut().show(ADDED_MESSAGE);
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// One more of a product already in the cart.
    pub async fn increment(&mut self, product_id: ProductId) -> bool {
        self.step(product_id, 1).await
    }

    /// One fewer of a product already in the cart.
    ///
    /// Going below one is the service's call; it normally drops the line.
    pub async fn decrement(&mut self, product_id: ProductId) -> bool {
        self.step(product_id, -1).await
    }

    async fn step(&mut self, product_id: ProductId, delta: i64) -> bool {
        let Some(line) = self.sync.cart().line(product_id) else {
            debug!(%product_id, "Not in cart, ignoring quantity change");
            return false;
        };
        let quantity = i64::from(line.quantity) + delta;
        self.update_quantity(product_id, quantity).await
    }

    /// Set a line's quantity. Zero and negative values are sent as-is.
    #[instrument(skip(self))]
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        let (id, qty) = (product_id.to_string(), quantity.to_string());
        add_breadcrumb(
            "cart",
            "Update quantity",
            Some(&[("product_id", id.as_str()), ("quantity", qty.as_str())]),
        );

        match self.sync.update_quantity(product_id, quantity).await {
            Ok(_) => true,
            Err(e) => self.fail(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) -> bool {
        let id = product_id.to_string();
        add_breadcrumb("cart", "Remove from cart", Some(&[("product_id", id.as_str())]));

        match self.sync.remove_line(product_id).await {
            Ok(_) => true,
            Err(e) => self.fail(e),
        }
    }

    /// Place an order for the current cart.
    ///
    /// Returns the order on success; the cart is empty afterwards.
    #[instrument(skip(self))]
    pub async fn checkout(&mut self) -> Option<&Order> {
        add_breadcrumb("checkout", "Checkout", None);

        match self.sync.checkout().await {
            Ok(order) => {
                let message = if order.message.is_empty() {
                    ORDER_PLACED_MESSAGE.to_string()
                } else {
                    order.message.clone()
                };
                self.state.toast_mut().show(message);
                self.state.set_last_order(order);
                self.state.last_order()
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Report an error and show its message. Always returns `false`.
    fn fail(&mut self, error: StorefrontError) -> bool {
        error::report(&error);
        self.state.toast_mut().show(error.user_message());
        false
    }

    // =========================================================================
    // Read side
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.sync.cart()
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        self.sync.api()
    }

    /// The notification currently visible, if any.
    #[must_use]
    pub fn notification(&self) -> Option<&str> {
        self.state.toast().visible()
    }

    /// The most recent notification, visible or not.
    #[must_use]
    pub fn last_notification(&self) -> Option<&str> {
        self.state.toast().last()
    }

    #[must_use]
    pub fn product_grid(&self) -> ProductGridView {
        ProductGridView::new(self.state.products(), self.state.filter())
    }

    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::from(self.sync.cart())
    }

    #[must_use]
    pub fn order_summary(&self) -> Option<OrderSummaryView> {
        self.state.last_order().map(OrderSummaryView::from)
    }

    /// Render the product grid fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_products(&self) -> Result<String, askama::Error> {
        askama::Template::render(&ProductGridTemplate {
            grid: self.product_grid(),
        })
    }

    /// Render the cart drawer fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_cart(&self) -> Result<String, askama::Error> {
        askama::Template::render(&CartItemsTemplate {
            cart: self.cart_view(),
        })
    }

    /// Render the confirmation for the last order, if one was placed.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_order(&self) -> Result<Option<String>, askama::Error> {
        self.order_summary()
            .map(|order| askama::Template::render(&OrderConfirmationTemplate { order }))
            .transpose()
    }
}
