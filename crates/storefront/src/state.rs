//! Screen state owned by the storefront controller.
//!
//! The cart itself lives in the synchronizer; everything else the screen
//! shows lives here.

use std::time::Duration;

use freshcart_core::{CategoryFilter, Order, Product};

use crate::catalog::{CatalogSource, LoadedCatalog};
use crate::notify::Toast;

/// Catalog, filter, last order, and notification.
#[derive(Debug, Clone)]
pub struct AppState {
    catalog: LoadedCatalog,
    filter: CategoryFilter,
    last_order: Option<Order>,
    toast: Toast,
}

impl AppState {
    /// Create a new application state showing the built-in catalog.
    #[must_use]
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            catalog: LoadedCatalog::fallback(),
            filter: CategoryFilter::All,
            last_order: None,
            toast: Toast::new(toast_ttl),
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.catalog.products
    }

    #[must_use]
    pub const fn catalog_source(&self) -> CatalogSource {
        self.catalog.source
    }

    /// Look up a product in the loaded catalog.
    #[must_use]
    pub fn product(&self, id: freshcart_core::ProductId) -> Option<&Product> {
        self.catalog.products.iter().find(|p| p.id == id)
    }

    pub fn set_catalog(&mut self, catalog: LoadedCatalog) {
        self.catalog = catalog;
    }

    #[must_use]
    pub const fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    #[must_use]
    pub const fn last_order(&self) -> Option<&Order> {
        self.last_order.as_ref()
    }

    pub fn set_last_order(&mut self, order: Order) {
        self.last_order = Some(order);
    }

    #[must_use]
    pub const fn toast(&self) -> &Toast {
        &self.toast
    }

    pub fn toast_mut(&mut self) -> &mut Toast {
        &mut self.toast
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::notify::DEFAULT_TOAST_TTL)
    }
}
