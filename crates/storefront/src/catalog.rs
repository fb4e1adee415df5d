//! Catalog loader with a built-in fallback.

use freshcart_core::{Product, fallback_catalog};
use tracing::{info, instrument, warn};

use crate::api::{RemoteProduct, StoreApi};

/// Where the products on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSource {
    Remote,
    #[default]
    Fallback,
}

/// The result of a catalog load. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCatalog {
    pub products: Vec<Product>,
    pub source: CatalogSource,
}

impl LoadedCatalog {
    /// The built-in product list.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            products: fallback_catalog(),
            source: CatalogSource::Fallback,
        }
    }
}

impl Default for LoadedCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Fetch the remote catalog, substituting the built-in list on any failure
/// or an empty listing.
#[instrument(skip(api))]
pub async fn load_catalog<A: StoreApi>(api: &A, limit: Option<u32>) -> LoadedCatalog {
    match api.list_products(limit).await {
        Ok(remote) if !remote.is_empty() => {
            info!(products = remote.len(), "Loaded remote catalog");
            LoadedCatalog {
                products: remote.into_iter().map(RemoteProduct::into_product).collect(),
                source: CatalogSource::Remote,
            }
        }
        Ok(_) => {
            info!("Remote catalog is empty, using built-in products");
            LoadedCatalog::fallback()
        }
        Err(e) => {
            warn!(error = %e, "Catalog load failed, using built-in products");
            LoadedCatalog::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use freshcart_core::{Category, ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::{Call, ScriptedApi};

    fn remote(id: i64, name: &str, cents: i64) -> RemoteProduct {
        RemoteProduct {
            id,
            name: name.to_string(),
            price_customer: Some(Decimal::new(cents, 2)),
        }
    }

    #[tokio::test]
    async fn test_remote_catalog_derives_categories() {
        let api = ScriptedApi::new().products(vec![
            remote(9, "Kale", 250),
            remote(10, "Bagels", 600),
            remote(11, "Butter", 475),
        ]);

        let catalog = load_catalog(&api, Some(50)).await;

        assert_eq!(catalog.source, CatalogSource::Remote);
        let categories: Vec<Option<Category>> =
            catalog.products.iter().map(|p| p.category).collect();
        assert_eq!(
            categories,
            [Some(Category::Produce), Some(Category::Bakery), Some(Category::Dairy)]
        );
        assert_eq!(api.calls(), vec![Call::ListProducts(Some(50))]);
    }

    #[tokio::test]
    async fn test_failed_load_uses_fallback() {
        let api = ScriptedApi::new().products_undecodable();

        let catalog = load_catalog(&api, None).await;

        assert_eq!(catalog, LoadedCatalog::fallback());
        let ids: Vec<ProductId> = catalog.products.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=6).map(ProductId::new).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_listing_uses_fallback() {
        let api = ScriptedApi::new().products(vec![]);
        let catalog = load_catalog(&api, None).await;
        assert_eq!(catalog.source, CatalogSource::Fallback);
        assert_eq!(catalog.products.len(), 6);
    }
}
