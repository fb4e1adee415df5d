//! `products` command.

use freshcart_core::CategoryFilter;
use freshcart_storefront::StorefrontConfig;
use freshcart_storefront::catalog::CatalogSource;

use super::{CommandResult, emit, emit_notice, open};

/// Print the product grid for `filter`.
///
/// # Errors
///
/// Returns an error if local storage cannot be opened or output fails.
pub async fn products(config: &StorefrontConfig, filter: CategoryFilter) -> CommandResult {
    let mut shop = open(config).await?;
    shop.set_filter(filter);

    if shop.state().catalog_source() == CatalogSource::Fallback {
        tracing::info!("Showing built-in catalog");
    }

    emit(&shop.render_products()?)?;
    emit_notice(&shop)?;
    Ok(true)
}
