//! Cart commands: show, mutate, and check out.

use freshcart_core::ProductId;
use freshcart_storefront::StorefrontConfig;

use super::{CommandResult, emit, emit_notice, open};

/// A single cart mutation.
#[derive(Debug, Clone, Copy)]
pub enum CartAction {
    Add(ProductId),
    Increment(ProductId),
    Decrement(ProductId),
    Update(ProductId, i64),
    Remove(ProductId),
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if local storage cannot be opened or output fails.
pub async fn show(config: &StorefrontConfig) -> CommandResult {
    let shop = open(config).await?;
    emit(&shop.render_cart()?)?;
    emit_notice(&shop)?;
    Ok(true)
}

/// Apply `action`, then print the cart.
///
/// # Errors
///
/// Returns an error if local storage cannot be opened or output fails.
pub async fn apply(config: &StorefrontConfig, action: CartAction) -> CommandResult {
    let mut shop = open(config).await?;

    let ok = match action {
        CartAction::Add(id) => shop.add_to_cart(id).await,
        CartAction::Increment(id) => shop.increment(id).await,
        CartAction::Decrement(id) => shop.decrement(id).await,
        CartAction::Update(id, quantity) => shop.update_quantity(id, quantity).await,
        CartAction::Remove(id) => shop.remove(id).await,
    };

    emit(&shop.render_cart()?)?;
    emit_notice(&shop)?;
    Ok(ok)
}

/// Place an order and print the confirmation, or the cart if it failed.
///
/// # Errors
///
/// Returns an error if local storage cannot be opened or output fails.
pub async fn checkout(config: &StorefrontConfig) -> CommandResult {
    let mut shop = open(config).await?;
    let ok = shop.checkout().await.is_some();

    match shop.render_order()? {
        Some(confirmation) if ok => emit(&confirmation)?,
        _ => emit(&shop.render_cart()?)?,
    }
    emit_notice(&shop)?;
    Ok(ok)
}
