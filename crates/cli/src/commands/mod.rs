//! Command implementations.
//!
//! Each command returns `Ok(false)` when the storefront reported a failure
//! (already shown as a notice) and `Err` only for local problems such as an
//! unwritable storage directory.

pub mod cart;
pub mod catalog;
pub mod session;

use std::io::Write;

use freshcart_storefront::Storefront;
use freshcart_storefront::api::HttpStoreClient;
use freshcart_storefront::session::SessionId;
use freshcart_storefront::storage::FileStore;
use freshcart_storefront::StorefrontConfig;

/// Whether the requested action succeeded.
pub type CommandResult = Result<bool, Box<dyn std::error::Error>>;

type Shop = Storefront<HttpStoreClient, FileStore>;

/// Build the storefront against the configured service and storage, then
/// sync the cart and load the catalog.
async fn open(config: &StorefrontConfig) -> Result<Shop, Box<dyn std::error::Error>> {
    let store = FileStore::open(config.storage_dir.clone())?;
    let session = SessionId::load_or_create(&store)?;
    let client = HttpStoreClient::new(&config.api, session);

    let mut shop = Storefront::new(client, store, config);
    tracing::debug!(lines = shop.cart().lines().len(), "Showing cached cart");
    shop.start().await;
    Ok(shop)
}

/// Write a line to stdout.
fn emit(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")
}

/// Write the visible notification, if any.
fn emit_notice(shop: &Shop) -> std::io::Result<()> {
    match shop.notification() {
        Some(message) => emit(&format!("notice: {message}")),
        None => Ok(()),
    }
}
