//! `session` command.

use freshcart_storefront::StorefrontConfig;
use freshcart_storefront::session::SessionId;
use freshcart_storefront::storage::FileStore;

use super::{CommandResult, emit};

/// Print the session identifier, creating one if this is the first run.
///
/// # Errors
///
/// Returns an error if local storage cannot be read or written.
pub fn show(config: &StorefrontConfig) -> CommandResult {
    let store = FileStore::open(config.storage_dir.clone())?;
    let session = SessionId::load_or_create(&store)?;
    emit(session.as_str())?;
    Ok(true)
}
