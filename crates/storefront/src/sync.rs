//! Cart synchronizer: local snapshot plus remote source of truth.
//!
//! # Rules
//!
//! - The remote cart is authoritative. Local state only ever changes to the
//!   list the service returned; there are no optimistic edits.
//! - The in-memory cart and the persisted snapshot change together or not
//!   at all.
//! - A failed call leaves both untouched.
//! - Mutations take `&mut self`, so only one can be in flight and responses
//!   apply in the order they were issued.

use freshcart_core::{Cart, CartLine, Order, ProductId};
use tracing::{info, instrument, warn};

use crate::api::{
    AddLineRequest, CheckoutRequest, RemoveLineRequest, StoreApi, UpdateQuantityRequest,
};
use crate::error::{Result, StorefrontError};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized cart snapshot.
pub const CART_KEY: &str = "freshcart_cart";

/// Owns the cart and keeps it in step with the remote service and the store.
pub struct CartSynchronizer<A, S> {
    api: A,
    store: S,
    cart: Cart,
}

impl<A: StoreApi, S: KeyValueStore> CartSynchronizer<A, S> {
    /// Start from whatever snapshot the store holds.
    ///
    /// A missing, unreadable, or corrupt snapshot starts an empty cart.
    pub fn restore(api: A, store: S) -> Self {
        let raw = store.get(CART_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read cart snapshot, starting empty");
            None
        });
        let cart = Cart::from_snapshot(raw.as_deref());
        info!(lines = cart.lines().len(), "Restored cart snapshot");

        Self { api, store, cart }
    }

    /// The cart as last confirmed by the service (or restored from storage).
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Replace the cached cart with the service's copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch or the snapshot write fails; the cached
    /// cart is kept in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<&Cart> {
        let lines = self.api.fetch_cart().await?;
        self.apply(lines)
    }

    /// Ask the service to add a line, then adopt its cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses or cannot be reached.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn add_line(&mut self, request: AddLineRequest) -> Result<&Cart> {
        let lines = self.api.add_line(request).await?;
        self.apply(lines)
    }

    /// Ask the service to set a line's quantity, then adopt its cart.
    ///
    /// Zero and negative quantities are sent as-is; whether the line goes
    /// away is decided by the list that comes back.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses or cannot be reached.
    #[instrument(skip(self))]
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<&Cart> {
        let lines = self
            .api
            .update_quantity(UpdateQuantityRequest {
                product_id,
                quantity,
            })
            .await?;
        self.apply(lines)
    }

    /// Ask the service to drop a line, then adopt its cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses or cannot be reached.
    #[instrument(skip(self))]
    pub async fn remove_line(&mut self, product_id: ProductId) -> Result<&Cart> {
        let lines = self
            .api
            .remove_line(RemoveLineRequest { product_id })
            .await?;
        self.apply(lines)
    }

    /// Submit the local cart as an order.
    ///
    /// The check for an empty cart uses the local copy and happens before any
    /// request. On success the cart is cleared locally and in storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::EmptyCart`] without contacting the service
    /// when there is nothing to buy, or the service's error when checkout
    /// fails. The cart is untouched on error.
    #[instrument(skip(self), fields(lines = self.cart.lines().len()))]
    pub async fn checkout(&mut self) -> Result<Order> {
        if self.cart.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }

        let order = self
            .api
            .checkout(CheckoutRequest {
                items: self.cart.lines().to_vec(),
            })
            .await?;

        // The order exists remotely now; a failed local clear must not hide it
        if let Err(e) = self.apply(Vec::new()) {
            crate::error::report(&e);
        }

        Ok(order)
    }

    /// Adopt a server line list: persist first, then swap in memory.
    fn apply(&mut self, lines: Vec<CartLine>) -> Result<&Cart> {
        let cart = Cart::from_server_lines(lines);
        let snapshot = cart.to_snapshot()?;
        self.store.set(CART_KEY, &snapshot)?;
        self.cart = cart;
        Ok(&self.cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::testing::{Call, ScriptedApi, line, order};

    fn snapshot(store: &MemoryStore) -> Cart {
        Cart::from_snapshot(store.get(CART_KEY).unwrap().as_deref())
    }

    fn sync_with(
        api: ScriptedApi,
        initial: &[CartLine],
    ) -> (CartSynchronizer<ScriptedApi, Arc<MemoryStore>>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        if !initial.is_empty() {
            store
                .set(CART_KEY, &serde_json::to_string(initial).unwrap())
                .unwrap();
        }
        let sync = CartSynchronizer::restore(api, Arc::clone(&store));
        (sync, store)
    }

    /// A store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_restore_reads_snapshot() {
        let lines = [line(1, "Bananas", 199, 2)];
        let (sync, _) = sync_with(ScriptedApi::new(), &lines);
        assert_eq!(sync.cart().lines(), lines.as_slice());
    }

    #[test]
    fn test_restore_corrupt_snapshot_is_empty() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "{{{").unwrap();
        let sync = CartSynchronizer::restore(ScriptedApi::new(), store);
        assert!(sync.cart().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_overwrites_local_and_snapshot() {
        let server = vec![line(4, "Croissants", 550, 1)];
        let api = ScriptedApi::new().cart(server.clone());
        let (mut sync, store) = sync_with(api, &[line(1, "Bananas", 199, 2)]);

        sync.refresh().await.unwrap();

        assert_eq!(sync.cart().lines(), server.as_slice());
        assert_eq!(&snapshot(&store), sync.cart());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_cart() {
        let cached = [line(1, "Bananas", 199, 2)];
        let api = ScriptedApi::new().cart_error(503, None);
        let (mut sync, store) = sync_with(api, &cached);

        let err = sync.refresh().await.unwrap_err();

        assert_eq!(err.user_message(), "Request failed");
        assert_eq!(sync.cart().lines(), cached.as_slice());
        assert_eq!(snapshot(&store).lines(), cached.as_slice());
    }

    #[tokio::test]
    async fn test_add_adopts_server_list_without_local_merge() {
        // Server applies a stock limit the client cannot know about: quantity stays 1
        let api = ScriptedApi::new().cart(vec![line(2, "Avocados", 349, 1)]);
        let (mut sync, store) = sync_with(api, &[line(2, "Avocados", 349, 1)]);

        let request = AddLineRequest {
            product_id: ProductId::new(2),
            name: "Avocados".to_string(),
            unit_price: Decimal::new(349, 2),
            quantity: 1,
        };
        sync.add_line(request.clone()).await.unwrap();

        assert_eq!(sync.cart().line(ProductId::new(2)).map(|l| l.quantity), Some(1));
        assert_eq!(&snapshot(&store), sync.cart());
        assert_eq!(sync.api().calls(), vec![Call::Add(request)]);
    }

    #[tokio::test]
    async fn test_add_failure_leaves_state_unchanged() {
        let cached = [line(1, "Bananas", 199, 1)];
        let api = ScriptedApi::new().cart_error(409, Some("Out of stock"));
        let (mut sync, store) = sync_with(api, &cached);

        let request = AddLineRequest {
            product_id: ProductId::new(3),
            name: "Sourdough Bread".to_string(),
            unit_price: Decimal::new(420, 2),
            quantity: 1,
        };
        let err = sync.add_line(request).await.unwrap_err();

        assert_eq!(err.user_message(), "Out of stock");
        assert_eq!(sync.cart().lines(), cached.as_slice());
        assert_eq!(snapshot(&store).lines(), cached.as_slice());
    }

    #[tokio::test]
    async fn test_update_sends_negative_quantity_and_trusts_server() {
        // Server ignores the removal; the client must not drop the line itself
        let echoed = vec![line(1, "Bananas", 199, 1)];
        let api = ScriptedApi::new().cart(echoed.clone());
        let (mut sync, _) = sync_with(api, &[line(1, "Bananas", 199, 1)]);

        sync.update_quantity(ProductId::new(1), -1).await.unwrap();

        assert_eq!(sync.cart().lines(), echoed.as_slice());
        assert_eq!(
            sync.api().calls(),
            vec![Call::Update(UpdateQuantityRequest {
                product_id: ProductId::new(1),
                quantity: -1,
            })]
        );
    }

    #[tokio::test]
    async fn test_remove_adopts_server_list() {
        let api = ScriptedApi::new().cart(vec![]);
        let (mut sync, store) = sync_with(api, &[line(1, "Bananas", 199, 1)]);

        sync.remove_line(ProductId::new(1)).await.unwrap();

        assert!(sync.cart().is_empty());
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_sequence_of_mutations_shows_last_server_list() {
        let last = vec![line(5, "Whole Milk", 315, 2), line(1, "Bananas", 199, 1)];
        let api = ScriptedApi::new()
            .cart(vec![line(1, "Bananas", 199, 1)])
            .cart(vec![line(1, "Bananas", 199, 1), line(5, "Whole Milk", 315, 1)])
            .cart(last.clone());
        let (mut sync, store) = sync_with(api, &[]);

        sync.refresh().await.unwrap();
        sync.update_quantity(ProductId::new(5), 1).await.unwrap();
        sync.update_quantity(ProductId::new(5), 2).await.unwrap();

        assert_eq!(sync.cart().lines(), last.as_slice());
        assert_eq!(&snapshot(&store), sync.cart());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_makes_no_request() {
        let (mut sync, _) = sync_with(ScriptedApi::new(), &[]);

        let err = sync.checkout().await.unwrap_err();

        assert!(matches!(err, StorefrontError::EmptyCart));
        assert!(sync.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart_and_snapshot() {
        let lines = vec![line(1, "Bananas", 199, 2), line(6, "Greek Yogurt", 445, 1)];
        let api = ScriptedApi::new().order(order("ORD-ABC", lines.clone()));
        let (mut sync, store) = sync_with(api, &lines);

        let placed = sync.checkout().await.unwrap();

        assert_eq!(placed.order_id, "ORD-ABC");
        assert!(sync.cart().is_empty());
        assert!(snapshot(&store).is_empty());
        assert_eq!(
            sync.api().calls(),
            vec![Call::Checkout(CheckoutRequest { items: lines })]
        );
    }

    #[tokio::test]
    async fn test_checkout_failure_keeps_items() {
        let lines = [line(3, "Sourdough Bread", 420, 1)];
        let api = ScriptedApi::new().order_error(400, Some("Cart is empty"));
        let (mut sync, store) = sync_with(api, &lines);

        assert!(sync.checkout().await.is_err());
        assert_eq!(sync.cart().lines(), lines.as_slice());
        assert_eq!(snapshot(&store).lines(), lines.as_slice());
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_memory_and_storage_together() {
        let api = ScriptedApi::new().cart(vec![line(1, "Bananas", 199, 1)]);
        let mut sync = CartSynchronizer::restore(api, ReadOnlyStore);

        let err = sync.refresh().await.unwrap_err();

        assert!(matches!(err, StorefrontError::Storage(_)));
        assert!(sync.cart().is_empty());
    }
}
