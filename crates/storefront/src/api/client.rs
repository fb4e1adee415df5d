//! `reqwest` implementation of [`StoreApi`].
//!
//! Caches catalog listings using `moka` (TTL from configuration). Cart and
//! checkout calls are never cached.

use std::sync::Arc;

use freshcart_core::{CartLine, Order};
use moka::future::Cache;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{
    AddLineRequest, CartResponse, CheckoutRequest, RemoteProduct, RemoveLineRequest,
    SESSION_HEADER, StoreApi, UpdateQuantityRequest, error_detail,
};
use crate::config::ApiConfig;
use crate::error::StorefrontError;
use crate::session::SessionId;

/// Client for the remote store API.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct HttpStoreClient {
    inner: Arc<HttpStoreClientInner>,
}

struct HttpStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    session_id: SessionId,
    catalog_cache: Cache<Option<u32>, Vec<RemoteProduct>>,
}

impl HttpStoreClient {
    /// Create a client scoped to `session_id`.
    #[must_use]
    pub fn new(config: &ApiConfig, session_id: SessionId) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(HttpStoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                session_id,
                catalog_cache,
            }),
        }
    }

    /// The session this client sends with every request.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    /// Start a request with the session and content-type headers set.
    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header(SESSION_HEADER, self.inner.session_id.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorefrontError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success responses become [`StorefrontError::Api`] carrying the
    /// server's `detail` when one is present.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StorefrontError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let detail = error_detail(&response_text);
            tracing::warn!(
                status = %status,
                detail = ?detail,
                body = %response_text.chars().take(200).collect::<String>(),
                "Store API returned non-success status"
            );
            return Err(StorefrontError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse store API response"
            );
            StorefrontError::Decode(e)
        })
    }

    async fn send_cart(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<CartLine>, StorefrontError> {
        let response: CartResponse = self.send(request).await?;
        debug!(lines = response.items.len(), "Received authoritative cart");
        Ok(response.items)
    }
}

impl StoreApi for HttpStoreClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, StorefrontError> {
        let url = self.endpoint("cart")?;
        self.send_cart(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self), fields(product_id = %request.product_id))]
    async fn add_line(&self, request: AddLineRequest) -> Result<Vec<CartLine>, StorefrontError> {
        let url = self.endpoint("cart/add")?;
        self.send_cart(self.request(Method::POST, url).json(&request))
            .await
    }

    #[instrument(skip(self), fields(product_id = %request.product_id, quantity = request.quantity))]
    async fn update_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> Result<Vec<CartLine>, StorefrontError> {
        let url = self.endpoint("cart/update")?;
        self.send_cart(self.request(Method::PUT, url).json(&request))
            .await
    }

    #[instrument(skip(self), fields(product_id = %request.product_id))]
    async fn remove_line(
        &self,
        request: RemoveLineRequest,
    ) -> Result<Vec<CartLine>, StorefrontError> {
        let url = self.endpoint("cart/remove")?;
        self.send_cart(self.request(Method::POST, url).json(&request))
            .await
    }

    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    async fn checkout(&self, request: CheckoutRequest) -> Result<Order, StorefrontError> {
        let url = self.endpoint("checkout")?;
        let order: Order = self
            .send(self.request(Method::POST, url).json(&request))
            .await?;
        tracing::info!(order_id = %order.order_id, status = %order.status, "Order placed");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<RemoteProduct>, StorefrontError> {
        if let Some(products) = self.inner.catalog_cache.get(&limit).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let mut url = self.endpoint("products/")?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }

        let products: Vec<RemoteProduct> = self.send(self.request(Method::GET, url)).await?;

        // Only successful, non-empty listings are worth remembering
        if !products.is_empty() {
            self.inner
                .catalog_cache
                .insert(limit, products.clone())
                .await;
        }

        Ok(products)
    }
}
