//! Integration tests for `FreshCart`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p freshcart-integration-tests
//! ```
//!
//! No external services are needed: each test starts a [`FakeCartService`]
//! on an ephemeral port and points the real `reqwest` client at it.
//!
//! # Fake service rules
//!
//! - Carts are kept per `X-Session-Id`; a request without one is a 400
//! - Adding an existing product increments its quantity
//! - Updating to zero or less removes the line; updating a product that is
//!   not in the cart is a 404 with `detail: "Product not in cart"`
//! - Checkout falls back to the server cart when the body has no items,
//!   refuses an empty cart, and clears the session's cart on success
//! - `GET /products/` honours `limit` and counts how often it is called
//! - Every `GET` records the `Content-Type` it arrived with

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Header the service scopes carts by.
pub const SESSION_HEADER: &str = "x-session-id";

/// A cart line as the service stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub product_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
struct AddBody {
    product_id: i64,
    name: String,
    unit_price: f64,
    #[serde(default = "one")]
    quantity: i64,
}

const fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    product_id: i64,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct RemoveBody {
    product_id: i64,
}

#[derive(Debug, Deserialize)]
struct CheckoutBody {
    #[serde(default)]
    items: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct ProductsQuery {
    limit: Option<usize>,
}

/// What `GET /products/` answers with.
#[derive(Debug, Clone)]
pub enum Catalog {
    Products(Vec<Value>),
    Failing,
}

#[derive(Default)]
struct ServiceState {
    carts: Mutex<HashMap<String, Vec<Line>>>,
    catalog: Mutex<Option<Catalog>>,
    product_requests: AtomicUsize,
    cart_requests: AtomicUsize,
    get_content_types: Mutex<Vec<Option<String>>>,
}

impl ServiceState {
    fn with_cart<T>(&self, session: &str, f: impl FnOnce(&mut Vec<Line>) -> T) -> T {
        let mut carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        f(carts.entry(session.to_string()).or_default())
    }

    fn record_content_type(&self, headers: &HeaderMap) {
        let value = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.get_content_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
    }
}

/// In-process stand-in for the remote cart service.
pub struct FakeCartService {
    addr: SocketAddr,
    state: Arc<ServiceState>,
}

impl FakeCartService {
    /// Start a service listing [`sample_products`].
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::start_with_catalog(Catalog::Products(sample_products())).await
    }

    /// Start a service whose catalog answers with `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start_with_catalog(catalog: Catalog) -> Self {
        let state = Arc::new(ServiceState {
            catalog: Mutex::new(Some(catalog)),
            ..ServiceState::default()
        });

        let app = Router::new()
            .route("/cart", get(get_cart))
            .route("/cart/add", post(add_to_cart))
            .route("/cart/update", put(update_cart))
            .route("/cart/remove", post(remove_from_cart))
            .route("/checkout", post(checkout))
            .route("/products/", get(list_products))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// The lines the service holds for `session`.
    #[must_use]
    pub fn cart(&self, session: &str) -> Vec<Line> {
        self.state.with_cart(session, |cart| cart.clone())
    }

    /// Seed the service-side cart for `session`.
    pub fn set_cart(&self, session: &str, lines: Vec<Line>) {
        self.state.with_cart(session, |cart| *cart = lines);
    }

    /// Replace the catalog answer.
    pub fn set_catalog(&self, catalog: Catalog) {
        *self
            .state
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(catalog);
    }

    /// How many times `GET /products/` was hit.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// The `Content-Type` of every `GET` received, in arrival order.
    #[must_use]
    pub fn get_content_types(&self) -> Vec<Option<String>> {
        self.state
            .get_content_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many cart and checkout requests were received.
    #[must_use]
    pub fn cart_requests(&self) -> usize {
        self.state.cart_requests.load(Ordering::SeqCst)
    }
}

/// Three products with ids 1..=3, one of them in the legacy price field.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Kale", "price_customer": 2.5}),
        json!({"id": 2, "name": "Rye Loaf", "customer_price": 5.25}),
        json!({"id": 3, "name": "Butter", "price_customer": null}),
    ]
}

/// A base URL where nothing is listening.
///
/// # Panics
///
/// Panics if no local port can be bound.
#[allow(clippy::expect_used)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}/")
}

// =============================================================================
// Handlers
// =============================================================================

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn session(headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| detail(StatusCode::BAD_REQUEST, "Missing X-Session-Id header"))
}

fn total(lines: &[Line]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let sum: f64 = lines
        .iter()
        .map(|line| line.unit_price * line.quantity as f64)
        .sum();
    (sum * 100.0).round() / 100.0
}

fn cart_response(lines: &[Line]) -> Response {
    Json(json!({ "items": lines, "total": total(lines) })).into_response()
}

async fn get_cart(State(state): State<Arc<ServiceState>>, headers: HeaderMap) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    state.record_content_type(&headers);
    match session(&headers) {
        Ok(session) => state.with_cart(&session, |cart| cart_response(cart)),
        Err(response) => response,
    }
}

async fn add_to_cart(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    let session = match session(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };
    if body.quantity < 1 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{
                "loc": ["body", "quantity"],
                "msg": "Input should be greater than or equal to 1",
            }]})),
        )
            .into_response();
    }

    state.with_cart(&session, |cart| {
        match cart.iter_mut().find(|line| line.product_id == body.product_id) {
            Some(line) => line.quantity += body.quantity,
            None => cart.push(Line {
                product_id: body.product_id,
                name: body.name,
                unit_price: body.unit_price,
                quantity: body.quantity,
            }),
        }
        cart_response(cart)
    })
}

async fn update_cart(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    let session = match session(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };

    state.with_cart(&session, |cart| {
        let Some(index) = cart.iter().position(|line| line.product_id == body.product_id) else {
            return detail(StatusCode::NOT_FOUND, "Product not in cart");
        };
        if body.quantity <= 0 {
            cart.remove(index);
        } else if let Some(line) = cart.get_mut(index) {
            line.quantity = body.quantity;
        }
        cart_response(cart)
    })
}

async fn remove_from_cart(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<RemoveBody>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    let session = match session(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };

    state.with_cart(&session, |cart| {
        cart.retain(|line| line.product_id != body.product_id);
        cart_response(cart)
    })
}

async fn checkout(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Response {
    state.cart_requests.fetch_add(1, Ordering::SeqCst);
    let session = match session(&headers) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let items = if body.items.is_empty() {
        state.with_cart(&session, |cart| cart.clone())
    } else {
        body.items
    };
    if items.is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let order_id: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(10)
        .collect::<String>()
        .to_uppercase();
    state.with_cart(&session, Vec::clear);

    Json(json!({
        "status": "OK",
        "order_id": format!("ORD-{order_id}"),
        "message": "Order Received — Thank you!",
        "total": total(&items),
        "items": items,
    }))
    .into_response()
}

async fn list_products(
    State(state): State<Arc<ServiceState>>,
    headers: HeaderMap,
    Query(query): Query<ProductsQuery>,
) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    state.record_content_type(&headers);
    let catalog = state
        .catalog
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match catalog {
        Some(Catalog::Products(products)) => {
            let limit = query.limit.unwrap_or(products.len());
            Json(products.into_iter().take(limit).collect::<Vec<_>>()).into_response()
        }
        Some(Catalog::Failing) | None => {
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Catalog unavailable")
        }
    }
}
