//! Scripted [`StoreApi`] fake for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use freshcart_core::{CartLine, Order, ProductId};
use rust_decimal::Decimal;

use crate::api::{
    AddLineRequest, CheckoutRequest, RemoteProduct, RemoveLineRequest, StoreApi,
    UpdateQuantityRequest,
};
use crate::error::StorefrontError;

/// A call the fake received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchCart,
    Add(AddLineRequest),
    Update(UpdateQuantityRequest),
    Remove(RemoveLineRequest),
    Checkout(CheckoutRequest),
    ListProducts(Option<u32>),
}

enum Reply {
    Cart(Result<Vec<CartLine>, StorefrontError>),
    Order(Result<Order, StorefrontError>),
    Products(Result<Vec<RemoteProduct>, StorefrontError>),
}

/// Answers calls from a queue of scripted replies and records every call.
#[derive(Default)]
pub struct ScriptedApi {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

#[allow(clippy::unwrap_used)]
impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn cart(self, lines: Vec<CartLine>) -> Self {
        self.push(Reply::Cart(Ok(lines)))
    }

    pub fn cart_error(self, status: u16, detail: Option<&str>) -> Self {
        self.push(Reply::Cart(Err(api_error(status, detail))))
    }

    pub fn order(self, order: Order) -> Self {
        self.push(Reply::Order(Ok(order)))
    }

    pub fn order_error(self, status: u16, detail: Option<&str>) -> Self {
        self.push(Reply::Order(Err(api_error(status, detail))))
    }

    pub fn products(self, products: Vec<RemoteProduct>) -> Self {
        self.push(Reply::Products(Ok(products)))
    }

    pub fn products_undecodable(self) -> Self {
        let err = serde_json::from_str::<Vec<RemoteProduct>>(r#"{"detail":"oops"}"#)
            .map(|_| ())
            .unwrap_err();
        self.push(Reply::Products(Err(StorefrontError::Decode(err))))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Option<Reply> {
        self.calls.lock().unwrap().push(call);
        self.replies.lock().unwrap().pop_front()
    }
}

fn api_error(status: u16, detail: Option<&str>) -> StorefrontError {
    StorefrontError::Api {
        status,
        detail: detail.map(str::to_string),
    }
}

fn unscripted() -> StorefrontError {
    api_error(500, Some("unscripted call"))
}

fn cart_reply(reply: Option<Reply>) -> Result<Vec<CartLine>, StorefrontError> {
    match reply {
        Some(Reply::Cart(result)) => result,
        _ => Err(unscripted()),
    }
}

impl StoreApi for ScriptedApi {
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, StorefrontError> {
        cart_reply(self.record(Call::FetchCart))
    }

    async fn add_line(&self, request: AddLineRequest) -> Result<Vec<CartLine>, StorefrontError> {
        cart_reply(self.record(Call::Add(request)))
    }

    async fn update_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> Result<Vec<CartLine>, StorefrontError> {
        cart_reply(self.record(Call::Update(request)))
    }

    async fn remove_line(
        &self,
        request: RemoveLineRequest,
    ) -> Result<Vec<CartLine>, StorefrontError> {
        cart_reply(self.record(Call::Remove(request)))
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<Order, StorefrontError> {
        match self.record(Call::Checkout(request)) {
            Some(Reply::Order(result)) => result,
            _ => Err(unscripted()),
        }
    }

    async fn list_products(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<RemoteProduct>, StorefrontError> {
        match self.record(Call::ListProducts(limit)) {
            Some(Reply::Products(result)) => result,
            _ => Err(unscripted()),
        }
    }
}

/// Build a cart line with a price given in cents.
pub fn line(id: i64, name: &str, cents: i64, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(id),
        name: name.to_string(),
        unit_price: Decimal::new(cents, 2),
        quantity,
    }
}

/// Build an order echoing `items`, with the server total computed from them.
pub fn order(order_id: &str, items: Vec<CartLine>) -> Order {
    Order {
        order_id: order_id.to_string(),
        status: "OK".to_string(),
        total: items.iter().map(CartLine::line_total).sum(),
        items,
        message: "Thanks for shopping with us".to_string(),
    }
}
