//! Core types for FreshCart.
//!
//! This module provides type-safe wrappers and plain data for the storefront
//! domain: product IDs, prices, categories, products, carts, and orders.

pub mod cart;
pub mod category;
pub mod id;
pub mod order;
pub mod price;
pub mod product;

pub use cart::{Cart, CartLine};
pub use category::{Category, CategoryFilter};
pub use id::*;
pub use order::Order;
pub use price::Price;
pub use product::{Product, SERVER_PRODUCT_DESCRIPTION, fallback_catalog, filter_products};
