//! FreshCart Core - Shared types library.
//!
//! This crate provides the data model used by every FreshCart component:
//! - `storefront` - Cart synchronizer, catalog loader, and rendering
//! - `cli` - Terminal front-end that drives the storefront controller
//!
//! # Architecture
//!
//! The core crate contains only types and pure transitions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows the
//! cart rules to be tested without any host.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, categories, products, carts, and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
