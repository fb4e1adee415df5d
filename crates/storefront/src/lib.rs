//! `FreshCart` storefront library.
//!
//! A grocery storefront whose cart lives on a remote service. The local copy
//! is a persisted cache that is only ever replaced by what the service
//! returns.
//!
//! # Architecture
//!
//! - [`api`] - `reqwest` client for the cart, checkout, and catalog endpoints
//! - [`sync`] - keeps the cart and its persisted snapshot in step with the service
//! - [`catalog`] - loads products, falling back to a built-in list
//! - [`app`] - the controller; turns every failure into a notification
//! - [`render`] - view models and Askama fragments

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;
pub mod sync;

#[cfg(test)]
mod testing;

pub use app::Storefront;
pub use config::StorefrontConfig;
pub use error::StorefrontError;
