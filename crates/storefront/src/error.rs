//! Unified error handling with Sentry integration.
//!
//! Every storefront operation returns `Result<T, StorefrontError>`. The
//! controller turns errors into a single-line notification via
//! [`StorefrontError::user_message`]; unexpected ones are also captured to
//! Sentry.

use freshcart_core::ProductId;
use thiserror::Error;

use crate::storage::StorageError;

/// Shown when no more specific message is available.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The request never completed (connection refused, reset, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a success status but an unreadable body.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service reported a failure.
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Api {
        status: u16,
        /// `detail` from the failure body, when present.
        detail: Option<String>,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The product is not in the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl StorefrontError {
    /// The single-line message shown to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::EmptyCart => "Cart is empty".to_string(),
            Self::ProductNotFound(_) => "Product is no longer available".to_string(),
            Self::Storage(_) => "Could not save your cart".to_string(),
            Self::Http(_) | Self::Decode(_) | Self::Api { detail: None, .. } | Self::Url(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Whether this error points at a bug or broken environment rather than
    /// an expected refusal, and so is worth reporting.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Storage(_) | Self::Url(_))
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Log an error at the UI boundary, capturing unexpected ones to Sentry.
pub fn report(error: &StorefrontError) {
    if error.is_unexpected() {
        let event_id = sentry::capture_error(error);
        tracing::error!(
            error = %error,
            sentry_event_id = %event_id,
            "Storefront operation failed"
        );
    } else {
        tracing::warn!(error = %error, "Storefront operation failed");
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
