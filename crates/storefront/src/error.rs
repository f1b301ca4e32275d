//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends built on this crate.
//! [`AppError::report`] captures faults on the backend or client side to
//! Sentry before they are shown to the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::LookupError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order lookup input was invalid.
    #[error("Order lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Bad input from the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Whether this error points at a fault outside the user's control.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => err.is_server_fault(),
            Self::Config(_)
            | Self::Cart(_)
            | Self::Checkout(_)
            | Self::Lookup(_)
            | Self::InvalidInput(_) => false,
        }
    }

    /// Log the error, capturing faults to Sentry first.
    pub fn report(&self) {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidInput("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be a number");

        let err = AppError::from(ApiError::NotFound("order 9".to_string()));
        assert_eq!(err.to_string(), "API error: Not found: order 9");
    }

    #[test]
    fn test_server_fault_classification() {
        assert!(
            AppError::Api(ApiError::Rejected {
                status: 502,
                message: "bad gateway".to_string()
            })
            .is_server_fault()
        );
        assert!(!AppError::Api(ApiError::NotFound(String::new())).is_server_fault());
        assert!(!AppError::Cart(CartError::InvalidQuantity(0)).is_server_fault());
        assert!(!AppError::Checkout(CheckoutError::EmptyCart).is_server_fault());
        assert!(
            AppError::Checkout(CheckoutError::Api(ApiError::MissingData)).is_server_fault()
        );
    }

    #[test]
    fn test_report_without_sentry_client() {
        AppError::InvalidInput("x".to_string()).report();
        AppError::Api(ApiError::MissingData).report();
    }

    #[test]
    fn test_breadcrumb_without_sentry_client() {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "1")]));
        add_breadcrumb("cart", "Cleared cart", None);
    }
}
