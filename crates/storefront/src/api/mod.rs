//! Storefront REST backend clients.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every response uses the
//!   `{success, data, message}` envelope
//! - The backend is the source of truth for products, stock and orders
//! - Product listings and categories are cached via `moka` (short TTL);
//!   single-product lookups always hit the backend so stock checks are live
//!
//! # Clients
//!
//! - [`ApiClient`] - shopper-facing catalog and order endpoints
//! - [`AdminClient`] - dashboard, product CRUD and order status transitions
//!
//! # Example
//!
//! ```rust,ignore
//! use shopline_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let listing = client.list_products(&ProductQuery::search("mug")).await?;
//! let product = client.get_product(listing.products[0].id).await?;
//! ```

mod admin;
mod cache;
mod client;
pub mod types;

use std::future::Future;

pub use admin::AdminClient;
pub use client::ApiClient;
pub use types::*;

use shopline_core::ProductId;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found (or no longer listed).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status or `success: false`.
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Successful envelope without a payload where one was required.
    #[error("Response has no data")]
    MissingData,
}

impl ApiError {
    /// Whether the failure came from the network or the backend itself
    /// rather than from the request's content.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::MissingData => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Url(_) | Self::NotFound(_) | Self::RateLimited(_) => false,
        }
    }
}

/// Product lookup by id, the capability reconciliation needs.
pub trait CatalogLookup: Send + Sync {
    /// Fetch the live product record.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;
}

/// Order submission, the capability checkout needs.
pub trait OrderPlacement: Send + Sync {
    /// Submit an order for the given cart items.
    fn place_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}
