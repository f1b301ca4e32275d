//! Shopper-facing backend client.
//!
//! Caches product listings and categories using `moka` (short TTL, see
//! [`ApiConfig`](crate::config::ApiConfig)). Single products and orders are
//! never cached.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shopline_core::{OrderId, ProductId};
use tracing::{debug, instrument};
use url::Url;

use crate::api::cache::{CacheKey, CacheValue};
use crate::api::types::{
    CreateOrderRequest, CustomerOrderQuery, Envelope, Order, Product, ProductList, ProductQuery,
};
use crate::api::{ApiError, CatalogLookup, OrderPlacement};
use crate::config::ApiConfig;

/// Longest backend body excerpt carried into errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The API base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Drop every cached listing (after admin mutations).
    pub(crate) fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Send a request and unwrap the response envelope.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.header("Accept", "application/json").send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&response_text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| excerpt(&response_text));

            tracing::warn!(
                status = %status,
                message = %message,
                "Backend returned non-success status"
            );

            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(message));
            }
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %excerpt(&response_text),
                    "Failed to parse backend response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request failed".to_string());
            tracing::warn!(status = %status, message = %message, "Backend reported failure");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List active products, optionally filtered by keyword and category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductList, ApiError> {
        let cache_key = CacheKey::Products(query.clone());

        if let Some(CacheValue::Products(list)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product listing");
            return Ok(list);
        }

        let url = with_query(
            self.url("products")?,
            [
                ("search", query.search.as_deref()),
                ("category", query.category.as_deref()),
            ],
        );

        let envelope = self
            .execute::<Vec<Product>>(self.http().get(url))
            .await?;

        let products = envelope.data.ok_or(ApiError::MissingData)?;
        let list = ProductList {
            total: envelope.total.unwrap_or(products.len()),
            categories: envelope.categories.unwrap_or_default(),
            products,
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(list.clone()))
            .await;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(list.categories.clone()),
            )
            .await;

        Ok(list)
    }

    /// List category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let envelope = self
            .execute::<Vec<String>>(self.http().get(self.url("categories")?))
            .await?;
        let categories = envelope.data.ok_or(ApiError::MissingData)?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get a single product with live stock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist or is
    /// delisted, or another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let url = self.url(&format!("products/{id}"))?;
        let envelope = self.execute::<Product>(self.http().get(url)).await?;
        envelope.data.ok_or(ApiError::MissingData)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend refuses the order
    /// (e.g. stock ran out or a product was delisted meanwhile).
    #[instrument(skip(self, request), fields(lines = request.cart_items.len()))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        let url = self.url("orders")?;
        let envelope = self
            .execute::<Order>(self.http().post(url).json(request))
            .await?;
        let order = envelope.data.ok_or(ApiError::MissingData)?;
        tracing::info!(order_id = %order.id, "Order created");
        Ok(order)
    }

    /// Find orders placed with the given email and/or phone.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn customer_orders(&self, query: &CustomerOrderQuery) -> Result<Vec<Order>, ApiError> {
        let url = with_query(
            self.url("orders/customer")?,
            [
                ("email", query.email.as_deref()),
                ("phone", query.phone.as_deref()),
            ],
        );
        let envelope = self.execute::<Vec<Order>>(self.http().get(url)).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no such order exists.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let url = self.url(&format!("orders/{id}"))?;
        let envelope = self.execute::<Order>(self.http().get(url)).await?;
        envelope.data.ok_or(ApiError::MissingData)
    }
}

impl CatalogLookup for ApiClient {
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_product(id).await
    }
}

impl OrderPlacement for ApiClient {
    async fn place_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.create_order(request).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Append the present, non-blank query parameters to `url`.
pub(crate) fn with_query<'a>(
    mut url: Url,
    pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Url {
    let present: Vec<(&str, &str)> = pairs
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect();

    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }
    url
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
