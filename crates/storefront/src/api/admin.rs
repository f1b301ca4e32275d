//! Admin backend client.
//!
//! Covers the `admin/...` surface: dashboard statistics, product CRUD,
//! stock updates and order status transitions. Every product mutation drops
//! the shared catalog cache so shoppers see the change immediately.

use serde_json::json;
use shopline_core::{OrderId, OrderStatus, ProductId};
use tracing::instrument;

use crate::api::client::{ApiClient, with_query};
use crate::api::types::{
    AdminOrderQuery, AdminProductQuery, DashboardStats, Order, Product, ProductInput, ProductList,
};
use crate::api::ApiError;

/// Client for the admin endpoints.
///
/// Shares the transport (and catalog cache) of the [`ApiClient`] it was
/// built from.
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    /// Create an admin client on top of an existing backend client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Dashboard statistics: product counts, low stock, sales, recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats, ApiError> {
        let url = self.api.url("admin/dashboard")?;
        let envelope = self
            .api
            .execute::<DashboardStats>(self.api.http().get(url))
            .await?;
        envelope.data.ok_or(ApiError::MissingData)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products including delisted ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &AdminProductQuery) -> Result<ProductList, ApiError> {
        let is_active = query.is_active.map(|active| active.to_string());
        let url = with_query(
            self.api.url("admin/products")?,
            [
                ("category", query.category.as_deref()),
                ("search", query.search.as_deref()),
                ("isActive", is_active.as_deref()),
            ],
        );

        let envelope = self
            .api
            .execute::<Vec<Product>>(self.api.http().get(url))
            .await?;
        let products = envelope.data.ok_or(ApiError::MissingData)?;

        Ok(ProductList {
            total: envelope.total.unwrap_or(products.len()),
            categories: envelope.categories.unwrap_or_default(),
            products,
        })
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend refuses the input.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let url = self.api.url("admin/products")?;
        let envelope = self
            .api
            .execute::<Product>(self.api.http().post(url).json(input))
            .await?;
        self.api.invalidate_catalog();
        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let url = self.api.url(&format!("admin/products/{id}"))?;
        let envelope = self
            .api
            .execute::<Product>(self.api.http().put(url).json(input))
            .await?;
        self.api.invalidate_catalog();
        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let url = self.api.url(&format!("admin/products/{id}"))?;
        self.api
            .execute::<serde_json::Value>(self.api.http().delete(url))
            .await?;
        self.api.invalidate_catalog();
        Ok(())
    }

    /// Flip a product between listed and delisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle_product_status(&self, id: ProductId) -> Result<Product, ApiError> {
        let url = self
            .api
            .url(&format!("admin/products/{id}/toggle-status"))?;
        let envelope = self
            .api
            .execute::<Product>(self.api.http().patch(url))
            .await?;
        self.api.invalidate_catalog();
        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Set a product's stock level.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_stock(&self, id: ProductId, stock: u32) -> Result<Product, ApiError> {
        let url = self.api.url(&format!("admin/products/{id}/stock"))?;
        let envelope = self
            .api
            .execute::<Product>(self.api.http().patch(url).json(&json!({ "stock": stock })))
            .await?;
        self.api.invalidate_catalog();
        envelope.data.ok_or(ApiError::MissingData)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List orders matching the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &AdminOrderQuery) -> Result<Vec<Order>, ApiError> {
        let url = with_query(
            self.api.url("admin/orders")?,
            [
                ("customerName", query.customer_name.as_deref()),
                ("customerEmail", query.customer_email.as_deref()),
                ("customerPhone", query.customer_phone.as_deref()),
                ("status", query.status.map(OrderStatus::code)),
            ],
        );
        let envelope = self
            .api
            .execute::<Vec<Order>>(self.api.http().get(url))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the transition is refused.
    #[instrument(skip(self), fields(order_id = %id, status = %status.code()))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let url = self.api.url(&format!("admin/orders/{id}/status"))?;
        let envelope = self
            .api
            .execute::<Order>(
                self.api
                    .http()
                    .patch(url)
                    .json(&json!({ "status": status.code() })),
            )
            .await?;
        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Cancel an order; the backend restores its stock.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the order can no longer be cancelled.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let url = self.api.url(&format!("admin/orders/{id}/cancel"))?;
        let envelope = self
            .api
            .execute::<Order>(self.api.http().patch(url))
            .await?;
        // Cancelling returns units to stock.
        self.api.invalidate_catalog();
        envelope.data.ok_or(ApiError::MissingData)
    }
}
