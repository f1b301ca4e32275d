//! Wire types for the storefront REST backend.
//!
//! Field names follow the backend's camelCase JSON. Optional fields the
//! backend may omit are `Option` or `#[serde(default)]` so older servers
//! keep deserializing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopline_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId};

use crate::cart::CartState;

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope shared by every endpoint: `{success, data?, message?}`.
///
/// List endpoints additionally carry `categories` and `total`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the backend considers the request successful.
    pub success: bool,
    /// Payload (absent on failures and on some mutations).
    pub data: Option<T>,
    /// Human-readable message, mostly on failures.
    pub message: Option<String>,
    /// Category names (product list endpoints only).
    pub categories: Option<Vec<String>>,
    /// Number of records in `data` (list endpoints only).
    pub total: Option<usize>,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the product is listed for sale.
    pub is_active: bool,
    /// Units currently available.
    pub stock_quantity: u32,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Product {
    /// Whether `quantity` units can be supplied from current stock.
    #[must_use]
    pub const fn can_supply(&self, quantity: u32) -> bool {
        quantity <= self.stock_quantity
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A page of products plus the category list, as returned by `GET products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
    pub total: usize,
}

/// Filters for `GET products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    /// Case-insensitive name search.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
}

impl ProductQuery {
    /// Query matching every active product.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Query by search keyword.
    #[must_use]
    pub fn search(keyword: impl Into<String>) -> Self {
        Self {
            search: Some(keyword.into()),
            category: None,
        }
    }

    /// Restrict to a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: String,
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.order_items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    /// Price per unit at the time the order was placed.
    #[serde(default)]
    pub unit_price: Price,
    #[serde(default)]
    pub subtotal: Price,
}

impl OrderItem {
    /// Name of the ordered product, if the backend included it.
    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }
}

/// Body of `POST orders`.
///
/// Empty optional fields are sent as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: String,
    pub notes: Option<String>,
    /// Product id to quantity.
    pub cart_items: CartState,
}

/// Contact details used to look up a customer's orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerOrderQuery {
    pub email: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Admin Types
// =============================================================================

/// Product fields accepted by the admin create/update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub description: Option<String>,
    pub is_active: bool,
    pub stock_quantity: u32,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            description: product.description.clone(),
            is_active: product.is_active,
            stock_quantity: product.stock_quantity,
        }
    }
}

/// Filters for `GET admin/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    /// `None` lists both listed and delisted products.
    pub is_active: Option<bool>,
}

/// Filters for `GET admin/orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminOrderQuery {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Admin dashboard statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub active_products: u64,
    pub inactive_products: u64,
    /// Products at or below the backend's low-stock threshold.
    pub low_stock_products: Vec<Product>,
    pub today_orders_count: u64,
    pub today_sales: Price,
    pub this_month_sales: Price,
    pub recent_orders: Vec<Order>,
    /// Pairs of status and order count.
    pub status_stats: Vec<(OrderStatus, u64)>,
}
