//! Integration tests for Shopline.
//!
//! Tests drive the real storefront client against [`FakeBackend`], an
//! in-process axum server that speaks the backend's `{success, data,
//! message}` envelope and keeps products and orders in memory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_reconciliation` - cart vs checkout reconciliation over HTTP
//! - `checkout_flow` - order placement, last order, order lookup
//! - `admin_client` - admin mutations and catalog cache invalidation

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shopline_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId};
use shopline_storefront::api::{AdminClient, ApiClient, Order, OrderItem, Product};
use shopline_storefront::config::ApiConfig;
use url::Url;

// ============================================================================
// Fake Backend
// ============================================================================

#[derive(Default)]
struct Shop {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
    reject_next_order: Option<String>,
}

impl Shop {
    fn new_product_id(&mut self) -> ProductId {
        self.next_product_id += 1;
        ProductId::new(self.next_product_id)
    }

    fn active_categories(&self) -> Vec<String> {
        self.products
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Clone, Default)]
struct FakeState {
    shop: Arc<Mutex<Shop>>,
    product_list_requests: Arc<AtomicUsize>,
}

impl FakeState {
    fn shop(&self) -> MutexGuard<'_, Shop> {
        self.shop.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory storefront backend bound to an ephemeral local port.
pub struct FakeBackend {
    addr: SocketAddr,
    state: FakeState,
}

impl FakeBackend {
    /// Start serving on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = FakeState::default();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake backend stopped");
        });

        Self { addr, state }
    }

    /// Base URL of the fake API (`http://127.0.0.1:<port>/api/`).
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("Invalid fake backend URL")
    }

    /// A fresh shopper client pointed at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(self.api_url())).expect("Failed to build client")
    }

    /// An admin client sharing `client`'s transport and cache.
    #[must_use]
    pub fn admin(client: &ApiClient) -> AdminClient {
        AdminClient::new(client.clone())
    }

    /// Add a listed product.
    pub fn add_product(&self, name: &str, category: &str, price_cents: i64, stock: u32) -> ProductId {
        let mut shop = self.state.shop();
        let id = shop.new_product_id();
        shop.products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                category: category.to_string(),
                price: Price::from_cents(price_cents),
                description: None,
                is_active: true,
                stock_quantity: stock,
                created_at: None,
                updated_at: None,
            },
        );
        id
    }

    /// Current backend record for a product.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.state.shop().products.get(&id).cloned()
    }

    pub fn set_stock(&self, id: ProductId, stock: u32) {
        if let Some(product) = self.state.shop().products.get_mut(&id) {
            product.stock_quantity = stock;
        }
    }

    pub fn set_active(&self, id: ProductId, active: bool) {
        if let Some(product) = self.state.shop().products.get_mut(&id) {
            product.is_active = active;
        }
    }

    pub fn remove_product(&self, id: ProductId) {
        self.state.shop().products.remove(&id);
    }

    /// Every order placed so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.state.shop().orders.values().cloned().collect()
    }

    /// Make the next `POST orders` fail with a 400 and `message`.
    pub fn reject_next_order(&self, message: &str) {
        self.state.shop().reject_next_order = Some(message.to_string());
    }

    /// Number of `GET products` requests served.
    #[must_use]
    pub fn product_list_requests(&self) -> usize {
        self.state.product_list_requests.load(Ordering::SeqCst)
    }
}

fn router(state: FakeState) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/categories", get(categories))
        .route("/api/orders", post(create_order))
        .route("/api/orders/customer", get(customer_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/admin/dashboard", get(dashboard))
        .route(
            "/api/admin/products",
            get(admin_products).post(admin_create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(admin_update_product).delete(admin_delete_product),
        )
        .route("/api/admin/products/{id}/toggle-status", patch(admin_toggle))
        .route("/api/admin/products/{id}/stock", patch(admin_stock))
        .route("/api/admin/orders", get(admin_orders))
        .route("/api/admin/orders/{id}/status", patch(admin_order_status))
        .route("/api/admin/orders/{id}/cancel", patch(admin_cancel))
        .with_state(state)
}

// ============================================================================
// Envelope Helpers
// ============================================================================

fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
        .into_response()
}

fn product_list(products: &[&Product], categories: Vec<String>) -> Response {
    Json(json!({
        "success": true,
        "data": products,
        "categories": categories,
        "total": products.len(),
    }))
    .into_response()
}

// ============================================================================
// Shopper Endpoints
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductFilter {
    search: Option<String>,
    category: Option<String>,
    is_active: Option<bool>,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|s| {
            product
                .name
                .to_lowercase()
                .contains(&s.trim().to_lowercase())
        });
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| product.category == c);
        let active_ok = self.is_active.is_none_or(|a| product.is_active == a);
        search_ok && category_ok && active_ok
    }
}

async fn list_products(
    State(state): State<FakeState>,
    Query(filter): Query<ProductFilter>,
) -> Response {
    state.product_list_requests.fetch_add(1, Ordering::SeqCst);
    let shop = state.shop();
    let products: Vec<&Product> = shop
        .products
        .values()
        .filter(|p| p.is_active && filter.matches(p))
        .collect();
    product_list(&products, shop.active_categories())
}

async fn get_product(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let shop = state.shop();
    match shop.products.get(&ProductId::new(id)) {
        Some(product) if product.is_active => ok(product),
        _ => fail(StatusCode::NOT_FOUND, "Product not found or no longer available"),
    }
}

async fn categories(State(state): State<FakeState>) -> Response {
    ok(state.shop().active_categories())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    customer_name: String,
    customer_email: Option<String>,
    customer_phone: String,
    customer_address: String,
    notes: Option<String>,
    cart_items: BTreeMap<String, i64>,
}

async fn create_order(State(state): State<FakeState>, Json(body): Json<OrderBody>) -> Response {
    let mut shop = state.shop();

    if let Some(message) = shop.reject_next_order.take() {
        return fail(StatusCode::BAD_REQUEST, message);
    }
    if body.cart_items.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let mut lines = Vec::new();
    for (raw_id, quantity) in &body.cart_items {
        let Ok(id) = raw_id.parse::<ProductId>() else {
            return fail(StatusCode::BAD_REQUEST, format!("Invalid product id: {raw_id}"));
        };
        let Some(product) = shop.products.get(&id) else {
            return fail(StatusCode::BAD_REQUEST, format!("Product not found: ID = {id}"));
        };
        if !product.is_active {
            return fail(
                StatusCode::BAD_REQUEST,
                format!("Product delisted: {}", product.name),
            );
        }
        let Ok(quantity) = u32::try_from(*quantity) else {
            return fail(StatusCode::BAD_REQUEST, "Invalid quantity");
        };
        if quantity == 0 {
            continue;
        }
        if quantity > product.stock_quantity {
            return fail(
                StatusCode::BAD_REQUEST,
                format!(
                    "Insufficient stock for {}: {} available",
                    product.name, product.stock_quantity
                ),
            );
        }
        lines.push((id, quantity));
    }

    let mut items = Vec::with_capacity(lines.len());
    for (id, quantity) in lines {
        shop.next_item_id += 1;
        let item_id = OrderItemId::new(shop.next_item_id);
        let Some(product) = shop.products.get_mut(&id) else {
            continue;
        };
        product.stock_quantity -= quantity;
        items.push(OrderItem {
            id: Some(item_id),
            product: Some(product.clone()),
            quantity,
            unit_price: product.price,
            subtotal: product.price.times(quantity),
        });
    }

    shop.next_order_id += 1;
    let order = Order {
        id: OrderId::new(shop.next_order_id),
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
        customer_address: body.customer_address,
        total_amount: items.iter().map(|item| item.subtotal).sum(),
        status: OrderStatus::Pending,
        order_date: Some(chrono::Local::now().naive_local()),
        notes: body.notes,
        order_items: items,
    };
    shop.orders.insert(order.id, order.clone());
    ok(order)
}

#[derive(Debug, Deserialize)]
struct ContactFilter {
    email: Option<String>,
    phone: Option<String>,
}

async fn customer_orders(
    State(state): State<FakeState>,
    Query(filter): Query<ContactFilter>,
) -> Response {
    if filter.email.is_none() && filter.phone.is_none() {
        return fail(StatusCode::BAD_REQUEST, "Email or phone is required");
    }
    let shop = state.shop();
    let orders: Vec<&Order> = shop
        .orders
        .values()
        .filter(|o| {
            let email_match = filter.email.as_deref().is_some_and(|e| {
                o.customer_email
                    .as_deref()
                    .is_some_and(|oe| oe.eq_ignore_ascii_case(e))
            });
            let phone_match = filter.phone.as_deref() == Some(o.customer_phone.as_str());
            email_match || phone_match
        })
        .collect();
    ok(orders)
}

async fn get_order(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    match state.shop().orders.get(&OrderId::new(id)) {
        Some(order) => ok(order),
        None => fail(StatusCode::NOT_FOUND, format!("Order not found: ID = {id}")),
    }
}

// ============================================================================
// Admin Endpoints
// ============================================================================

async fn dashboard(State(state): State<FakeState>) -> Response {
    let shop = state.shop();
    let active = shop.products.values().filter(|p| p.is_active).count();
    let low_stock: Vec<&Product> = shop
        .products
        .values()
        .filter(|p| p.is_active && p.stock_quantity <= 5)
        .collect();
    let sales: Price = shop
        .orders
        .values()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum();
    let status_stats: Vec<(OrderStatus, usize)> = OrderStatus::ALL
        .iter()
        .map(|&s| (s, shop.orders.values().filter(|o| o.status == s).count()))
        .filter(|&(_, count)| count > 0)
        .collect();

    ok(json!({
        "activeProducts": active,
        "inactiveProducts": shop.products.len() - active,
        "lowStockProducts": low_stock,
        "todayOrdersCount": shop.orders.len(),
        "todaySales": sales,
        "thisMonthSales": sales,
        "recentOrders": shop.orders.values().rev().take(5).collect::<Vec<_>>(),
        "statusStats": status_stats,
    }))
}

async fn admin_products(
    State(state): State<FakeState>,
    Query(filter): Query<ProductFilter>,
) -> Response {
    let shop = state.shop();
    let products: Vec<&Product> = shop
        .products
        .values()
        .filter(|p| filter.matches(p))
        .collect();
    product_list(&products, shop.active_categories())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: String,
    category: String,
    price: Price,
    description: Option<String>,
    is_active: bool,
    stock_quantity: u32,
}

impl ProductBody {
    fn apply(self, product: &mut Product) {
        product.name = self.name;
        product.category = self.category;
        product.price = self.price;
        product.description = self.description;
        product.is_active = self.is_active;
        product.stock_quantity = self.stock_quantity;
    }
}

async fn admin_create_product(
    State(state): State<FakeState>,
    Json(body): Json<ProductBody>,
) -> Response {
    if body.name.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "Product name is required");
    }
    let mut shop = state.shop();
    let id = shop.new_product_id();
    let mut product = Product {
        id,
        name: String::new(),
        category: String::new(),
        price: Price::ZERO,
        description: None,
        is_active: true,
        stock_quantity: 0,
        created_at: Some(chrono::Local::now().naive_local()),
        updated_at: None,
    };
    body.apply(&mut product);
    shop.products.insert(id, product.clone());
    ok(product)
}

async fn admin_update_product(
    State(state): State<FakeState>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut shop = state.shop();
    let Some(product) = shop.products.get_mut(&ProductId::new(id)) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    body.apply(product);
    ok(product.clone())
}

async fn admin_delete_product(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    match state.shop().products.remove(&ProductId::new(id)) {
        Some(_) => Json(json!({ "success": true, "message": "Product deleted" })).into_response(),
        None => fail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn admin_toggle(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let mut shop = state.shop();
    let Some(product) = shop.products.get_mut(&ProductId::new(id)) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    product.is_active = !product.is_active;
    ok(product.clone())
}

#[derive(Debug, Deserialize)]
struct StockBody {
    stock: u32,
}

async fn admin_stock(
    State(state): State<FakeState>,
    Path(id): Path<i64>,
    Json(body): Json<StockBody>,
) -> Response {
    let mut shop = state.shop();
    let Some(product) = shop.products.get_mut(&ProductId::new(id)) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    product.stock_quantity = body.stock;
    ok(product.clone())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderFilter {
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    status: Option<OrderStatus>,
}

async fn admin_orders(
    State(state): State<FakeState>,
    Query(filter): Query<OrderFilter>,
) -> Response {
    let shop = state.shop();
    let orders: Vec<&Order> = shop
        .orders
        .values()
        .filter(|o| {
            filter.customer_name.as_deref().is_none_or(|n| {
                o.customer_name.to_lowercase().contains(&n.to_lowercase())
            }) && filter
                .customer_email
                .as_deref()
                .is_none_or(|e| o.customer_email.as_deref() == Some(e))
                && filter
                    .customer_phone
                    .as_deref()
                    .is_none_or(|p| o.customer_phone == p)
                && filter.status.is_none_or(|s| o.status == s)
        })
        .collect();
    ok(orders)
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn admin_order_status(
    State(state): State<FakeState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Response {
    let mut shop = state.shop();
    let Some(order) = shop.orders.get_mut(&OrderId::new(id)) else {
        return fail(StatusCode::NOT_FOUND, format!("Order not found: ID = {id}"));
    };
    order.status = body.status;
    ok(order.clone())
}

async fn admin_cancel(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let mut shop = state.shop();
    let Some(order) = shop.orders.get(&OrderId::new(id)).cloned() else {
        return fail(StatusCode::NOT_FOUND, format!("Order not found: ID = {id}"));
    };
    match order.status {
        OrderStatus::Delivered => {
            return fail(StatusCode::BAD_REQUEST, "Delivered orders cannot be cancelled");
        }
        OrderStatus::Cancelled => {
            return fail(StatusCode::BAD_REQUEST, "Order is already cancelled");
        }
        _ => {}
    }

    for item in &order.order_items {
        let Some(ordered) = &item.product else {
            continue;
        };
        if let Some(product) = shop.products.get_mut(&ordered.id) {
            product.stock_quantity += item.quantity;
        }
    }

    let Some(order) = shop.orders.get_mut(&OrderId::new(id)) else {
        return fail(StatusCode::NOT_FOUND, format!("Order not found: ID = {id}"));
    };
    order.status = OrderStatus::Cancelled;
    ok(order.clone())
}
