//! Store administration commands.

use shopline_core::{OrderId, OrderStatus, ProductId};
use shopline_storefront::api::{AdminOrderQuery, AdminProductQuery, ApiError, ProductInput};
use shopline_storefront::format::{format_date, format_price};
use tracing::info;

use crate::commands::orders::order_line;
use crate::commands::products::product_line;
use crate::context::Context;

/// Show dashboard statistics.
pub async fn dashboard(ctx: &Context) -> Result<(), ApiError> {
    let stats = ctx.admin().dashboard().await?;

    info!(
        "Products: {} listed, {} delisted",
        stats.active_products, stats.inactive_products
    );
    info!(
        "Sales: {} today ({} orders), {} this month",
        format_price(stats.today_sales),
        stats.today_orders_count,
        format_price(stats.this_month_sales)
    );
    for (status, count) in &stats.status_stats {
        info!("  {:<10} {count}", status.label());
    }
    if !stats.low_stock_products.is_empty() {
        info!("Low stock:");
        for product in &stats.low_stock_products {
            info!("  {}", product_line(product));
        }
    }
    if !stats.recent_orders.is_empty() {
        info!("Recent orders:");
        for order in &stats.recent_orders {
            info!("  {}", order_line(order));
        }
    }
    Ok(())
}

/// List products, including delisted ones.
pub async fn products(
    ctx: &Context,
    category: Option<String>,
    search: Option<String>,
    is_active: Option<bool>,
) -> Result<(), ApiError> {
    let query = AdminProductQuery {
        category,
        search,
        is_active,
    };
    let listing = ctx.admin().list_products(&query).await?;

    info!("{} product(s)", listing.total);
    for product in &listing.products {
        let state = if product.is_active { "" } else { " (delisted)" };
        info!(
            "{}  added {}{state}",
            product_line(product),
            format_date(product.created_at)
        );
    }
    Ok(())
}

pub async fn create_product(ctx: &Context, input: &ProductInput) -> Result<(), ApiError> {
    let product = ctx.admin().create_product(input).await?;
    info!("Created {}", product_line(&product));
    Ok(())
}

pub async fn delete_product(ctx: &Context, id: ProductId) -> Result<(), ApiError> {
    ctx.admin().delete_product(id).await?;
    info!("Deleted product #{id}");
    Ok(())
}

/// Flip a product between listed and delisted.
pub async fn toggle(ctx: &Context, id: ProductId) -> Result<(), ApiError> {
    let product = ctx.admin().toggle_product_status(id).await?;
    let state = if product.is_active { "listed" } else { "delisted" };
    info!("{} is now {state}", product.name);
    Ok(())
}

pub async fn stock(ctx: &Context, id: ProductId, stock: u32) -> Result<(), ApiError> {
    let product = ctx.admin().update_stock(id, stock).await?;
    info!("{}", product_line(&product));
    Ok(())
}

/// List orders matching the filters.
pub async fn orders(ctx: &Context, query: &AdminOrderQuery) -> Result<(), ApiError> {
    let orders = ctx.admin().list_orders(query).await?;

    info!("{} order(s)", orders.len());
    for order in &orders {
        info!("{}", order_line(order));
    }
    Ok(())
}

pub async fn order_status(ctx: &Context, id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
    let order = ctx.admin().update_order_status(id, status).await?;
    info!("{}", order_line(&order));
    Ok(())
}

/// Cancel an order; its stock is restored by the backend.
pub async fn cancel(ctx: &Context, id: OrderId) -> Result<(), ApiError> {
    let order = ctx.admin().cancel_order(id).await?;
    info!("{}", order_line(&order));
    Ok(())
}
