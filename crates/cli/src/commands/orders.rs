//! Order lookup commands.

use shopline_storefront::api::Order;
use shopline_storefront::checkout::last_order_id;
use shopline_storefront::error::AppError;
use shopline_storefront::format::{format_date_time, format_price};
use shopline_storefront::notify::{Notice, Notifier};
use shopline_storefront::orders::{OrderLookup, parse_order_id};
use tracing::info;

use crate::context::Context;

/// One-line order summary.
pub fn order_line(order: &Order) -> String {
    format!(
        "#{:<6} {:<16} {:<10} {:>12}  {}",
        order.id.as_i64(),
        format_date_time(order.order_date),
        order.status.label(),
        format_price(order.total_amount),
        order.customer_name,
    )
}

/// Find orders by email and/or phone.
pub async fn lookup(ctx: &Context, email: String, phone: String) -> Result<(), AppError> {
    let query = OrderLookup::new(email, phone).to_query()?;
    let orders = ctx.client.customer_orders(&query).await?;

    if orders.is_empty() {
        ctx.notifier.notify(Notice::error("No matching orders found"));
    }
    for order in &orders {
        info!("{}", order_line(order));
    }
    Ok(())
}

/// Show an order with its items; defaults to the last order placed here.
pub async fn show(ctx: &Context, id: Option<&str>) -> Result<(), AppError> {
    let id = match id {
        Some(raw) => parse_order_id(raw)?,
        None => last_order_id(ctx.store.storage().as_ref()).ok_or_else(|| {
            AppError::InvalidInput("no order number given and no order placed yet".to_string())
        })?,
    };

    let order = ctx.client.get_order(id).await?;

    info!("{}", order_line(&order));
    info!("  Phone:   {}", order.customer_phone);
    info!(
        "  Email:   {}",
        order.customer_email.as_deref().unwrap_or("not provided")
    );
    info!("  Address: {}", order.customer_address);
    if let Some(notes) = order.notes.as_deref() {
        info!("  Notes:   {notes}");
    }
    for item in &order.order_items {
        info!(
            "  {:<30} {:>4} x {:>10} = {}",
            item.product_name().unwrap_or("(removed product)"),
            item.quantity,
            format_price(item.unit_price),
            format_price(item.subtotal)
        );
    }
    info!("  {} item(s)", order.item_count());
    Ok(())
}
