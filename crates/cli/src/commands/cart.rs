//! Cart commands.

use shopline_core::ProductId;
use shopline_storefront::cart::{CatalogReconciler, ReconcileMode};
use shopline_storefront::error::AppError;
use shopline_storefront::format::format_price;
use shopline_storefront::notify::{Notice, Notifier};
use tracing::info;

use crate::commands::products::product_line;
use crate::context::Context;

/// Add units of a product, checked against live stock.
pub async fn add(ctx: &Context, id: ProductId, quantity: u32) -> Result<(), AppError> {
    // Only listed products can be added.
    let product = ctx.client.get_product(id).await?;

    let total = CatalogReconciler::new(&ctx.store, &ctx.client, &ctx.notifier)
        .add_checked(id, quantity, &product)?;
    ctx.notifier.notify(Notice::success(format!(
        "Added {} to cart ({total} in cart)",
        product.name
    )));
    Ok(())
}

/// Set a product's quantity, checked against live stock.
pub async fn set(ctx: &Context, id: ProductId, quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 {
        remove(ctx, id);
        return Ok(());
    }

    let product = ctx.client.get_product(id).await?;
    CatalogReconciler::new(&ctx.store, &ctx.client, &ctx.notifier)
        .update_quantity(id, quantity, &product)?;
    info!("{} x {quantity}", product.name);
    Ok(())
}

/// Remove a product.
pub fn remove(ctx: &Context, id: ProductId) {
    if ctx.store.remove(id).is_some() {
        ctx.notifier.notify(Notice::success("Removed from cart"));
    } else {
        info!("Product #{id} is not in the cart");
    }
}

/// Empty the cart.
pub fn clear(ctx: &Context) {
    ctx.store.clear();
    ctx.notifier.notify(Notice::success("Cart cleared"));
}

/// Show the cart joined with live product data.
pub async fn show(ctx: &Context) {
    let outcome = CatalogReconciler::new(&ctx.store, &ctx.client, &ctx.notifier)
        .reconcile(ReconcileMode::Cart)
        .await;

    if outcome.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for line in &outcome.lines {
        info!(
            "{} x {:<4} = {}",
            product_line(&line.product),
            line.quantity,
            format_price(line.line_total())
        );
        if !line.is_supplied() {
            info!(
                "  only {} in stock, lower the quantity before checking out",
                line.product.stock_quantity
            );
        }
    }
    info!(
        "{} item(s), total {}",
        outcome.total_quantity(),
        format_price(outcome.total_amount())
    );
}
