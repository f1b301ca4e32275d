//! Checkout command.

use shopline_storefront::checkout::{Checkout, CheckoutError, CheckoutForm};
use shopline_storefront::format::format_price;
use tracing::info;

use crate::context::Context;

/// Validate the form and place an order for the cart.
pub async fn run(ctx: &Context, form: &CheckoutForm) -> Result<(), CheckoutError> {
    let checkout = Checkout::new(&ctx.store, &ctx.client, &ctx.notifier);

    let order = match checkout.submit(form).await {
        Ok(order) => order,
        Err(CheckoutError::InvalidForm(errors)) => {
            for (field, message) in errors.iter() {
                info!("  {field}: {message}");
            }
            return Err(CheckoutError::InvalidForm(errors));
        }
        Err(e) => return Err(e),
    };

    info!(
        "Order #{} ({}), total {}",
        order.id,
        order.status,
        format_price(order.total_amount)
    );
    Ok(())
}
