//! Catalog browsing commands.

use shopline_core::ProductId;
use shopline_storefront::api::{ApiError, Product, ProductQuery};
use shopline_storefront::catalog::{self, HOT_PRODUCT_LIMIT, SUGGESTION_LIMIT};
use shopline_storefront::debounce::{Debouncer, SUGGESTION_DELAY};
use shopline_storefront::format::{DEFAULT_TRUNCATE_CHARS, format_price, truncate_text};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::context::Context;

const NAME_COLUMN_CHARS: usize = 30;

/// One-line summary used by every product listing.
pub fn product_line(product: &Product) -> String {
    format!(
        "#{:<5} {:<32} {:>12}  stock {:>4}  [{}]",
        product.id.as_i64(),
        truncate_text(&product.name, NAME_COLUMN_CHARS),
        format_price(product.price),
        product.stock_quantity,
        product.category,
    )
}

/// List active products.
///
/// A single category is filtered by the backend; several are matched here.
pub async fn list(
    ctx: &Context,
    search: Option<String>,
    categories: Vec<String>,
) -> Result<(), ApiError> {
    let query = match categories.as_slice() {
        [single] => ProductQuery {
            search,
            category: Some(single.clone()),
        },
        _ => ProductQuery {
            search,
            category: None,
        },
    };
    let listing = ctx.client.list_products(&query).await?;

    let shown = catalog::filter_by_categories(&listing.products, &categories);
    info!("{} product(s)", shown.len());
    for product in shown {
        info!("{}", product_line(product));
    }
    if !listing.categories.is_empty() {
        info!("Categories: {}", listing.categories.join(", "));
    }
    Ok(())
}

/// Show one product with live stock.
pub async fn show(ctx: &Context, id: ProductId) -> Result<(), ApiError> {
    let product = ctx.client.get_product(id).await?;

    info!("{}", product_line(&product));
    if let Some(description) = product.description.as_deref() {
        info!("  {}", truncate_text(description, DEFAULT_TRUNCATE_CHARS * 4));
    }
    if !product.in_stock() {
        info!("  Out of stock");
    }
    Ok(())
}

/// List category names.
pub async fn categories(ctx: &Context) -> Result<(), ApiError> {
    for category in ctx.client.categories().await? {
        info!("{category}");
    }
    Ok(())
}

/// Show the products closest to selling out.
pub async fn hot(ctx: &Context) -> Result<(), ApiError> {
    let listing = ctx.client.list_products(&ProductQuery::all()).await?;

    let hot = catalog::hot_products(&listing.products, HOT_PRODUCT_LIMIT);
    if hot.is_empty() {
        info!("Nothing in stock right now");
    }
    for product in hot {
        info!("{}", product_line(product));
    }
    Ok(())
}

/// Suggest product names containing `keyword`.
pub async fn suggest(ctx: &Context, keyword: &str) -> Result<(), ApiError> {
    let listing = ctx.client.list_products(&ProductQuery::all()).await?;
    print_suggestions(&listing.products, keyword);
    Ok(())
}

/// Suggest product names for keywords read from stdin.
///
/// Lines arriving within [`SUGGESTION_DELAY`] of each other collapse into
/// one lookup for the latest keyword.
pub async fn suggest_as_typed(ctx: &Context) {
    let debouncer = Debouncer::new(SUGGESTION_DELAY);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let keyword = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "Stopped reading keywords");
                break;
            }
        };

        let client = ctx.client.clone();
        debouncer.call(async move {
            match client.list_products(&ProductQuery::all()).await {
                Ok(listing) => print_suggestions(&listing.products, &keyword),
                Err(err) => warn!(error = %err, "Suggestion lookup failed"),
            }
        });
    }

    debouncer.settle().await;
}

fn print_suggestions(products: &[Product], keyword: &str) {
    for name in catalog::search_suggestions(products, keyword, SUGGESTION_LIMIT) {
        info!("{name}");
    }
}
