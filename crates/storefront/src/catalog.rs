//! Browsing helpers over an already-fetched product listing.

use std::collections::HashSet;

use crate::api::Product;

/// Products featured as "hot".
pub const HOT_PRODUCT_LIMIT: usize = 3;

/// Maximum search suggestions offered while typing.
pub const SUGGESTION_LIMIT: usize = 5;

/// In-stock products closest to selling out, lowest stock first.
///
/// Ties keep listing order.
#[must_use]
pub fn hot_products(products: &[Product], limit: usize) -> Vec<&Product> {
    let mut in_stock: Vec<&Product> = products.iter().filter(|p| p.in_stock()).collect();
    in_stock.sort_by_key(|p| p.stock_quantity);
    in_stock.truncate(limit);
    in_stock
}

/// Distinct product names containing `keyword`, case-insensitively, in
/// listing order.
///
/// A blank keyword yields nothing.
#[must_use]
pub fn search_suggestions<'a>(products: &'a [Product], keyword: &str, limit: usize) -> Vec<&'a str> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    products
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| name.to_lowercase().contains(&keyword))
        .filter(|name| seen.insert(*name))
        .take(limit)
        .collect()
}

/// Products in any of `categories`; everything when none are selected.
#[must_use]
pub fn filter_by_categories<'a>(products: &'a [Product], categories: &[String]) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| categories.is_empty() || categories.contains(&p.category))
        .collect()
}
