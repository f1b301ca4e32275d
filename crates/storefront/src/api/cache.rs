//! Cache types for catalog listing responses.

use crate::api::types::{ProductList, ProductQuery};

/// Cache key for catalog listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products(ProductQuery),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ProductList),
    Categories(Vec<String>),
}
