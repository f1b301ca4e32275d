//! Shopping cart.
//!
//! # Architecture
//!
//! - [`CartState`] is the persisted mapping of product id to quantity
//! - [`CartStore`] owns it and persists every mutation through a
//!   [`CartStorage`] backend (file or memory)
//! - [`CatalogReconciler`] joins the state with live product data and prunes
//!   entries that can no longer be bought
//!
//! # Example
//!
//! ```rust,ignore
//! use shopline_storefront::cart::{CartStore, CatalogReconciler, FileStorage, ReconcileMode};
//!
//! let store = CartStore::new(Arc::new(FileStorage::new(&config.data_dir)));
//! store.add(product_id, 2)?;
//!
//! let outcome = CatalogReconciler::new(&store, &client, &notifier)
//!     .reconcile(ReconcileMode::Cart)
//!     .await;
//! ```

mod reconcile;
mod state;
mod storage;
mod store;

pub use reconcile::{
    CartLine, CatalogReconciler, Eviction, EvictionReason, ReconcileMode, Reconciliation,
};
pub use state::CartState;
pub use storage::{
    CART_STORAGE_KEY, CartStorage, FileStorage, LAST_ORDER_ID_KEY, MemoryStorage, StorageError,
};
pub use store::CartStore;

use shopline_core::ProductId;
use thiserror::Error;

/// Errors from cart mutations. The cart is unchanged whenever one is
/// returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity is zero where a positive one is required, or too large.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The product has no stock left.
    #[error("{name} is sold out")]
    SoldOut { product_id: ProductId, name: String },

    /// More units requested than the product has in stock.
    #[error("Only {available} of {name} in stock (requested {requested})")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: i64,
        available: u32,
    },
}
