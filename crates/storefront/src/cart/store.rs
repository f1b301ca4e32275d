//! Durable cart store.
//!
//! Every mutation is a read-modify-write of the whole [`CartState`] against
//! the storage backend. Persistence is best effort: storage failures are
//! logged and swallowed.

use std::num::NonZeroU32;
use std::sync::Arc;

use shopline_core::ProductId;
use tracing::warn;

use crate::cart::state::CartState;
use crate::cart::storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage};
use crate::cart::CartError;
use crate::error::add_breadcrumb;

/// The single owner of the persisted cart.
///
/// Cheap to clone; clones share the storage backend.
#[derive(Debug, Clone)]
pub struct CartStore {
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// A store persisting through `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self { storage }
    }

    /// A store that keeps everything in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The backing storage, shared with other client state (last order id).
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn CartStorage> {
        &self.storage
    }

    /// Current persisted state.
    ///
    /// Missing, unreadable or corrupt data loads as an empty cart.
    #[must_use]
    pub fn load(&self) -> CartState {
        let raw = match self.storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CartState::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart, starting empty");
                return CartState::new();
            }
        };

        CartState::from_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding corrupt cart data");
            CartState::new()
        })
    }

    /// Persist a whole state, replacing what was stored.
    pub fn save(&self, state: &CartState) {
        let json = match state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode cart");
                return;
            }
        };

        if let Err(e) = self.storage.put(CART_STORAGE_KEY, &json) {
            warn!(error = %e, "Failed to save cart");
        }
    }

    /// Add `delta` units of a product, creating the entry if needed.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `delta` is zero; the cart
    /// is left unchanged.
    pub fn add(&self, id: ProductId, delta: u32) -> Result<u32, CartError> {
        let delta = NonZeroU32::new(delta).ok_or(CartError::InvalidQuantity(0))?;

        let mut state = self.load();
        let quantity = state.increment(id, delta);
        self.save(&state);

        cart_breadcrumb("Added to cart", id, quantity);
        Ok(quantity)
    }

    /// Add a single unit.
    pub fn add_one(&self, id: ProductId) -> u32 {
        let mut state = self.load();
        let quantity = state.increment(id, NonZeroU32::MIN);
        self.save(&state);
        cart_breadcrumb("Added to cart", id, quantity);
        quantity
    }

    /// Overwrite a product's quantity. Zero or below removes the entry.
    ///
    /// Returns the stored quantity, or `None` if the entry was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` does not fit a
    /// `u32`; the cart is left unchanged.
    pub fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<u32>, CartError> {
        if quantity <= 0 {
            self.remove(id);
            return Ok(None);
        }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;

        let mut state = self.load();
        state.set(id, quantity);
        self.save(&state);
        Ok(Some(quantity))
    }

    /// Remove a product. Removing an absent product is a no-op.
    ///
    /// Returns the quantity that was removed.
    pub fn remove(&self, id: ProductId) -> Option<u32> {
        let mut state = self.load();
        let removed = state.remove(id)?;
        self.save(&state);
        cart_breadcrumb("Removed from cart", id, removed);
        Some(removed)
    }

    /// Empty the cart, deleting the persisted entry.
    pub fn clear(&self) {
        if let Err(e) = self.storage.delete(CART_STORAGE_KEY) {
            warn!(error = %e, "Failed to clear cart");
        }
        add_breadcrumb("cart", "Cleared cart", None);
    }

    /// Quantity of one product, if present.
    #[must_use]
    pub fn quantity(&self, id: ProductId) -> Option<u32> {
        self.load().get(id)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }
}

fn cart_breadcrumb(message: &str, id: ProductId, quantity: u32) {
    let product_id = id.to_string();
    let quantity = quantity.to_string();
    add_breadcrumb(
        "cart",
        message,
        Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::storage::StorageError;

    fn id(n: i64) -> ProductId {
        ProductId::new(n)
    }

    /// Storage whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStorage;

    impl CartStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }

        fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn test_add_then_load() {
        let store = CartStore::in_memory();
        assert_eq!(store.add(id(1), 4).unwrap(), 4);
        assert_eq!(store.load().get(id(1)), Some(4));
    }

    #[test]
    fn test_add_accumulates() {
        let store = CartStore::in_memory();
        store.add(id(1), 1).unwrap();
        store.add(id(1), 2).unwrap();
        assert_eq!(store.quantity(id(1)), Some(3));
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_add_zero_is_rejected_without_mutation() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        assert!(matches!(store.add(id(1), 0), Err(CartError::InvalidQuantity(0))));
        assert_eq!(store.quantity(id(1)), Some(2));
    }

    #[test]
    fn test_add_one() {
        let store = CartStore::in_memory();
        assert_eq!(store.add_one(id(9)), 1);
        assert_eq!(store.add_one(id(9)), 2);
    }

    #[test]
    fn test_set_quantity_overwrites_and_removes() {
        let store = CartStore::in_memory();
        store.add(id(2), 5).unwrap();

        assert_eq!(store.set_quantity(id(2), 3).unwrap(), Some(3));
        assert_eq!(store.quantity(id(2)), Some(3));

        assert_eq!(store.set_quantity(id(2), 0).unwrap(), None);
        assert_eq!(store.quantity(id(2)), None);

        store.add(id(2), 1).unwrap();
        assert_eq!(store.set_quantity(id(2), -3).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_out_of_range_is_rejected() {
        let store = CartStore::in_memory();
        store.add(id(2), 1).unwrap();
        let too_many = i64::from(u32::MAX) + 1;
        assert!(matches!(
            store.set_quantity(id(2), too_many),
            Err(CartError::InvalidQuantity(q)) if q == too_many
        ));
        assert_eq!(store.quantity(id(2)), Some(1));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        store.add(id(2), 1).unwrap();

        assert_eq!(store.remove(id(1)), Some(2));
        assert_eq!(store.remove(id(1)), None);
        assert_eq!(store.load().iter().collect::<Vec<_>>(), vec![(id(2), 1)]);
    }

    #[test]
    fn test_item_count_and_clear() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        store.add(id(2), 3).unwrap();
        assert_eq!(store.item_count(), 5);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.storage().get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = CartStore::in_memory();
        let state: CartState = [(id(4), 1), (id(8), 6)].into_iter().collect();
        store.save(&state);
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let store = CartStore::in_memory();
        store.storage().put(CART_STORAGE_KEY, "{not json").unwrap();
        assert!(store.load().is_empty());

        // Mutating over corrupt data starts fresh.
        store.add(id(1), 1).unwrap();
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_non_positive_persisted_quantities_are_dropped() {
        let store = CartStore::in_memory();
        store
            .storage()
            .put(CART_STORAGE_KEY, r#"{"1":3,"2":0,"3":-1}"#)
            .unwrap();
        assert_eq!(store.load().iter().collect::<Vec<_>>(), vec![(id(1), 3)]);
    }

    #[test]
    fn test_write_failures_do_not_surface() {
        let store = CartStore::new(Arc::new(ReadOnlyStorage));
        assert_eq!(store.add(id(1), 2).unwrap(), 2);
        assert_eq!(store.set_quantity(id(1), 5).unwrap(), Some(5));
        store.clear();
        // Nothing was persisted.
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(crate::cart::FileStorage::new(dir.path()));

        CartStore::new(storage.clone()).add(id(7), 2).unwrap();

        let reopened = CartStore::new(storage);
        assert_eq!(reopened.quantity(id(7)), Some(2));
    }
}
