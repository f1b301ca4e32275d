//! The persisted quantity mapping.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize};
use shopline_core::ProductId;

/// What the shopper intends to buy: product id to a strictly positive
/// quantity.
///
/// Never holds derived data (names, prices, stock); those are fetched from
/// the catalog whenever the cart is shown. Iterates in ascending product id
/// order.
///
/// Serializes as a JSON object keyed by product id, e.g. `{"3":2,"12":1}`.
/// Deserialization drops entries whose quantity is zero, negative or out of
/// range, so a hand-edited or stale file can never break the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CartState {
    entries: BTreeMap<ProductId, u32>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity for a product, if it is in the cart.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<u32> {
        self.entries.get(&id).copied()
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities (what a cart badge shows).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries.values().map(|&q| u64::from(q)).sum()
    }

    /// Entries in ascending product id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.entries.iter().map(|(&id, &q)| (id, q))
    }

    /// Product ids in ascending order.
    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.entries.keys().copied()
    }

    /// Add `delta` units, creating the entry if needed. Saturates at
    /// `u32::MAX`. Returns the new quantity.
    pub fn increment(&mut self, id: ProductId, delta: NonZeroU32) -> u32 {
        let quantity = self.entries.entry(id).or_insert(0);
        *quantity = quantity.saturating_add(delta.get());
        *quantity
    }

    /// Overwrite the quantity; zero removes the entry.
    pub fn set(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, quantity);
        }
    }

    /// Remove a product, returning its previous quantity.
    pub fn remove(&mut self, id: ProductId) -> Option<u32> {
        self.entries.remove(&id)
    }

    /// Parse the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object of integer
    /// quantities keyed by numeric ids.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Render the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Serializing a map of integers cannot fail in practice; the error is
    /// surfaced rather than unwrapped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<'de> Deserialize<'de> for CartState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ProductId, i64>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, quantity)| u32::try_from(quantity).ok().map(|q| (id, q)))
            .collect())
    }
}

/// Collects entries, skipping zero quantities. Later duplicates overwrite
/// earlier ones.
impl FromIterator<(ProductId, u32)> for CartState {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (id, quantity) in iter {
            state.set(id, quantity);
        }
        state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(n: i64) -> ProductId {
        ProductId::new(n)
    }

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_increment_accumulates() {
        let mut state = CartState::new();
        assert_eq!(state.increment(id(1), nz(1)), 1);
        assert_eq!(state.increment(id(1), nz(2)), 3);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_increment_saturates() {
        let mut state = CartState::new();
        state.set(id(1), u32::MAX - 1);
        assert_eq!(state.increment(id(1), nz(5)), u32::MAX);
    }

    #[test]
    fn test_set_zero_removes() {
        let mut state = CartState::new();
        state.set(id(4), 3);
        state.set(id(4), 0);
        assert!(!state.contains(id(4)));
        assert!(state.is_empty());
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let state: CartState = [(id(1), 2), (id(2), 3)].into_iter().collect();
        assert_eq!(state.item_count(), 5);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_iterates_in_id_order() {
        let state: CartState = [(id(10), 1), (id(2), 1), (id(7), 1)].into_iter().collect();
        let ids: Vec<i64> = state.product_ids().map(|p| p.as_i64()).collect();
        assert_eq!(ids, vec![2, 7, 10]);
    }

    #[test]
    fn test_json_round_trip() {
        let state: CartState = [(id(3), 2), (id(12), 1)].into_iter().collect();
        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"3":2,"12":1}"#);
        assert_eq!(CartState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_from_json_drops_non_positive_and_oversized() {
        let state = CartState::from_json(r#"{"1":0,"2":-4,"3":2,"4":99999999999}"#).unwrap();
        assert_eq!(state.iter().collect::<Vec<_>>(), vec![(id(3), 2)]);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(CartState::from_json("not json").is_err());
        assert!(CartState::from_json("[1,2]").is_err());
        assert!(CartState::from_json(r#"{"abc":1}"#).is_err());
        assert!(CartState::from_json(r#"{"1":"two"}"#).is_err());
    }
}
