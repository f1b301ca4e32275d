//! Reconciling the cart against the live catalog.
//!
//! The cart only stores ids and quantities; everything shown to the shopper
//! comes from fresh product lookups. Reconciliation decides which entries
//! survive:
//!
//! | Lookup result            | Cart mode        | Checkout mode        |
//! |--------------------------|------------------|----------------------|
//! | fails / not found        | evict silently   | evict silently       |
//! | inactive                 | evict + notice   | evict + notice       |
//! | quantity > stock         | keep             | omit, keep in store  |
//! | otherwise                | keep             | keep                 |
//!
//! Cart mode keeps over-stock lines so the shopper can see and fix them;
//! checkout mode only passes on what can actually be supplied.

use shopline_core::{Price, ProductId};
use tracing::{debug, instrument};

use crate::api::{CatalogLookup, Product};
use crate::cart::store::CartStore;
use crate::cart::CartError;
use crate::notify::{Notice, Notifier};

/// Which view the reconciled lines are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Cart page: lines above stock stay visible.
    Cart,
    /// Checkout: lines above stock are left out of the order.
    Checkout,
}

/// Why an entry did not make it into the reconciled lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionReason {
    /// Lookup failed or the product no longer exists.
    Unavailable,
    /// The product exists but is no longer listed.
    Delisted,
    /// More units requested than in stock (checkout mode only).
    InsufficientStock { requested: u32, available: u32 },
}

/// An entry left out of the reconciled lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub product_id: ProductId,
    /// Known only when the lookup succeeded.
    pub product_name: Option<String>,
    pub reason: EvictionReason,
}

impl Eviction {
    /// Whether the entry was also deleted from the stored cart.
    #[must_use]
    pub const fn removed_from_cart(&self) -> bool {
        !matches!(self.reason, EvictionReason::InsufficientStock { .. })
    }
}

/// A cart entry joined with its live product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Whether current stock covers the requested quantity.
    #[must_use]
    pub const fn is_supplied(&self) -> bool {
        self.product.can_supply(self.quantity)
    }
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Surviving lines, in cart order.
    pub lines: Vec<CartLine>,
    pub evictions: Vec<Eviction>,
}

impl Reconciliation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all surviving lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total_amount(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Joins the stored cart with live catalog data and prunes dead entries.
pub struct CatalogReconciler<'a, C> {
    store: &'a CartStore,
    catalog: &'a C,
    notifier: &'a dyn Notifier,
}

impl<'a, C: CatalogLookup> CatalogReconciler<'a, C> {
    #[must_use]
    pub fn new(store: &'a CartStore, catalog: &'a C, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            catalog,
            notifier,
        }
    }

    /// Look up every cart entry and decide which lines survive.
    ///
    /// Lookups run one after another in cart order. A failed lookup only
    /// affects its own entry. Unavailable and delisted entries are removed
    /// from the store as a side effect.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, mode: ReconcileMode) -> Reconciliation {
        let state = self.store.load();
        let mut outcome = Reconciliation {
            lines: Vec::with_capacity(state.len()),
            evictions: Vec::new(),
        };

        for (id, quantity) in state.iter() {
            let product = match self.catalog.product(id).await {
                Ok(product) => product,
                Err(e) => {
                    debug!(product_id = %id, error = %e, "Evicting unavailable product");
                    self.store.remove(id);
                    outcome.evictions.push(Eviction {
                        product_id: id,
                        product_name: None,
                        reason: EvictionReason::Unavailable,
                    });
                    continue;
                }
            };

            if !product.is_active {
                debug!(product_id = %id, "Evicting delisted product");
                self.store.remove(id);
                self.notifier.notify(Notice::error(format!(
                    "{} is no longer available and was removed from your cart",
                    product.name
                )));
                outcome.evictions.push(Eviction {
                    product_id: id,
                    product_name: Some(product.name),
                    reason: EvictionReason::Delisted,
                });
                continue;
            }

            if mode == ReconcileMode::Checkout && !product.can_supply(quantity) {
                outcome.evictions.push(Eviction {
                    product_id: id,
                    product_name: Some(product.name),
                    reason: EvictionReason::InsufficientStock {
                        requested: quantity,
                        available: product.stock_quantity,
                    },
                });
                continue;
            }

            outcome.lines.push(CartLine { product, quantity });
        }

        debug!(
            lines = outcome.lines.len(),
            evictions = outcome.evictions.len(),
            "Cart reconciled"
        );
        outcome
    }

    /// Change a line's quantity, checked against the product's stock.
    ///
    /// Zero or below removes the line. Returns the stored quantity, or
    /// `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InsufficientStock`] (and sends an error notice)
    /// when `quantity` exceeds the product's stock; the cart is unchanged.
    pub fn update_quantity(
        &self,
        id: ProductId,
        quantity: i64,
        product: &Product,
    ) -> Result<Option<u32>, CartError> {
        if quantity <= 0 {
            self.store.remove(id);
            return Ok(None);
        }

        if quantity > i64::from(product.stock_quantity) {
            let err = CartError::InsufficientStock {
                product_id: id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock_quantity,
            };
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err);
        }

        self.store.set_quantity(id, quantity)
    }

    /// Add `delta` units of a product, checked against its stock.
    ///
    /// Returns the new stored quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::SoldOut`] when the product has no stock and
    /// [`CartError::InsufficientStock`] when the cart would end up holding
    /// more than is in stock. Either way an error notice is sent and the
    /// cart is unchanged. A zero `delta` is [`CartError::InvalidQuantity`].
    pub fn add_checked(
        &self,
        id: ProductId,
        delta: u32,
        product: &Product,
    ) -> Result<u32, CartError> {
        let err = if product.stock_quantity == 0 {
            CartError::SoldOut {
                product_id: id,
                name: product.name.clone(),
            }
        } else {
            let requested = u64::from(self.store.quantity(id).unwrap_or(0)) + u64::from(delta);
            if requested <= u64::from(product.stock_quantity) {
                return self.store.add(id, delta);
            }
            CartError::InsufficientStock {
                product_id: id,
                name: product.name.clone(),
                requested: i64::try_from(requested).unwrap_or(i64::MAX),
                available: product.stock_quantity,
            }
        };

        self.notifier.notify(Notice::error(err.to_string()));
        Err(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::api::ApiError;
    use crate::notify::{NoticeLevel, RecordingNotifier};

    fn id(n: i64) -> ProductId {
        ProductId::new(n)
    }

    fn product(n: i64, name: &str, stock: u32, active: bool) -> Product {
        Product {
            id: id(n),
            name: name.to_string(),
            category: "Kitchen".to_string(),
            price: Price::from_cents(1_250),
            description: None,
            is_active: active,
            stock_quantity: stock,
            created_at: None,
            updated_at: None,
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
    }

    impl FakeCatalog {
        fn with(products: impl IntoIterator<Item = Product>) -> Self {
            Self {
                products: products.into_iter().map(|p| (p.id, p)).collect(),
            }
        }
    }

    impl CatalogLookup for FakeCatalog {
        async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
            self.products
                .get(&id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
        }
    }

    #[tokio::test]
    async fn test_inactive_product_is_evicted_with_notice() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        store.add(id(2), 1).unwrap();
        let catalog = FakeCatalog::with([
            product(1, "Mug", 10, true),
            product(2, "Teapot", 10, false),
        ]);
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Cart)
            .await;

        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(outcome.lines[0].product.id, id(1));
        assert_eq!(outcome.lines[0].quantity, 2);
        assert_eq!(store.load().iter().collect::<Vec<_>>(), vec![(id(1), 2)]);

        assert_eq!(outcome.evictions[0].reason, EvictionReason::Delisted);
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("Teapot"));
    }

    #[tokio::test]
    async fn test_missing_product_is_evicted_silently() {
        let store = CartStore::in_memory();
        store.add(id(1), 1).unwrap();
        store.add(id(5), 3).unwrap();
        let catalog = FakeCatalog::with([product(1, "Mug", 10, true)]);
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Checkout)
            .await;

        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(
            outcome.evictions,
            vec![Eviction {
                product_id: id(5),
                product_name: None,
                reason: EvictionReason::Unavailable,
            }]
        );
        assert!(outcome.evictions[0].removed_from_cart());
        assert_eq!(store.quantity(id(5)), None);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_cart_mode_keeps_lines_above_stock() {
        let store = CartStore::in_memory();
        store.add(id(1), 5).unwrap();
        let catalog = FakeCatalog::with([product(1, "Mug", 3, true)]);
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Cart)
            .await;

        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(outcome.lines[0].quantity, 5);
        assert!(!outcome.lines[0].is_supplied());
        assert!(outcome.evictions.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_mode_omits_lines_above_stock_without_evicting() {
        let store = CartStore::in_memory();
        store.add(id(1), 5).unwrap();
        store.add(id(2), 1).unwrap();
        let catalog = FakeCatalog::with([product(1, "Mug", 3, true), product(2, "Bowl", 1, true)]);
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Checkout)
            .await;

        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(outcome.lines[0].product.id, id(2));
        assert_eq!(
            outcome.evictions[0].reason,
            EvictionReason::InsufficientStock {
                requested: 5,
                available: 3
            }
        );
        assert!(!outcome.evictions[0].removed_from_cart());
        assert_eq!(store.quantity(id(1)), Some(5));
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_lines_follow_cart_order_and_totals() {
        let store = CartStore::in_memory();
        store.add(id(9), 1).unwrap();
        store.add(id(3), 2).unwrap();
        let catalog = FakeCatalog::with([product(3, "Cup", 5, true), product(9, "Jar", 5, true)]);
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Cart)
            .await;

        let ids: Vec<ProductId> = outcome.lines.iter().map(|l| l.product.id).collect();
        assert_eq!(ids, vec![id(3), id(9)]);
        assert_eq!(outcome.total_quantity(), 3);
        assert_eq!(outcome.total_amount(), Price::from_cents(3_750));
    }

    #[tokio::test]
    async fn test_empty_cart_reconciles_to_nothing() {
        let store = CartStore::in_memory();
        let catalog = FakeCatalog::default();
        let notifier = RecordingNotifier::new();

        let outcome = CatalogReconciler::new(&store, &catalog, &notifier)
            .reconcile(ReconcileMode::Cart)
            .await;

        assert!(outcome.is_empty());
        assert_eq!(outcome.total_amount(), Price::ZERO);
    }

    #[test]
    fn test_update_quantity_above_stock_is_rejected() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        let mug = product(1, "Mug", 5, true);
        let catalog = FakeCatalog::with([mug.clone()]);
        let notifier = RecordingNotifier::new();
        let reconciler = CatalogReconciler::new(&store, &catalog, &notifier);

        let err = reconciler.update_quantity(id(1), 10, &mug).unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 10,
                available: 5,
                ..
            }
        ));
        assert_eq!(store.quantity(id(1)), Some(2));
        assert_eq!(notifier.notices().len(), 1);
    }

    #[test]
    fn test_update_quantity_sets_or_removes() {
        let store = CartStore::in_memory();
        store.add(id(1), 2).unwrap();
        let mug = product(1, "Mug", 5, true);
        let catalog = FakeCatalog::with([mug.clone()]);
        let notifier = RecordingNotifier::new();
        let reconciler = CatalogReconciler::new(&store, &catalog, &notifier);

        assert_eq!(reconciler.update_quantity(id(1), 5, &mug).unwrap(), Some(5));
        assert_eq!(store.quantity(id(1)), Some(5));

        assert_eq!(reconciler.update_quantity(id(1), 0, &mug).unwrap(), None);
        assert!(store.is_empty());
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_add_checked_rejects_sold_out_product() {
        let store = CartStore::in_memory();
        let mug = product(1, "Mug", 0, true);
        let catalog = FakeCatalog::with([mug.clone()]);
        let notifier = RecordingNotifier::new();
        let reconciler = CatalogReconciler::new(&store, &catalog, &notifier);

        let err = reconciler.add_checked(id(1), 1, &mug).unwrap_err();
        assert!(matches!(err, CartError::SoldOut { .. }));
        assert!(store.is_empty());

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Mug is sold out");
    }

    #[test]
    fn test_add_checked_rejects_when_cart_already_holds_all_stock() {
        let store = CartStore::in_memory();
        store.add(id(1), 3).unwrap();
        let mug = product(1, "Mug", 3, true);
        let catalog = FakeCatalog::with([mug.clone()]);
        let notifier = RecordingNotifier::new();
        let reconciler = CatalogReconciler::new(&store, &catalog, &notifier);

        let err = reconciler.add_checked(id(1), 1, &mug).unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(store.quantity(id(1)), Some(3));
        assert_eq!(
            notifier.notices()[0].message,
            "Only 3 of Mug in stock (requested 4)"
        );
    }

    #[test]
    fn test_add_checked_adds_up_to_stock() {
        let store = CartStore::in_memory();
        store.add(id(1), 1).unwrap();
        let mug = product(1, "Mug", 3, true);
        let catalog = FakeCatalog::with([mug.clone()]);
        let notifier = RecordingNotifier::new();
        let reconciler = CatalogReconciler::new(&store, &catalog, &notifier);

        assert_eq!(reconciler.add_checked(id(1), 2, &mug).unwrap(), 3);
        assert_eq!(store.quantity(id(1)), Some(3));
        assert!(notifier.notices().is_empty());
    }
}
