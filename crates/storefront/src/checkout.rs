//! Checkout: form validation and order submission.
//!
//! # Flow
//!
//! 1. [`Checkout::prepare`] reconciles the cart in checkout mode so the
//!    shopper sees exactly what will be ordered
//! 2. [`Checkout::submit`] validates the form, reconciles again against live
//!    stock and places the order for the surviving lines
//! 3. On success the cart is cleared and the order id remembered under
//!    [`LAST_ORDER_ID_KEY`]

use std::collections::BTreeMap;
use std::fmt;

use shopline_core::{Email, OrderId, Phone};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, CatalogLookup, CreateOrderRequest, Order, OrderPlacement};
use crate::cart::{
    CartState, CartStorage, CartStore, CatalogReconciler, EvictionReason, LAST_ORDER_ID_KEY,
    ReconcileMode, Reconciliation,
};
use crate::error::add_breadcrumb;
use crate::notify::{Notice, Notifier};

/// Notice sent when nothing in the cart can be ordered.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty, please add products before checking out";
pub const INVALID_FORM_MESSAGE: &str = "Please check the form";
/// Notice sent when the backend fails without a usable message.
pub const ORDER_FAILED_MESSAGE: &str = "Order could not be placed, please try again later";

// =============================================================================
// Form
// =============================================================================

/// Checkout form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutField {
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    CustomerAddress,
}

impl CheckoutField {
    /// Wire name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::CustomerEmail => "customerEmail",
            Self::CustomerPhone => "customerPhone",
            Self::CustomerAddress => "customerAddress",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<CheckoutField, String>);

impl FieldErrors {
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &str)> {
        self.0.iter().map(|(&field, message)| (field, message.as_str()))
    }

    fn insert(&mut self, field: CheckoutField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// What the shopper typed into the checkout form.
///
/// Fields are kept raw; [`validate`](Self::validate) and
/// [`to_request`](Self::to_request) trim them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub customer_name: String,
    /// Optional.
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    /// Optional.
    pub notes: String,
}

impl CheckoutForm {
    /// Check every field, collecting all problems at once.
    ///
    /// Name, phone and address are required. The phone must look like a
    /// phone number. The email is optional but must be valid when present.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.customer_name.trim().is_empty() {
            errors.insert(CheckoutField::CustomerName, "Please enter the recipient's name");
        }

        let phone = self.customer_phone.trim();
        if phone.is_empty() {
            errors.insert(CheckoutField::CustomerPhone, "Please enter a contact phone number");
        } else if Phone::parse(phone).is_err() {
            errors.insert(CheckoutField::CustomerPhone, "Please enter a valid phone number");
        }

        let email = self.customer_email.trim();
        if !email.is_empty() && Email::parse(email).is_err() {
            errors.insert(CheckoutField::CustomerEmail, "Please enter a valid email address");
        }

        if self.customer_address.trim().is_empty() {
            errors.insert(CheckoutField::CustomerAddress, "Please enter a delivery address");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Build the order request for `cart_items`.
    ///
    /// Fields are trimmed; a blank email or blank notes are sent as absent.
    #[must_use]
    pub fn to_request(&self, cart_items: CartState) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: self.customer_name.trim().to_string(),
            customer_email: non_blank(&self.customer_email),
            customer_phone: self.customer_phone.trim().to_string(),
            customer_address: self.customer_address.trim().to_string(),
            notes: non_blank(&self.notes),
            cart_items,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =============================================================================
// Checkout
// =============================================================================

/// Errors that can end a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields are invalid.
    #[error("Invalid checkout form: {0}")]
    InvalidForm(FieldErrors),

    /// Nothing in the cart can be ordered.
    #[error("Cart is empty")]
    EmptyCart,

    /// The backend refused or failed to place the order.
    #[error("Order failed: {0}")]
    Api(#[from] ApiError),
}

/// Drives a checkout against a backend that can both look up products and
/// place orders.
pub struct Checkout<'a, C> {
    store: &'a CartStore,
    backend: &'a C,
    notifier: &'a dyn Notifier,
}

impl<'a, C: CatalogLookup + OrderPlacement> Checkout<'a, C> {
    #[must_use]
    pub fn new(store: &'a CartStore, backend: &'a C, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            backend,
            notifier,
        }
    }

    fn reconciler(&self) -> CatalogReconciler<'a, C> {
        CatalogReconciler::new(self.store, self.backend, self.notifier)
    }

    /// The lines that would be ordered right now.
    ///
    /// Sends an error notice when nothing is left to order.
    #[instrument(skip(self))]
    pub async fn prepare(&self) -> Reconciliation {
        let outcome = self.reconciler().reconcile(ReconcileMode::Checkout).await;
        if outcome.is_empty() {
            self.notifier.notify(Notice::error(EMPTY_CART_MESSAGE));
        }
        outcome
    }

    /// Validate the form and place the order.
    ///
    /// Only lines that pass checkout reconciliation are sent. On success the
    /// ordered lines leave the cart and the order id is remembered. Lines
    /// held back for lack of stock stay in the cart, each with an error
    /// notice.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidForm`] if validation fails (nothing is sent)
    /// - [`CheckoutError::EmptyCart`] if no line survives reconciliation
    /// - [`CheckoutError::Api`] if the backend refuses or fails; the cart is
    ///   kept, and re-reconciled when the order was refused
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<Order, CheckoutError> {
        if let Err(errors) = form.validate() {
            self.notifier.notify(Notice::error(INVALID_FORM_MESSAGE));
            return Err(CheckoutError::InvalidForm(errors));
        }

        let outcome = self.reconciler().reconcile(ReconcileMode::Checkout).await;
        if outcome.is_empty() {
            self.notifier.notify(Notice::error(EMPTY_CART_MESSAGE));
            return Err(CheckoutError::EmptyCart);
        }

        let cart_items: CartState = outcome
            .lines
            .iter()
            .map(|line| (line.product.id, line.quantity))
            .collect();
        let request = form.to_request(cart_items);

        let order = match self.backend.place_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                let message = match &e {
                    ApiError::Rejected { message, .. } | ApiError::NotFound(message) => {
                        message.clone()
                    }
                    _ => ORDER_FAILED_MESSAGE.to_string(),
                };
                warn!(error = %e, "Order placement failed");
                self.notifier.notify(Notice::error(message));

                // Stock or listing changed underneath us; prune what we can.
                if matches!(e, ApiError::Rejected { .. }) {
                    self.reconciler().reconcile(ReconcileMode::Checkout).await;
                }
                return Err(e.into());
            }
        };

        for line in &outcome.lines {
            self.store.remove(line.product.id);
        }
        if self.store.is_empty() {
            self.store.clear();
        }
        remember_last_order(self.store.storage().as_ref(), order.id);
        notify_held_back(self.notifier, &outcome);

        let order_id = order.id.to_string();
        add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
        info!(order_id = %order.id, total = %order.total_amount, "Checkout complete");
        self.notifier
            .notify(Notice::success(format!("Order #{} placed successfully", order.id)));

        Ok(order)
    }
}

fn notify_held_back(notifier: &dyn Notifier, outcome: &Reconciliation) {
    for eviction in &outcome.evictions {
        if let EvictionReason::InsufficientStock { requested, available } = eviction.reason {
            let name = eviction.product_name.as_deref().unwrap_or("A product");
            notifier.notify(Notice::error(format!(
                "{name} was not ordered: only {available} in stock (requested {requested}), it is still in your cart"
            )));
        }
    }
}

// =============================================================================
// Last Order
// =============================================================================

fn remember_last_order(storage: &dyn CartStorage, id: OrderId) {
    if let Err(e) = storage.put(LAST_ORDER_ID_KEY, &id.to_string()) {
        warn!(error = %e, order_id = %id, "Failed to remember last order");
    }
}

/// Id of the most recently placed order, if one was recorded.
#[must_use]
pub fn last_order_id(storage: &dyn CartStorage) -> Option<OrderId> {
    match storage.get(LAST_ORDER_ID_KEY) {
        Ok(raw) => raw.and_then(|raw| raw.parse().ok()),
        Err(e) => {
            warn!(error = %e, "Failed to read last order id");
            None
        }
    }
}

/// Forget the most recently placed order.
pub fn forget_last_order(storage: &dyn CartStorage) {
    if let Err(e) = storage.delete(LAST_ORDER_ID_KEY) {
        warn!(error = %e, "Failed to forget last order");
    }
}
