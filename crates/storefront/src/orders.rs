//! Order lookup input validation.

use shopline_core::{Email, EmailError, IdParseError, OrderId};
use thiserror::Error;

use crate::api::CustomerOrderQuery;

/// Errors from order lookup input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Neither an email nor a phone number was given.
    #[error("Please enter at least one contact detail (email or phone)")]
    MissingContact,

    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Order number must contain digits only: {0}")]
    InvalidOrderId(#[from] IdParseError),
}

/// Contact details a customer enters to find their orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLookup {
    pub email: String,
    pub phone: String,
}

impl OrderLookup {
    #[must_use]
    pub fn new(email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Validate and turn into a backend query.
    ///
    /// At least one of email or phone is required. A present email must be
    /// valid; the phone is passed through as typed (trimmed) since the
    /// backend matches it verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MissingContact`] or
    /// [`LookupError::InvalidEmail`].
    pub fn to_query(&self) -> Result<CustomerOrderQuery, LookupError> {
        let email = self.email.trim();
        let phone = self.phone.trim();

        if email.is_empty() && phone.is_empty() {
            return Err(LookupError::MissingContact);
        }

        let email = if email.is_empty() {
            None
        } else {
            Some(Email::parse(email)?.into_inner())
        };

        Ok(CustomerOrderQuery {
            email,
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }
}

/// Parse an order number as typed by a customer.
///
/// # Errors
///
/// Returns [`LookupError::InvalidOrderId`] unless the input is all digits.
pub fn parse_order_id(raw: &str) -> Result<OrderId, LookupError> {
    Ok(raw.parse::<OrderId>()?)
}
