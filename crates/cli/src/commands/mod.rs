//! Command implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
