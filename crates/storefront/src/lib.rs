//! Shopline storefront client library.
//!
//! Client-side state and flows for a REST storefront backend: the persisted
//! cart and its reconciliation against the live catalog, checkout, order
//! lookup, and typed clients for the shopper and admin endpoints.
//!
//! # Modules
//!
//! - [`cart`] - cart store, persistence backends, catalog reconciliation
//! - [`api`] - HTTP clients for the backend
//! - [`checkout`] - checkout form validation and order submission
//! - [`orders`] - order lookup input validation
//! - [`catalog`] - hot products, search suggestions, category filtering
//! - [`notify`] - user-facing notice sink
//! - [`debounce`] - trailing-edge debouncing of async actions
//! - [`format`] - display helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod debounce;
pub mod error;
pub mod format;
pub mod notify;
pub mod orders;
