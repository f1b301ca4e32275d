//! Shopline Core - Shared types library.
//!
//! This crate provides the domain types used across all Shopline components:
//! - `storefront` - Cart store, catalog reconciliation and the backend client
//! - `cli` - Command-line driver for browsing, cart and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, contact details and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
