//! Husk Threads Core - Shared types library.
//!
//! This crate provides common types used across the Husk Threads
//! storefront:
//! - `storefront` - The storefront core (catalog, cart, checkout)
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, statuses, and price math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
