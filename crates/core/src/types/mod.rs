//! Core types for Husk Threads.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{discount_percent, effective_price};
pub use status::*;
