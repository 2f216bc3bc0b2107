//! Core value types for Verdant.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod price;

pub use price::{CurrencyCode, Price, PriceError};
