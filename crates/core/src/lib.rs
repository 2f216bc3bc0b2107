//! Verdant Core - Cart and checkout domain library.
//!
//! This crate holds the state machines behind the storefront's cart view:
//! - [`cart`] - Line items, quantity transitions and derived totals
//! - [`intent`] - Named cart mutations dispatched by the view layer
//! - [`checkout`] - Order confirmation flow and the success banner flag
//! - [`types`] - Value types such as [`Price`]
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no timers, no HTTP. Scheduling the banner timeout and owning carts per
//! visitor is the storefront's job.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod intent;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem};
pub use checkout::{CheckoutError, CheckoutPhase, CheckoutState};
pub use intent::CartIntent;
pub use types::*;
