//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart_session` - Per-visitor cart and checkout state, kept in memory
//! - `banner` - Cancellable auto-hide timer for the checkout success banner

pub mod banner;
pub mod cart_session;

pub use banner::BannerTimer;
pub use cart_session::{CartHandle, CartSession, CartStore};
