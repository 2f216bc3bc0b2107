//! Checkout confirmation flow.
//!
//! ```text
//! Idle --begin--> ConfirmingOrder --confirm--> Idle (cart cleared, banner on)
//!                                 --cancel---> Idle (cart unchanged)
//! ```
//!
//! Confirmed and cancelled are not stored states: both collapse back to
//! [`CheckoutPhase::Idle`] immediately. A summary whose cart empties while
//! open also falls back to idle, see [`CheckoutState::cart_changed`].
//!
//! Hiding the success banner after a timeout is scheduled by the caller,
//! which then calls [`CheckoutState::dismiss_banner`].

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::intent::CartIntent;

/// Errors returned by checkout transitions.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout was requested for a cart with no items.
    #[error("cannot check out an empty cart")]
    EmptyCart,
    /// Confirmation was requested while no order summary is open.
    #[error("no order is awaiting confirmation")]
    NotConfirming,
}

/// Whether the order summary overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    ConfirmingOrder,
}

/// View-local checkout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckoutState {
    phase: CheckoutPhase,
    success_banner: bool,
}

impl CheckoutState {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Whether the order summary overlay should be shown.
    #[must_use]
    pub const fn is_confirming(&self) -> bool {
        matches!(self.phase, CheckoutPhase::ConfirmingOrder)
    }

    /// Whether the success banner should be shown.
    #[must_use]
    pub const fn success_banner(&self) -> bool {
        self.success_banner
    }

    /// Open the order summary. Opening it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if `cart` has no items.
    pub fn begin(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if !cart.can_checkout() {
            return Err(CheckoutError::EmptyCart);
        }
        self.phase = CheckoutPhase::ConfirmingOrder;
        Ok(())
    }

    /// Confirm the open order.
    ///
    /// Closes the overlay and raises the success banner. Returns the
    /// [`CartIntent::ClearCart`] intent for the caller to dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotConfirming`] when the overlay is closed,
    /// or [`CheckoutError::EmptyCart`] (closing the overlay) if `cart` was
    /// emptied while the summary was open.
    pub fn confirm(&mut self, cart: &Cart) -> Result<CartIntent, CheckoutError> {
        if !self.is_confirming() {
            return Err(CheckoutError::NotConfirming);
        }
        if !cart.can_checkout() {
            self.phase = CheckoutPhase::Idle;
            return Err(CheckoutError::EmptyCart);
        }
        self.phase = CheckoutPhase::Idle;
        self.success_banner = true;
        Ok(CartIntent::ClearCart)
    }

    /// Re-check the open summary after a cart mutation.
    ///
    /// An emptied cart closes the summary, since there is nothing left to
    /// confirm.
    pub fn cart_changed(&mut self, cart: &Cart) {
        if self.is_confirming() && !cart.can_checkout() {
            self.phase = CheckoutPhase::Idle;
        }
    }

    /// Close the overlay without placing the order. No-op when idle.
    pub fn cancel(&mut self) {
        self.phase = CheckoutPhase::Idle;
    }

    /// Hide the success banner.
    pub fn dismiss_banner(&mut self) {
        self.success_banner = false;
    }
}
