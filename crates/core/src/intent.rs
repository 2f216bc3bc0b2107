//! Named cart mutations.
//!
//! The view layer never edits a [`Cart`](crate::Cart) in place. Each user
//! action is turned into a `CartIntent` and handed to
//! [`Cart::dispatch`](crate::Cart::dispatch).

use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;

/// A cart mutation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartIntent {
    /// Add a product, or bump the quantity of the existing line.
    AddItem(CartLineItem),
    /// Set a line's quantity. Zero removes the line.
    UpdateQuantity { name: String, quantity: u32 },
    /// Delete a line if present.
    RemoveItem { name: String },
    /// Empty the cart.
    ClearCart,
}

impl CartIntent {
    /// The "+" button: one more unit of `item`.
    ///
    /// Saturates at `u32::MAX`.
    #[must_use]
    pub fn increment(item: &CartLineItem) -> Self {
        Self::UpdateQuantity {
            name: item.name.clone(),
            quantity: item.quantity().saturating_add(1),
        }
    }

    /// The "-" button: one less unit, or removal at quantity 1.
    #[must_use]
    pub fn decrement(item: &CartLineItem) -> Self {
        if item.quantity() > 1 {
            Self::UpdateQuantity {
                name: item.name.clone(),
                quantity: item.quantity() - 1,
            }
        } else {
            Self::RemoveItem {
                name: item.name.clone(),
            }
        }
    }

    /// The remove control.
    #[must_use]
    pub fn remove(item: &CartLineItem) -> Self {
        Self::RemoveItem {
            name: item.name.clone(),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddItem(_) => "add_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::RemoveItem { .. } => "remove_item",
            Self::ClearCart => "clear_cart",
        }
    }
}
