//! Cart state container.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLineItem`]s keyed by item
//! name. Quantities are [`NonZeroU32`], so a line can never be stored with
//! quantity zero: every transition that would reach zero removes the line
//! instead.
//!
//! Totals are derived on demand and never cached.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::intent::CartIntent;
use crate::types::{CurrencyCode, Price};

/// Errors returned by cart transitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No line item with this name is in the cart.
    #[error("item not in cart: {0}")]
    ItemNotFound(String),
    /// The quantity would exceed `u32::MAX`, or a total would no longer be
    /// representable.
    #[error("quantity overflow for item: {0}")]
    QuantityOverflow(String),
    /// The item is priced in a different currency than the cart.
    #[error("item {name} is priced in {found}, cart uses {expected}")]
    CurrencyMismatch {
        /// Name of the rejected item.
        name: String,
        /// The cart's currency code.
        expected: &'static str,
        /// The item's currency code.
        found: &'static str,
    },
}

/// One product entry in the cart with its own quantity and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Display name; unique within a cart.
    pub name: String,
    /// Image URL or path.
    pub image: String,
    /// Unit price.
    pub cost: Price,
    /// Number of units, always at least one.
    pub quantity: NonZeroU32,
}

impl CartLineItem {
    /// Create a line item with quantity 1.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>, cost: Price) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            cost,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Replace the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: NonZeroU32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Quantity as a plain integer.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Quantity times unit price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.cost.times(self.quantity.get())
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    currency_code: CurrencyCode,
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart priced in `currency_code`.
    #[must_use]
    pub const fn new(currency_code: CurrencyCode) -> Self {
        Self {
            currency_code,
            items: Vec::new(),
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The cart's currency.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checkout is only offered for a non-empty cart.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        !self.is_empty()
    }

    /// Look up a line item by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Whether a line item with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut CartLineItem, CartError> {
        self.items
            .iter_mut()
            .find(|item| item.name == name)
            .ok_or_else(|| CartError::ItemNotFound(name.to_owned()))
    }

    /// Add an item, or raise the quantity of the existing line with the same
    /// name by the item's quantity.
    ///
    /// Returns the resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the item is not priced in
    /// the cart's currency, or [`CartError::QuantityOverflow`].
    pub fn add_item(&mut self, item: CartLineItem) -> Result<NonZeroU32, CartError> {
        if item.cost.currency_code != self.currency_code {
            return Err(CartError::CurrencyMismatch {
                name: item.name,
                expected: self.currency_code.code(),
                found: item.cost.currency_code.code(),
            });
        }

        if let Some(existing) = self.get(&item.name) {
            let quantity = existing
                .quantity
                .checked_add(item.quantity.get())
                .ok_or_else(|| CartError::QuantityOverflow(item.name.clone()))?;
            return self.replace_quantity(&item.name, quantity);
        }

        let quantity = item.quantity;
        let name = item.name.clone();
        self.items.push(item);
        if self.checked_grand_total().is_none() {
            self.items.pop();
            return Err(CartError::QuantityOverflow(name));
        }
        Ok(quantity)
    }

    /// Raise the quantity of `name` by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] or [`CartError::QuantityOverflow`].
    pub fn increment(&mut self, name: &str) -> Result<NonZeroU32, CartError> {
        let quantity = self
            .get_mut(name)?
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::QuantityOverflow(name.to_owned()))?;
        self.replace_quantity(name, quantity)
    }

    /// Lower the quantity of `name` by one, removing the line at quantity 1.
    ///
    /// Returns the new quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`].
    pub fn decrement(&mut self, name: &str) -> Result<Option<NonZeroU32>, CartError> {
        let current = self.get_mut(name)?.quantity.get();
        self.set_quantity(name, current - 1)
    }

    /// Set the quantity of `name`. Zero removes the line.
    ///
    /// Returns the new quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] or [`CartError::QuantityOverflow`].
    pub fn set_quantity(
        &mut self,
        name: &str,
        quantity: u32,
    ) -> Result<Option<NonZeroU32>, CartError> {
        match NonZeroU32::new(quantity) {
            Some(quantity) => self.replace_quantity(name, quantity).map(Some),
            None => {
                self.get_mut(name)?;
                self.remove(name);
                Ok(None)
            }
        }
    }

    /// Set a line's quantity, rolling back if any total would overflow.
    fn replace_quantity(
        &mut self,
        name: &str,
        quantity: NonZeroU32,
    ) -> Result<NonZeroU32, CartError> {
        let item = self.get_mut(name)?;
        let previous = std::mem::replace(&mut item.quantity, quantity);
        if self.checked_grand_total().is_none() {
            if let Ok(item) = self.get_mut(name) {
                item.quantity = previous;
            }
            return Err(CartError::QuantityOverflow(name.to_owned()));
        }
        Ok(quantity)
    }

    /// Grand total with overflow checks on every line and on the sum.
    fn checked_grand_total(&self) -> Option<Price> {
        self.items
            .iter()
            .try_fold(Price::zero(self.currency_code), |acc, item| {
                acc.checked_add(&item.cost.checked_times(item.quantity())?)
            })
    }

    /// Delete the line for `name`. Absent names are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<CartLineItem> {
        let index = self.items.iter().position(|item| item.name == name)?;
        Some(self.items.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of every line total. Zero for an empty cart.
    ///
    /// Cart transitions reject any change whose total would overflow, so
    /// this never saturates for a cart built through them.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.items
            .iter()
            .map(CartLineItem::line_total)
            .fold(Price::zero(self.currency_code), |acc, line| {
                Price::new(acc.amount.saturating_add(line.amount), acc.currency_code)
            })
    }

    /// Sum of every line's quantity.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity()))
    }

    /// Apply a named mutation.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying transition. `RemoveItem` and
    /// `ClearCart` never fail.
    pub fn dispatch(&mut self, intent: CartIntent) -> Result<(), CartError> {
        match intent {
            CartIntent::AddItem(item) => self.add_item(item).map(|_| ()),
            CartIntent::UpdateQuantity { name, quantity } => {
                self.set_quantity(&name, quantity).map(|_| ())
            }
            CartIntent::RemoveItem { name } => {
                self.remove(&name);
                Ok(())
            }
            CartIntent::ClearCart => {
                self.clear();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(name: &str, cost: &str, quantity: u32) -> CartLineItem {
        CartLineItem::new(name, format!("/static/images/{name}.svg"), Price::parse(cost).unwrap())
            .with_quantity(NonZeroU32::new(quantity).unwrap())
    }

    fn flowers() -> Cart {
        let mut cart = Cart::default();
        cart.add_item(item("Rose", "$15", 3)).unwrap();
        cart.add_item(item("Tulip", "$10", 2)).unwrap();
        cart
    }

    #[test]
    fn test_grand_total_of_scenario_cart() {
        let cart = flowers();
        assert_eq!(cart.grand_total().to_string(), "$65.00");
    }

    #[test]
    fn test_decrement_twice_removes_tulip() {
        let mut cart = flowers();
        assert_eq!(cart.decrement("Tulip").unwrap(), NonZeroU32::new(1));
        assert_eq!(cart.decrement("Tulip").unwrap(), None);
        assert!(!cart.contains("Tulip"));
        assert_eq!(cart.grand_total().to_string(), "$45.00");
    }

    #[test]
    fn test_grand_total_equals_sum_of_line_totals() {
        let mut cart = flowers();
        cart.add_item(item("Fern", "$7.333", 3)).unwrap();
        cart.add_item(item("Moss", "$0.10", 7)).unwrap();

        let lines: Decimal = cart.items().iter().map(|i| i.line_total().amount).sum();
        assert_eq!(cart.grand_total().amount, lines);
        assert_eq!(cart.grand_total().rounded(), lines.round_dp(2));
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::default();
        assert!(cart.grand_total().is_zero());
        assert_eq!(cart.grand_total().to_string(), "$0.00");
    }

    #[test]
    fn test_line_total() {
        let rose = item("Rose", "$15", 3);
        assert_eq!(rose.line_total().to_string(), "$45.00");
    }

    #[test]
    fn test_decrement_above_one_keeps_item() {
        let mut cart = flowers();
        assert_eq!(cart.decrement("Rose").unwrap(), NonZeroU32::new(2));
        assert_eq!(cart.get("Rose").unwrap().quantity(), 2);
    }

    #[test]
    fn test_decrement_missing_item() {
        let mut cart = flowers();
        assert_eq!(
            cart.decrement("Orchid"),
            Err(CartError::ItemNotFound("Orchid".to_string()))
        );
    }

    #[test]
    fn test_increment() {
        let mut cart = flowers();
        assert_eq!(cart.increment("Tulip").unwrap().get(), 3);
        assert_eq!(cart.grand_total().to_string(), "$75.00");
    }

    #[test]
    fn test_increment_missing_item() {
        let mut cart = Cart::default();
        assert!(matches!(
            cart.increment("Rose"),
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_increment_overflow() {
        let mut cart = Cart::default();
        cart.add_item(item("Rose", "$1", u32::MAX)).unwrap();
        assert!(matches!(
            cart.increment("Rose"),
            Err(CartError::QuantityOverflow(_))
        ));
        assert_eq!(cart.get("Rose").unwrap().quantity(), u32::MAX);
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let huge = Price::new(Decimal::MAX, CurrencyCode::USD);
        let mut cart = Cart::default();
        cart.add_item(CartLineItem::new("Bonsai", "", huge)).unwrap();

        assert!(matches!(
            cart.increment("Bonsai"),
            Err(CartError::QuantityOverflow(_))
        ));
        assert!(matches!(
            cart.set_quantity("Bonsai", 1000),
            Err(CartError::QuantityOverflow(_))
        ));
        assert_eq!(cart.get("Bonsai").unwrap().quantity(), 1);

        assert!(matches!(
            cart.add_item(CartLineItem::new("Fern", "", huge)),
            Err(CartError::QuantityOverflow(_))
        ));
        assert!(!cart.contains("Fern"));
        assert_eq!(cart.grand_total(), huge);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = flowers();
        assert!(cart.remove("Rose").is_some());
        let after_first = cart.clone();
        assert!(cart.remove("Rose").is_none());
        assert_eq!(cart, after_first);
    }

    #[test]
    fn test_clear_then_total_is_zero() {
        let mut cart = flowers();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.grand_total().is_zero());
    }

    #[test]
    fn test_can_checkout_iff_non_empty() {
        let mut cart = Cart::default();
        assert!(!cart.can_checkout());

        cart.add_item(item("A", "$10", 2)).unwrap();
        assert!(cart.can_checkout());
    }

    #[test]
    fn test_add_existing_item_raises_quantity() {
        let mut cart = flowers();
        let quantity = cart.add_item(item("Rose", "$15", 1)).unwrap();
        assert_eq!(quantity.get(), 4);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let cart = flowers();
        let names: Vec<_> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Rose", "Tulip"]);
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let mut cart = Cart::default();
        let euro = CartLineItem::new(
            "Lavender",
            "",
            Price::new(Decimal::new(5, 0), CurrencyCode::EUR),
        );
        assert!(matches!(
            cart.add_item(euro),
            Err(CartError::CurrencyMismatch { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = flowers();
        assert_eq!(cart.set_quantity("Rose", 0).unwrap(), None);
        assert!(!cart.contains("Rose"));
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(flowers().total_quantity(), 5);
        assert_eq!(Cart::default().total_quantity(), 0);
    }

    #[test]
    fn test_dispatch_intents() {
        let mut cart = flowers();

        cart.dispatch(CartIntent::UpdateQuantity {
            name: "Rose".to_string(),
            quantity: 1,
        })
        .unwrap();
        assert_eq!(cart.get("Rose").unwrap().quantity(), 1);

        cart.dispatch(CartIntent::RemoveItem {
            name: "Tulip".to_string(),
        })
        .unwrap();
        assert!(!cart.contains("Tulip"));

        cart.dispatch(CartIntent::ClearCart).unwrap();
        assert!(cart.is_empty());
    }
}
