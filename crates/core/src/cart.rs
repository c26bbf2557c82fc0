//! Client-side cart accumulator.
//!
//! A cart is an ordered list of prospective order lines. Adding the same
//! product twice yields two separate lines; nothing is merged. The cart is
//! serializable so the web crate can keep it in the visitor's session.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, StockId};

/// Error for a quantity below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quantity must be at least 1")]
pub struct QuantityError;

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single item.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError` if `value` is zero.
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(value).map(Self).ok_or(QuantityError)
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

/// The product fields a cart line needs for display and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Stock record the order will reference.
    pub id: StockId,
    /// Display name at the time it was added.
    pub name: String,
    /// Unit price at the time it was added.
    pub price: Price,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product: ProductRef,
    pub quantity: Quantity,
}

impl CartEntry {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity.get()
    }
}

/// Errors from cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// `remove` was called with an index past the end of the cart.
    #[error("cart index {index} out of range (cart has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An ordered list of cart entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a new line. Never merges with an existing line.
    pub fn add(&mut self, product: ProductRef, quantity: Quantity) {
        self.entries.push(CartEntry { product, quantity });
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::IndexOutOfRange` if there is no such line; the
    /// cart is left untouched.
    pub fn remove(&mut self, index: usize) -> Result<CartEntry, CartError> {
        if index >= self.entries.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Keep only the lines for which `keep` returns true, passing each
    /// line's current index.
    pub fn retain_indexed(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut index = 0;
        self.entries.retain(|_| {
            let kept = keep(index);
            index += 1;
            kept
        });
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity.get()).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> ProductRef {
        ProductRef {
            id: StockId::new(7),
            name: "Widget".to_string(),
            price: Price::from(100),
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).expect("positive quantity")
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError));
        assert_eq!(Quantity::new(3).map(Quantity::get), Ok(3));
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn test_same_product_is_not_merged() {
        let mut cart = Cart::new();
        cart.add(widget(), qty(2));
        cart.add(widget(), qty(1));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.entries()[0].quantity.get(), 2);
        assert_eq!(cart.entries()[1].quantity.get(), 1);
        assert_eq!(cart.total(), Price::from(300));
        assert_eq!(cart.total().to_string(), "RWF 300");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_then_remove_restores_contents() {
        let mut cart = Cart::new();
        cart.add(widget(), qty(1));
        let before = cart.clone();

        cart.add(widget(), qty(4));
        let removed = cart.remove(1).expect("index in range");

        assert_eq!(removed.quantity.get(), 4);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_out_of_range_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(widget(), qty(1));
        let before = cart.clone();

        assert_eq!(
            cart.remove(5),
            Err(CartError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_retain_indexed() {
        let mut cart = Cart::new();
        for n in 1..=4 {
            cart.add(widget(), qty(n));
        }
        cart.retain_indexed(|i| i % 2 == 1);

        let quantities: Vec<u32> = cart.entries().iter().map(|e| e.quantity.get()).collect();
        assert_eq!(quantities, vec![2, 4]);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }
}
