//! Session cart.
//!
//! The cart is stored in the visitor's session, not in the database. Prices
//! are never trusted from the cart: checkout reprices every line against the
//! current catalog.

use serde::{Deserialize, Serialize};

use jademart_core::ProductId;

/// Maximum distinct lines a cart may hold.
pub const MAX_CART_LINES: usize = 50;

/// Maximum quantity per line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// A single cart line: product and quantity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The session cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartLine>,
}

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,
    #[error("cart is full (max {MAX_CART_LINES} lines)")]
    Full,
    #[error("product is not in the cart")]
    LineNotFound,
}

impl Cart {
    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if the quantity is zero or the
    /// merged line would exceed the per-line cap, and `CartError::Full` when
    /// the cart already holds the maximum number of distinct lines.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(line) = self.items.iter_mut().find(|l| l.product_id == product_id) {
            let merged = line.quantity.saturating_add(quantity);
            if merged > MAX_LINE_QUANTITY {
                return Err(CartError::InvalidQuantity);
            }
            line.quantity = merged;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_LINES {
            return Err(CartError::Full);
        }

        self.items.push(CartLine {
            product_id,
            quantity,
        });
        Ok(())
    }

    /// Set a line's quantity exactly. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the product isn't in the cart,
    /// or `CartError::InvalidQuantity` above the per-line cap.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        let Some(index) = self.items.iter().position(|l| l.product_id == product_id) else {
            return Err(CartError::LineNotFound);
        };

        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the product isn't in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let Some(index) = self.items.iter().position(|l| l.product_id == product_id) else {
            return Err(CartError::LineNotFound);
        };
        self.items.remove(index);
        Ok(())
    }

    /// True if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2).unwrap();
        cart.add(ProductId::new(1), 3).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn test_add_rejects_zero_and_overflow() {
        let mut cart = Cart::default();
        assert_eq!(
            cart.add(ProductId::new(1), 0),
            Err(CartError::InvalidQuantity)
        );
        cart.add(ProductId::new(1), MAX_LINE_QUANTITY).unwrap();
        assert_eq!(
            cart.add(ProductId::new(1), 1),
            Err(CartError::InvalidQuantity)
        );
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(7), 2).unwrap();
        cart.set_quantity(ProductId::new(7), 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_line() {
        let mut cart = Cart::default();
        assert_eq!(cart.remove(ProductId::new(9)), Err(CartError::LineNotFound));
    }

    #[test]
    fn test_cart_line_cap() {
        let mut cart = Cart::default();
        for i in 0..MAX_CART_LINES {
            cart.add(ProductId::new(i32::try_from(i).unwrap() + 1), 1)
                .unwrap();
        }
        assert_eq!(
            cart.add(ProductId::new(1000), 1),
            Err(CartError::Full)
        );
    }

    #[test]
    fn test_unit_count() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2).unwrap();
        cart.add(ProductId::new(2), 3).unwrap();
        assert_eq!(cart.unit_count(), 5);
    }
}
