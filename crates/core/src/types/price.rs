//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing or combining prices.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// Arithmetic overflowed the decimal range.
    #[error("price arithmetic overflow")]
    Overflow,
}

/// A non-negative monetary amount in New Taiwan dollars.
///
/// All storefront and back-office money flows through this type; raw decimals
/// from client input are validated at the boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the multiplication overflows.
    pub fn checked_mul_qty(&self, qty: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(qty))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Add two prices.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the addition overflows.
    pub fn checked_add(&self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Format for display (e.g., "NT$1,280" is left to the frontend; this is
    /// the plain "NT$1280.00" form used in documents and emails).
    #[must_use]
    pub fn display(&self) -> String {
        format!("NT${:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained non-negative by CHECK constraints
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-100, 2)), Err(PriceError::Negative));
        assert!(Price::new(Decimal::new(100, 2)).is_ok());
    }

    #[test]
    fn test_mul_qty() {
        let unit = Price::new(Decimal::new(25050, 2)).unwrap(); // 250.50
        let total = unit.checked_mul_qty(3).unwrap();
        assert_eq!(total.amount(), Decimal::new(75150, 2));
    }

    #[test]
    fn test_add() {
        let a = Price::new(Decimal::new(100, 0)).unwrap();
        let b = Price::new(Decimal::new(80, 0)).unwrap();
        assert_eq!(a.checked_add(b).unwrap().amount(), Decimal::new(180, 0));
    }

    #[test]
    fn test_display() {
        let p = Price::new(Decimal::new(128000, 2)).unwrap();
        assert_eq!(p.display(), "NT$1280.00");
        assert_eq!(Price::ZERO.display(), "NT$0.00");
    }
}
