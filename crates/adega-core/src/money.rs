//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale of 3 × R$ 19,90 must post exactly R$ 59,70 to the ledger,      │
//! │  and its cancellation must post exactly the same amount back.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1990 cents × 3 = 5970 cents, always                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use adega_core::money::Money;
//!
//! let price = Money::from_cents(1990); // R$ 19,90
//! let line = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line.cents(), 5970);
//! assert_eq!(line.to_string(), "R$ 59,70");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: ledger balances and differences can go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// Product.sale_price ──► SaleLine.unit_price ──► line_total ──► Sale.subtotal
///                                                                   │
///                                         Sale.discount ──► Sale.total
///                                                                   │
///                              FinancialTransaction.amount ◄────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole currency units (reais), truncated toward zero.
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional part (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use adega_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4590);
    /// assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::from_cents(9180)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    ///
    /// ```rust
    /// use adega_core::money::Money;
    ///
    /// let lines = [100, 250, 650].map(Money::from_cents);
    /// assert_eq!(Money::checked_sum(lines), Some(Money::from_cents(1000)));
    /// ```
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Formats the amount as a plain decimal number with the given separator.
    ///
    /// Used by exports, where the currency symbol is not wanted.
    ///
    /// ```rust
    /// use adega_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1250).format_decimal(','), "12,50");
    /// assert_eq!(Money::from_cents(-5).format_decimal('.'), "-0.05");
    /// ```
    pub fn format_decimal(&self, separator: char) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}{:02}",
            sign,
            self.whole_units().abs(),
            separator,
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Brazilian real formatting (`R$ 10,99`).
///
/// For debugging and exports. The SPA formats with its own locale rules.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R$ {},{:02}",
            sign,
            self.whole_units().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
