//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! rounding modes used at the ledger boundary.
//!
//! ## Why Integer Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A settlement statement is a ledger: every line must sum exactly.       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Decimal Intermediates                    │
//! │    • Ledger amounts are i64 cents — addition/subtraction is exact       │
//! │    • Calculations (rates, daily prorations) run in rust_decimal         │
//! │    • Rounding happens ONCE, when a Decimal becomes Money                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use closewise_core::money::{Money, RoundingMode};
//! use rust_decimal_macros::dec;
//!
//! let fee = Money::from_cents(5600); // $56.00
//! let tax = Money::from_decimal(dec!(2999.995), RoundingMode::Cents); // $3000.00
//! assert_eq!((fee + tax).cents(), 305_600);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Rounding Mode
// =============================================================================

/// How a raw calculated amount is rounded when it becomes a ledger amount.
///
/// Jurisdictions differ: most settlement statements carry cents, but some
/// proration customs round each share to whole dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round to the nearest cent (half away from zero).
    Cents,
    /// Round to the nearest whole dollar (half away from zero).
    WholeDollars,
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::Cents => write!(f, "cents"),
            RoundingMode::WholeDollars => write!(f, "whole_dollars"),
        }
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: net figures and signed subtotals can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every amount on a closing statement flows through this type; `Decimal`
/// appears only upstream of the single rounding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    ///
    /// ## Example
    /// ```rust
    /// use closewise_core::money::Money;
    ///
    /// let price = Money::from_dollars(300_000);
    /// assert_eq!(price.cents(), 30_000_000);
    /// ```
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Converts an exact decimal dollar amount into Money, rounding per the
    /// given mode. Half-way values round away from zero, matching how
    /// settlement software rounds `$0.825` up to `$0.83`.
    ///
    /// This is the ONLY place a calculated amount loses precision; callers
    /// must not round before reaching this boundary.
    pub fn from_decimal(amount: Decimal, rounding: RoundingMode) -> Self {
        let cents = match rounding {
            RoundingMode::Cents => (amount * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            RoundingMode::WholeDollars => {
                amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    * Decimal::ONE_HUNDRED
            }
        };
        // Saturate rather than wrap on amounts beyond i64 cents.
        Money(cents.to_i64().unwrap_or(i64::MAX))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as an exact decimal dollar amount.
    ///
    /// Lossless: `Money::from_cents(1099).to_decimal()` is exactly `10.99`.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation (credits become signed negatives in category subtotals).
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
