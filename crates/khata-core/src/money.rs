//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In the browser forms:                                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing 40 invoice lines at ₹19.99 drifts by fractions of a paisa     │
//! │  and the printed total disagrees with the backend.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise / cents)                     │
//! │    ₹19.99 = 1999 paise, exact under addition                           │
//! │    Rounding happens only at multiplication, half away from zero        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::money::Money;
//!
//! let rate = Money::from_cents(1099);           // 10.99
//! let doubled = rate * 2;                       // 21.98
//! let total = rate + Money::from_cents(500);    // 15.99
//! assert_eq!(total.cents(), 1599);
//!
//! // Form input arrives as major-unit text
//! assert_eq!(Money::parse_major("12.5"), Some(Money::from_cents(1250)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Quantity, TaxRate};

/// Minor units per major unit. Every supported currency prints two decimals.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Fixed-point helpers
// =============================================================================

/// Integer division rounding half away from zero.
///
/// `denominator` must be positive.
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Narrows an intermediate result, saturating at the `i64` bounds.
pub(crate) fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Parses plain decimal text into a fixed-point integer with `scale` digits.
///
/// Accepts an optional sign, digits, and an optional fraction (`"12"`,
/// `"-3.5"`, `".25"`, `"7."`). Digits beyond `scale` round half away from
/// zero. Grouping separators and exponents are rejected.
pub(crate) fn parse_fixed(text: &str, scale: u32) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut value: i128 = 0;
    for b in whole.bytes() {
        value = value.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
    }

    let mut frac_digits = frac.bytes();
    for _ in 0..scale {
        let digit = frac_digits.next().map(|b| i128::from(b - b'0')).unwrap_or(0);
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    // Only the first dropped digit decides half-up rounding.
    if matches!(frac_digits.next(), Some(b) if b >= b'5') {
        value += 1;
    }

    let value = if negative { -value } else { value };
    i64::try_from(value).ok()
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR, cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances can go negative (overpaid documents, refunds)
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde as integer minor units**: the wire never carries floats
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.rate × Quantity ──► line gross ── discount ──► line amount   │
/// │                                                             │           │
/// │                                            TaxRate ──► line tax         │
/// │                                                             │           │
/// │  subTotal + totalTax + otherCharges ──► netTotal ──► balanceDue        │
/// │                                                             │           │
/// │                           format_currency / amount_in_words ▼           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Parses major-unit text such as `"1250.75"`.
    ///
    /// Returns `None` for anything that is not a plain decimal number.
    /// A third decimal rounds half away from zero (`"0.125"` is 13 paise).
    pub fn parse_major(text: &str) -> Option<Self> {
        parse_fixed(text, 2).map(Money)
    }

    /// Converts a major-unit float (a JSON number from a form) to Money.
    ///
    /// Non-finite input is zero.
    pub fn from_major_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Money::zero();
        }
        // `as` saturates at the i64 bounds
        Money((value * MINOR_PER_MAJOR as f64).round() as i64)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole major units, truncated toward zero.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor part (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Whole major units rounded down, as used by the amount-in-words line.
    ///
    /// Negative values floor to zero since words are only printed for
    /// non-negative totals.
    #[inline]
    pub const fn floor_major(&self) -> u64 {
        if self.0 <= 0 {
            0
        } else {
            (self.0 / MINOR_PER_MAJOR) as u64
        }
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

    /// Clamps negative values to zero.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-40).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(40).non_negative().cents(), 40);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Calculates tax at `rate`, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math on basis points: `amount * bps / 10000`, widened to
    /// i128 so large amounts never overflow.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    /// use khata_core::types::TaxRate;
    ///
    /// let amount = Money::from_cents(1000); // 10.00
    /// let tax = amount.calculate_tax(TaxRate::from_bps(825)); // 8.25%
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = div_round_half_away(i128::from(self.0) * i128::from(rate.bps()), 10_000);
        Money(saturate(tax))
    }

    /// Multiplies a unit rate by a (possibly fractional) quantity.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    /// use khata_core::types::Quantity;
    ///
    /// let rate = Money::from_cents(4000); // 40.00 per kg
    /// let qty = Quantity::parse("12.345").unwrap();
    /// // 40.00 × 12.345 = 493.80
    /// assert_eq!(rate.multiply_quantity(qty).cents(), 49380);
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        let product = i128::from(self.0) * i128::from(qty.thousandths());
        Money(saturate(div_round_half_away(product, 1000)))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`1234.50`, `-5.50`).
///
/// Currency symbols and digit grouping belong to [`crate::currency`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02}",
            sign,
            self.major().unsigned_abs(),
            self.minor_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
