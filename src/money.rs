//! Decimal money type displayed with 2 decimal places.
//!
//! Balances keep the full precision of every amount applied to them; rounding
//! happens only when a balance is rendered.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::ops::{AddAssign, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Why an amount string was rejected.
#[derive(Error, Debug)]
pub enum ParseMoneyError {
    /// Anything other than an optional sign, digits and at most one decimal point
    #[error("expected a plain decimal number such as 12.50")]
    Syntax,

    /// Well-formed but outside what `rust_decimal` can represent
    #[error(transparent)]
    Decimal(#[from] rust_decimal::Error),
}

/// A signed decimal amount rendered with exactly 2 decimal places.
///
/// Arithmetic saturates at the bounds of `rust_decimal::Decimal` instead of
/// panicking, so ledger operations stay total.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use bank_server::Money;
///
/// let amount = Money::from_str("10.555").unwrap();
/// assert_eq!(amount.to_string(), "10.56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places used for display.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// The balance rounded half away from zero to the display scale.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(Self::DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Accepts `[+-]digits[.digits]` with surrounding whitespace.
    ///
    /// Digit separators (`1_000`) and exponents (`1e3`) are rejected even
    /// though `rust_decimal` would take them.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !is_plain_decimal(trimmed) {
            return Err(ParseMoneyError::Syntax);
        }
        Ok(Money(Decimal::from_str(trimmed)?))
    }
}

fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rounded value has at most 2 places; the precision pads the rest.
        write!(f, "{:.2}", self.rounded())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}
