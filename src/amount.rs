//! Integer money amounts in minor units.
//!
//! Amounts carry no currency or scale; `Amount(150)` is simply `$150` in
//! whatever unit the input uses. Arithmetic is checked: callers decide what
//! an overflow means.

use serde::Serialize;
use std::fmt;

/// A signed money amount.
///
/// Displays as `$N` for non-negative values and `-$N` for negative ones.
///
/// # Examples
///
/// ```
/// use credit_summary::Amount;
///
/// assert_eq!(Amount::new(200).to_string(), "$200");
/// assert_eq!(Amount::new(-50).to_string(), "-$50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Amount(0);

    pub const fn new(value: i64) -> Self {
        Amount(value)
    }

    /// Returns the raw signed value.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Returns `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", self.0.unsigned_abs())
        } else {
            write!(f, "${}", self.0)
        }
    }
}
