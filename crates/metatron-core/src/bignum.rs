//! Unbounded non-negative decimal integers.
//!
//! [`BigCount`] stores its value as ASCII decimal digits, most significant
//! first. Invariants, upheld by every constructor and operation:
//! - at least one digit;
//! - no leading zero, except the value zero itself, which is `"0"`.
//!
//! Arithmetic is schoolbook: `O(n*m)` multiplication and `O(max(n, m))`
//! addition. Counter values grow by at most a few digits per reporting
//! window, so nothing faster is warranted.

use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

use crate::error::BignumError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigCount {
    digits: String,
}

impl BigCount {
    pub fn zero() -> Self {
        Self {
            digits: "0".to_string(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    /// Number of decimal digits (1 for zero).
    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Build from raw digit values (0..=9), most significant first,
    /// stripping leading zeros.
    fn from_digit_values(values: &[u8]) -> Self {
        let digits: String = values
            .iter()
            .skip_while(|&&d| d == 0)
            .map(|&d| char::from(b'0' + d))
            .collect();
        if digits.is_empty() {
            Self::zero()
        } else {
            Self { digits }
        }
    }

    /// Schoolbook product.
    pub fn times(&self, other: &BigCount) -> BigCount {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let a = self.digits.as_bytes();
        let b = other.digits.as_bytes();
        // Column accumulators; each column stays far below u32::MAX because
        // carries are pushed left on every step.
        let mut cols = vec![0u32; a.len() + b.len()];

        for i in (0..a.len()).rev() {
            let da = u32::from(a[i] - b'0');
            for j in (0..b.len()).rev() {
                let db = u32::from(b[j] - b'0');
                let sum = da * db + cols[i + j + 1];
                cols[i + j + 1] = sum % 10;
                cols[i + j] += sum / 10;
            }
        }

        let values: Vec<u8> = cols.into_iter().map(|c| c as u8).collect();
        Self::from_digit_values(&values)
    }

    /// Schoolbook sum with carry.
    pub fn plus(&self, other: &BigCount) -> BigCount {
        let a = self.digits.as_bytes();
        let b = other.digits.as_bytes();
        let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
        let mut ia = a.iter().rev();
        let mut ib = b.iter().rev();
        let mut carry = 0u8;

        loop {
            let (x, y) = (ia.next(), ib.next());
            if x.is_none() && y.is_none() && carry == 0 {
                break;
            }
            let sum = carry + x.map_or(0, |d| d - b'0') + y.map_or(0, |d| d - b'0');
            out.push(sum % 10);
            carry = sum / 10;
        }

        out.reverse();
        Self::from_digit_values(&out)
    }

    /// Product with a machine integer.
    pub fn times_u64(&self, factor: u64) -> BigCount {
        self.times(&BigCount::from(factor))
    }
}

impl Default for BigCount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for BigCount {
    fn from(value: u64) -> Self {
        Self {
            digits: value.to_string(),
        }
    }
}

impl FromStr for BigCount {
    type Err = BignumError;

    /// Parse a decimal digit string. Leading zeros are accepted and dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(BignumError::Empty);
        }
        if let Some((index, found)) = s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
            return Err(BignumError::InvalidDigit { index, found });
        }
        let trimmed = s.trim_start_matches('0');
        if trimmed.is_empty() {
            Ok(Self::zero())
        } else {
            Ok(Self {
                digits: trimmed.to_string(),
            })
        }
    }
}

impl fmt::Display for BigCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl Add<&BigCount> for &BigCount {
    type Output = BigCount;

    fn add(self, rhs: &BigCount) -> BigCount {
        self.plus(rhs)
    }
}

impl AddAssign<&BigCount> for BigCount {
    fn add_assign(&mut self, rhs: &BigCount) {
        *self = self.plus(rhs);
    }
}

impl Mul<&BigCount> for &BigCount {
    type Output = BigCount;

    fn mul(self, rhs: &BigCount) -> BigCount {
        self.times(rhs)
    }
}

/// `multiply(a, b)` over digit strings.
pub fn multiply(a: &str, b: &str) -> Result<String, BignumError> {
    let (a, b): (BigCount, BigCount) = (a.parse()?, b.parse()?);
    Ok(a.times(&b).digits)
}

/// `add(a, b)` over digit strings.
pub fn add(a: &str, b: &str) -> Result<String, BignumError> {
    let (a, b): (BigCount, BigCount) = (a.parse()?, b.parse()?);
    Ok(a.plus(&b).digits)
}
