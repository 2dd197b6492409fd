//! Arbitrary-precision account balance.

use crate::ParseError;
use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;

/// An unsigned account balance with no upper bound.
///
/// The value is kept as a magnitude only; there is no sign and no host
/// byte order attached to it. [`Balance::to_be_bytes`] yields the minimal
/// big-endian magnitude used for the wire bignum form.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Balance(BigUint);

impl Balance {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Minimal big-endian magnitude. Zero has an empty magnitude.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            return Vec::new();
        }
        self.0.to_bytes_be()
    }

    /// Build a balance from a big-endian magnitude. Leading zero bytes are allowed.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(&self.0).ok()
    }

    /// The value as a `u128`, if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        u128::try_from(&self.0).ok()
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for Balance {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Balance {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance({})", self.0)
    }
}

impl FromStr for Balance {
    type Err = ParseError;

    /// Parse a decimal string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidBalance {
                input: s.to_string(),
            });
        }
        BigUint::from_str(s)
            .map(Self)
            .map_err(|_| ParseError::InvalidBalance {
                input: s.to_string(),
            })
    }
}
