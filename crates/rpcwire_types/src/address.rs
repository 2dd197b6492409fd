//! Fixed-width account identifier.

use crate::ParseError;
use std::fmt;
use std::str::FromStr;

/// A 160-bit account identifier.
///
/// On the wire this is always a 20-byte string, never a number, so byte
/// order never comes into play.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; Address::LEN]);

impl Address {
    /// Width of an address in bytes
    pub const LEN: usize = 20;

    pub const fn new(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice, returning `None` unless it is exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; Address::LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; Address::LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<[u8; Address::LEN]> for Address {
    fn from(bytes: [u8; Address::LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    /// Parse a hex address, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidAddress {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_slice(&bytes).ok_or_else(|| ParseError::InvalidAddress {
            input: s.to_string(),
            reason: format!("expected {} bytes, got {}", Address::LEN, bytes.len()),
        })
    }
}
