//! QuantumCoin addresses
//!
//! Canonical format: `qtc1q` followed by the first 20 bytes of the public
//! key, lowercase hex (45 characters total). Validation accepts any
//! `qtc1q` + 39..=59 characters of `[a-z0-9]`, which is what the node
//! accepts as an address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::keys::PublicKey;

/// Human-readable prefix of every address
pub const ADDRESS_PREFIX: &str = "qtc1q";

/// Public key hex characters kept in a derived address (20 bytes)
pub const ADDRESS_PAYLOAD_HEX_LEN: usize = 40;

/// Accepted payload length range after the prefix
pub const MIN_PAYLOAD_LEN: usize = 39;
pub const MAX_PAYLOAD_LEN: usize = 59;

/// Addresses longer than this are shortened by [`format_address`]
const DISPLAY_FULL_MAX: usize = 20;
const DISPLAY_EDGE: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address must start with \"qtc1q\"")]
    MissingPrefix,
    #[error("Address payload length {0} outside 39..=59")]
    InvalidLength(usize),
    #[error("Address contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A validated QuantumCoin address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Derive the receiving address of a public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let hex = public_key.as_hex();
        let payload = hex.get(..ADDRESS_PAYLOAD_HEX_LEN).unwrap_or(hex);
        Self(format!("{}{}", ADDRESS_PREFIX, payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display.
    pub fn formatted(&self) -> String {
        format_address(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_address(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        check_address(&s)?;
        Ok(Self(s))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_address(s: &str) -> Result<(), AddressError> {
    let payload = s
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or(AddressError::MissingPrefix)?;

    if let Some(c) = payload
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
    {
        return Err(AddressError::InvalidCharacter(c));
    }

    // All ASCII past this point, so bytes == chars
    let len = payload.len();
    if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&len) {
        return Err(AddressError::InvalidLength(len));
    }

    Ok(())
}

/// Whether `address` is a well-formed QuantumCoin address.
pub fn is_valid_address(address: &str) -> bool {
    check_address(address).is_ok()
}

/// Collapse long addresses to `first8...last8` for display.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= DISPLAY_FULL_MAX {
        return address.to_string();
    }
    let head: String = chars[..DISPLAY_EDGE].iter().collect();
    let tail: String = chars[chars.len() - DISPLAY_EDGE..].iter().collect();
    format!("{}...{}", head, tail)
}
