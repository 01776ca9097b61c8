//! Starknet field elements and entry point selectors.
//!
//! A felt is an element of the prime field `p = 2^251 + 17·2^192 + 1`.
//! It is stored as 32 big-endian bytes and rendered as minimal lowercase hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

use crate::error::SdkError;

/// Big-endian bytes of the field prime.
const FIELD_PRIME: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// A Starknet field element.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt([u8; 32]);

impl Felt {
    pub const ZERO: Felt = Felt([0u8; 32]);

    /// Parse a hex string, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, SdkError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(SdkError::InvalidFelt(format!("empty hex string '{s}'")));
        }
        if digits.len() > 64 {
            return Err(SdkError::InvalidFelt(format!(
                "'{s}' has {} hex digits, at most 64 allowed",
                digits.len()
            )));
        }

        let padded = format!("{digits:0>64}");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| SdkError::InvalidFelt(format!("'{s}': {e}")))?;

        Self::from_bytes_be(bytes)
    }

    /// Build from big-endian bytes. Fails if the value is not below the field prime.
    pub fn from_bytes_be(bytes: [u8; 32]) -> Result<Self, SdkError> {
        if bytes >= FIELD_PRIME {
            return Err(SdkError::InvalidFelt(format!(
                "0x{} is out of field range",
                hex::encode(bytes)
            )));
        }
        Ok(Self(bytes))
    }

    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0
    }

    /// The value as `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }
}

impl From<u64> for Felt {
    fn from(v: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&v.to_be_bytes());
        Self(bytes)
    }
}

impl FromStr for Felt {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = hex::encode(self.0);
        let trimmed = encoded.trim_start_matches('0');
        if trimmed.is_empty() {
            write!(f, "0x0")
        } else {
            write!(f, "0x{trimmed}")
        }
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({self})")
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Felt::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Entry point selector for a function name: keccak256 truncated to 250 bits.
pub fn selector_from_name(name: &str) -> Felt {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(name.as_bytes());
    hasher.finalize(&mut output);
    output[0] &= 0x03;
    Felt(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_address() {
        let f = Felt::from_hex("0x0516d0acb6341dcc567e85dc90c8f64e0c33d3daba0a310157d6bba0656c8769")
            .unwrap();
        assert_eq!(
            f.to_string(),
            "0x516d0acb6341dcc567e85dc90c8f64e0c33d3daba0a310157d6bba0656c8769"
        );
    }

    #[test]
    fn short_and_unprefixed_hex() {
        assert_eq!(Felt::from_hex("0x3").unwrap().to_u64(), Some(3));
        assert_eq!(Felt::from_hex("ff").unwrap().to_u64(), Some(255));
        assert_eq!(Felt::from_hex("0x0").unwrap(), Felt::ZERO);
        assert_eq!(Felt::ZERO.to_string(), "0x0");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Felt::from_hex("").is_err());
        assert!(Felt::from_hex("0x").is_err());
        assert!(Felt::from_hex("0xzz").is_err());
        assert!(Felt::from_hex(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn rejects_values_outside_field() {
        let prime = "0x800000000000011000000000000000000000000000000000000000000000001";
        assert!(Felt::from_hex(prime).is_err());
        let max = "0x800000000000011000000000000000000000000000000000000000000000000";
        assert!(Felt::from_hex(max).is_ok());
    }

    #[test]
    fn large_values_do_not_fit_u64() {
        let f = Felt::from_hex("0x10000000000000000").unwrap();
        assert_eq!(f.to_u64(), None);
        assert_eq!(Felt::from(u64::MAX).to_u64(), Some(u64::MAX));
    }

    #[test]
    fn transfer_selector() {
        assert_eq!(
            selector_from_name("transfer").to_string(),
            "0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e"
        );
    }

    #[test]
    fn serde_as_hex_string() {
        let f = Felt::from(42u64);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, "\"0x2a\"");
        let back: Felt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
