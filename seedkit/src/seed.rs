//! BIP39 seed implementation
//!
//! A seed is a 512-bit (64 bytes) value stretched from a mnemonic and used to
//! derive the BIP32 master key.

use core::fmt;
use core::str::FromStr;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

/// PBKDF2 rounds mandated by BIP39
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Seed errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Mnemonic text is empty
    #[error("cannot derive a seed from an empty mnemonic")]
    EmptyInput,
    /// Seeds are exactly 64 bytes
    #[error("invalid seed length: expected 64 bytes, got {0}")]
    InvalidLength(usize),
    /// Not a hex string
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// A BIP39 seed (512 bits / 64 bytes)
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    /// Create a new seed from bytes
    pub fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Stretch a mnemonic into a seed.
    ///
    /// PBKDF2-HMAC-SHA512 over the NFKD forms of the mnemonic and of
    /// `"mnemonic" + passphrase`, 2048 rounds. The mnemonic is not checked
    /// against a wordlist, callers validate it first.
    pub fn from_mnemonic(mnemonic: &str, passphrase: &str) -> Result<Self> {
        if mnemonic.trim().is_empty() {
            return Err(SeedError::EmptyInput.into());
        }

        let password: Zeroizing<String> = Zeroizing::new(mnemonic.nfkd().collect());
        let salt: Zeroizing<String> =
            Zeroizing::new("mnemonic".chars().chain(passphrase.nfkd()).collect());

        let mut bytes = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<sha2::Sha512>(
            password.as_bytes(),
            salt.as_bytes(),
            PBKDF2_ROUNDS,
            &mut bytes,
        );
        let seed = Self(bytes);
        bytes.zeroize();
        Ok(seed)
    }

    /// Create a seed from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 64 {
            return Err(SeedError::InvalidLength(slice.len()).into());
        }
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the seed as bytes
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Get the seed as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Create a seed from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|e| SeedError::InvalidHex(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    /// Check if the seed is all zeros (empty/invalid)
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl From<[u8; 64]> for Seed {
    fn from(bytes: [u8; 64]) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(***)")
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First and last 4 bytes only
        write!(f, "Seed({}...{})", hex::encode(&self.0[..4]), hex::encode(&self.0[60..]))
    }
}

impl FromStr for Seed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = Zeroizing::new(String::deserialize(deserializer)?);
        Seed::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_creation() {
        let bytes = [1u8; 64];
        let seed = Seed::new(bytes);
        assert_eq!(seed.as_bytes(), &bytes);
    }

    #[test]
    fn test_seed_from_slice() {
        let bytes = vec![2u8; 64];
        let seed = Seed::from_slice(&bytes).unwrap();
        assert_eq!(seed.as_slice(), &bytes[..]);

        assert_eq!(
            Seed::from_slice(&[3u8; 32]).unwrap_err(),
            Error::Seed(SeedError::InvalidLength(32))
        );
        assert!(Seed::from_slice(&[4u8; 128]).is_err());
    }

    #[test]
    fn test_seed_hex() {
        let seed = Seed::new([5u8; 64]);
        let hex = seed.to_hex();
        assert_eq!(hex.len(), 128);

        let seed2 = Seed::from_hex(&hex).unwrap();
        assert_eq!(seed, seed2);

        assert!(Seed::from_hex("invalid").is_err());
        assert!(Seed::from_hex("00").is_err());
    }

    #[test]
    fn test_seed_zero() {
        assert!(Seed::default().is_zero());
        assert!(!Seed::new([1u8; 64]).is_zero());
    }

    #[test]
    fn test_seed_display() {
        let mut bytes = [0u8; 64];
        bytes[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        bytes[60..].copy_from_slice(&[0xca, 0xfe, 0xba, 0xbe]);

        let seed = Seed::new(bytes);
        assert_eq!(format!("{}", seed), "Seed(deadbeef...cafebabe)");
        assert_eq!(format!("{:?}", seed), "Seed(***)");
    }

    #[test]
    fn test_from_mnemonic_vector() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let seed = Seed::from_mnemonic(phrase, "TREZOR").unwrap();
        assert_eq!(
            &*seed.to_hex(),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_from_mnemonic_empty() {
        assert_eq!(Seed::from_mnemonic("  ", ""), Err(Error::Seed(SeedError::EmptyInput)));
    }
}
