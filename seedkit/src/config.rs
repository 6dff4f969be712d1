//! Wallet configuration
//!
//! Defaults used by [`crate::wallet::HdWallet::snapshot`] and
//! [`crate::wallet::GenerateParams`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::derivation::{BipStandard, DerivationCoordinates};
use crate::mnemonic::Language;

/// Address count shown when nothing else is requested
pub const DEFAULT_ADDRESS_COUNT: u32 = 20;

/// Entropy bits of a freshly generated mnemonic
pub const DEFAULT_STRENGTH: usize = 256;

/// Wallet configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalletConfig {
    /// Ticker symbol of the network, looked up in the registry
    pub network: String,
    /// Derivation standard
    pub standard: BipStandard,
    /// Account index
    pub account: u32,
    /// 0 for receiving addresses, 1 for change
    pub change: u32,
    /// First address index
    pub start_index: u32,
    /// Number of addresses
    pub address_count: u32,
    /// Use hardened address indices
    pub hardened_addresses: bool,
    /// Entropy bits for new mnemonics
    pub strength: usize,
    /// Wordlist for new mnemonics
    pub language: Language,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: "BTC".to_string(),
            standard: BipStandard::Bip44,
            account: 0,
            change: 0,
            start_index: 0,
            address_count: DEFAULT_ADDRESS_COUNT,
            hardened_addresses: false,
            strength: DEFAULT_STRENGTH,
            language: Language::English,
        }
    }
}

impl WalletConfig {
    /// Create a new wallet configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network symbol
    pub fn with_network(mut self, symbol: impl Into<String>) -> Self {
        self.network = symbol.into();
        self
    }

    /// Set the derivation standard
    pub fn with_standard(mut self, standard: BipStandard) -> Self {
        self.standard = standard;
        self
    }

    /// Set account and change levels
    pub fn with_account(mut self, account: u32, change: u32) -> Self {
        self.account = account;
        self.change = change;
        self
    }

    /// Set the address window
    pub fn with_address_range(mut self, start_index: u32, count: u32) -> Self {
        self.start_index = start_index;
        self.address_count = count;
        self
    }

    /// Use hardened address indices
    pub fn with_hardened_addresses(mut self, hardened: bool) -> Self {
        self.hardened_addresses = hardened;
        self
    }

    /// Set mnemonic strength in bits
    pub fn with_strength(mut self, strength: usize) -> Self {
        self.strength = strength;
        self
    }

    /// Set the mnemonic language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Path coordinates for a network's coin type
    pub fn coordinates(&self, coin_type: u32) -> DerivationCoordinates {
        DerivationCoordinates::new(coin_type, self.account, self.change)
            .with_index(self.start_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::new();
        assert_eq!(config.network, "BTC");
        assert_eq!(config.standard, BipStandard::Bip44);
        assert_eq!(config.address_count, 20);
        assert_eq!(config.strength, 256);
        assert!(!config.hardened_addresses);
    }

    #[test]
    fn test_builders() {
        let config = WalletConfig::new()
            .with_network("ltc")
            .with_standard(BipStandard::Bip84)
            .with_account(3, 1)
            .with_address_range(10, 5)
            .with_hardened_addresses(true);
        let coords = config.coordinates(2);
        assert_eq!(coords.coin, 2);
        assert_eq!(coords.account, 3);
        assert_eq!(coords.change, 1);
        assert_eq!(coords.index, 10);
        assert_eq!(config.address_count, 5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json() {
        let config: WalletConfig =
            serde_json::from_str(r#"{"network":"DOGE","address_count":5}"#).unwrap();
        assert_eq!(config.network, "DOGE");
        assert_eq!(config.address_count, 5);
        assert_eq!(config.strength, 256);
    }
}
