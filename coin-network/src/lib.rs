//! Coin network parameters shared by the seedkit crates
//!
//! The table is static configuration: it is built at compile time, never
//! mutated, and therefore safe to read from any number of threads. Lookups go
//! through a [`NetworkRegistry`] that callers pass by reference into the
//! derivation routines that need version bytes.

use std::fmt;

/// Version bytes prefixed to a serialized BIP32 extended key.
#[derive(Copy, PartialEq, Eq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bip32Versions {
    /// Prefix of extended private keys (`xprv`, `tprv`, ...)
    pub private: [u8; 4],
    /// Prefix of extended public keys (`xpub`, `tpub`, ...)
    pub public: [u8; 4],
}

impl Bip32Versions {
    /// Mainnet `xprv` / `xpub`
    pub const MAINNET: Bip32Versions = Bip32Versions {
        private: [0x04, 0x88, 0xad, 0xe4],
        public: [0x04, 0x88, 0xb2, 0x1e],
    };

    /// Testnet `tprv` / `tpub`
    pub const TESTNET: Bip32Versions = Bip32Versions {
        private: [0x04, 0x35, 0x83, 0x94],
        public: [0x04, 0x35, 0x87, 0xcf],
    };
}

/// Parameters of a single coin network.
#[derive(Copy, PartialEq, Eq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NetworkParameters {
    /// Human readable name
    pub name: &'static str,
    /// Ticker symbol, unique within a registry
    pub symbol: &'static str,
    /// SLIP-44 coin type used as the second BIP44 path level
    pub bip44_coin_type: u32,
    /// P2PKH address version byte
    pub pub_key_hash_version: u8,
    /// P2SH address version byte
    pub script_hash_version: u8,
    /// Wallet import format version byte
    pub wif_version: u8,
    /// Human readable part of native segwit addresses
    pub bech32_prefix: Option<&'static str>,
    /// Prefix used when signing messages
    pub message_prefix: &'static str,
    /// Native segwit (P2WPKH) addresses are available
    pub segwit_available: bool,
    /// Nested segwit (P2SH-P2WPKH) addresses are available
    pub segwit_p2sh_available: bool,
    /// Extended key version bytes
    pub bip32_versions: Bip32Versions,
}

impl NetworkParameters {
    /// Whether native segwit addresses can be encoded on this network.
    ///
    /// Requires both the capability flag and a bech32 prefix.
    pub fn supports_native_segwit(&self) -> bool {
        self.segwit_available && self.bech32_prefix.is_some()
    }

    /// Whether P2SH-wrapped segwit addresses can be encoded on this network.
    pub fn supports_nested_segwit(&self) -> bool {
        self.segwit_p2sh_available
    }
}

impl fmt::Display for NetworkParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// Bitcoin mainnet
pub const BITCOIN: NetworkParameters = NetworkParameters {
    name: "Bitcoin",
    symbol: "BTC",
    bip44_coin_type: 0,
    pub_key_hash_version: 0x00,
    script_hash_version: 0x05,
    wif_version: 0x80,
    bech32_prefix: Some("bc"),
    message_prefix: "\x18Bitcoin Signed Message:\n",
    segwit_available: true,
    segwit_p2sh_available: true,
    bip32_versions: Bip32Versions::MAINNET,
};

/// Bitcoin testnet
pub const BITCOIN_TESTNET: NetworkParameters = NetworkParameters {
    name: "Bitcoin Testnet",
    symbol: "tBTC",
    bip44_coin_type: 1,
    pub_key_hash_version: 0x6f,
    script_hash_version: 0xc4,
    wif_version: 0xef,
    bech32_prefix: Some("tb"),
    message_prefix: "\x18Bitcoin Signed Message:\n",
    segwit_available: true,
    segwit_p2sh_available: true,
    bip32_versions: Bip32Versions::TESTNET,
};

/// Litecoin mainnet
pub const LITECOIN: NetworkParameters = NetworkParameters {
    name: "Litecoin",
    symbol: "LTC",
    bip44_coin_type: 2,
    pub_key_hash_version: 0x30,
    script_hash_version: 0x32,
    wif_version: 0xb0,
    bech32_prefix: Some("ltc"),
    message_prefix: "\x19Litecoin Signed Message:\n",
    segwit_available: true,
    segwit_p2sh_available: true,
    bip32_versions: Bip32Versions::MAINNET,
};

/// Dogecoin mainnet
pub const DOGECOIN: NetworkParameters = NetworkParameters {
    name: "Dogecoin",
    symbol: "DOGE",
    bip44_coin_type: 3,
    pub_key_hash_version: 0x1e,
    script_hash_version: 0x16,
    wif_version: 0x9e,
    bech32_prefix: None,
    message_prefix: "\x19Dogecoin Signed Message:\n",
    segwit_available: false,
    segwit_p2sh_available: false,
    bip32_versions: Bip32Versions::MAINNET,
};

/// Dash mainnet
pub const DASH: NetworkParameters = NetworkParameters {
    name: "Dash",
    symbol: "DASH",
    bip44_coin_type: 5,
    pub_key_hash_version: 0x4c,
    script_hash_version: 0x10,
    wif_version: 0xcc,
    bech32_prefix: None,
    message_prefix: "\x19DarkCoin Signed Message:\n",
    segwit_available: false,
    segwit_p2sh_available: false,
    bip32_versions: Bip32Versions::MAINNET,
};

/// Bitcoin Cash mainnet (legacy address format)
pub const BITCOIN_CASH: NetworkParameters = NetworkParameters {
    name: "Bitcoin Cash",
    symbol: "BCH",
    bip44_coin_type: 145,
    pub_key_hash_version: 0x00,
    script_hash_version: 0x05,
    wif_version: 0x80,
    bech32_prefix: None,
    message_prefix: "\x18Bitcoin Signed Message:\n",
    segwit_available: false,
    segwit_p2sh_available: false,
    bip32_versions: Bip32Versions::MAINNET,
};

/// Every network known to the crate, in display order. The first entry is
/// the default network.
pub static BUILTIN_NETWORKS: [NetworkParameters; 6] =
    [BITCOIN, BITCOIN_TESTNET, LITECOIN, DOGECOIN, DASH, BITCOIN_CASH];

/// Read-only lookup table over a slice of [`NetworkParameters`].
#[derive(Copy, Clone, Debug)]
pub struct NetworkRegistry<'a> {
    networks: &'a [NetworkParameters],
}

impl NetworkRegistry<'static> {
    /// Registry over [`BUILTIN_NETWORKS`].
    pub fn builtin() -> Self {
        Self {
            networks: &BUILTIN_NETWORKS,
        }
    }
}

impl Default for NetworkRegistry<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> NetworkRegistry<'a> {
    /// Registry over a caller supplied table.
    pub fn new(networks: &'a [NetworkParameters]) -> Self {
        Self {
            networks,
        }
    }

    /// First network of the table, if any.
    pub fn default_network(&self) -> Option<&'a NetworkParameters> {
        self.networks.first()
    }

    /// Look a network up by its ticker symbol, ignoring case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use coin_network::NetworkRegistry;
    ///
    /// let registry = NetworkRegistry::builtin();
    /// assert_eq!(registry.by_symbol("ltc").unwrap().bip44_coin_type, 2);
    /// assert!(registry.by_symbol("nope").is_none());
    /// ```
    pub fn by_symbol(&self, symbol: &str) -> Option<&'a NetworkParameters> {
        self.networks.iter().find(|network| network.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Look a network up by its SLIP-44 coin type.
    pub fn by_coin_type(&self, coin_type: u32) -> Option<&'a NetworkParameters> {
        self.networks.iter().find(|network| network.bip44_coin_type == coin_type)
    }

    /// All networks whose extended keys use the given version prefix.
    pub fn by_bip32_version(
        &self,
        version: [u8; 4],
    ) -> impl Iterator<Item = &'a NetworkParameters> + 'a {
        self.networks.iter().filter(move |network| {
            network.bip32_versions.private == version || network.bip32_versions.public == version
        })
    }

    /// Iterate over every network in table order.
    pub fn iter(&self) -> impl Iterator<Item = &'a NetworkParameters> + 'a {
        self.networks.iter()
    }

    /// Number of networks in the table.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(registry.by_symbol("BTC"), Some(&BITCOIN));
        assert_eq!(registry.by_symbol("btc"), Some(&BITCOIN));
        assert_eq!(registry.by_symbol("tbtc"), Some(&BITCOIN_TESTNET));
        assert_eq!(registry.by_symbol("DASH"), Some(&DASH));
        assert!(registry.by_symbol("XYZ").is_none());
    }

    #[test]
    fn test_lookup_by_coin_type() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(registry.by_coin_type(0), Some(&BITCOIN));
        assert_eq!(registry.by_coin_type(3), Some(&DOGECOIN));
        assert_eq!(registry.by_coin_type(145), Some(&BITCOIN_CASH));
        assert!(registry.by_coin_type(9999).is_none());
    }

    #[test]
    fn test_default_network() {
        assert_eq!(NetworkRegistry::builtin().default_network(), Some(&BITCOIN));
        assert!(NetworkRegistry::new(&[]).default_network().is_none());
        assert!(NetworkRegistry::new(&[]).is_empty());
    }

    #[test]
    fn test_symbols_are_unique() {
        let registry = NetworkRegistry::builtin();
        for network in registry.iter() {
            let matches =
                registry.iter().filter(|n| n.symbol.eq_ignore_ascii_case(network.symbol)).count();
            assert_eq!(matches, 1, "duplicate symbol {}", network.symbol);
        }
    }

    #[test]
    fn test_segwit_capabilities() {
        assert!(BITCOIN.supports_native_segwit());
        assert!(BITCOIN.supports_nested_segwit());
        assert!(LITECOIN.supports_native_segwit());
        assert!(!DOGECOIN.supports_native_segwit());
        assert!(!DOGECOIN.supports_nested_segwit());
        assert!(!BITCOIN_CASH.supports_native_segwit());
    }

    #[test]
    fn test_bip32_version_lookup() {
        let registry = NetworkRegistry::builtin();
        let testnets: Vec<_> = registry.by_bip32_version(Bip32Versions::TESTNET.private).collect();
        assert_eq!(testnets, vec![&BITCOIN_TESTNET]);
        assert!(registry.by_bip32_version(Bip32Versions::MAINNET.public).count() > 1);
    }

    #[test]
    fn test_network_display() {
        assert_eq!(BITCOIN.to_string(), "Bitcoin (BTC)");
        assert_eq!(DOGECOIN.to_string(), "Dogecoin (DOGE)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(BITCOIN).unwrap();
        assert_eq!(json["symbol"], "BTC");
        assert_eq!(json["bech32_prefix"], "bc");
    }
}
