//! Wallet state machine
//!
//! A wallet moves through three stages: nothing yet, a mnemonic with its
//! seed, and finally a root key bound to a network. Each stage is its own
//! type, so address and BIP85 derivation are only reachable once a root key
//! exists. [`WalletState`] wraps the stages for callers that keep a single
//! slot around.

use core::fmt;

use coin_network::{NetworkParameters, NetworkRegistry};
use secp256k1::{All, Secp256k1};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::address::{encode_address, wif_encode};
use crate::bip32::{ChildNumber, ExtendedPrivKey, ExtendedPubKey, HARDENED_OFFSET};
use crate::bip85::{derive_bip85, Bip85Request};
use crate::config::{WalletConfig, DEFAULT_STRENGTH};
use crate::derivation::{address_path, build_path, BipStandard, DerivationCoordinates};
use crate::entropy;
use crate::error::{Error, Result};
use crate::mnemonic::{word_count_for_strength, Language, Mnemonic};
use crate::seed::Seed;

/// Upper bound on the records reserved ahead of a batch derivation.
const MAX_PREALLOCATED_RECORDS: u32 = 1024;

/// Look a network up by symbol.
pub fn resolve_network<'a>(
    registry: &NetworkRegistry<'a>,
    symbol: &str,
) -> Result<&'a NetworkParameters> {
    registry.by_symbol(symbol).ok_or_else(|| Error::UnknownNetwork(symbol.to_string()))
}

/// Parameters for a new mnemonic
#[derive(Clone, PartialEq, Eq)]
pub struct GenerateParams {
    /// Entropy bits: 128, 160, 192, 224 or 256
    pub strength: usize,
    /// Wordlist
    pub language: Language,
    /// Raw user entropy (dice, cards, ...). OS randomness is used when absent.
    pub entropy: Option<Zeroizing<String>>,
    /// BIP39 passphrase
    pub passphrase: Zeroizing<String>,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            language: Language::English,
            entropy: None,
            passphrase: Zeroizing::new(String::new()),
        }
    }
}

impl GenerateParams {
    /// Strength and language taken from a configuration
    pub fn from_config(config: &WalletConfig) -> Self {
        Self {
            strength: config.strength,
            language: config.language,
            ..Self::default()
        }
    }

    /// Use user supplied entropy text instead of OS randomness
    pub fn with_entropy(mut self, raw: &str) -> Self {
        self.entropy = Some(Zeroizing::new(raw.to_string()));
        self
    }

    /// Set the BIP39 passphrase
    pub fn with_passphrase(mut self, passphrase: &str) -> Self {
        self.passphrase = Zeroizing::new(passphrase.to_string());
        self
    }
}

impl fmt::Debug for GenerateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateParams")
            .field("strength", &self.strength)
            .field("language", &self.language)
            .field("user_entropy", &self.entropy.is_some())
            .finish()
    }
}

/// A mnemonic and the seed stretched from it
#[derive(Clone)]
pub struct SeededWallet {
    mnemonic: Mnemonic,
    seed: Seed,
}

impl SeededWallet {
    /// Create a fresh mnemonic and derive its seed.
    pub fn generate(params: &GenerateParams) -> Result<Self> {
        let mnemonic = match &params.entropy {
            Some(raw) => {
                let analysis = entropy::analyze(raw);
                tracing::debug!(
                    kind = %analysis.kind,
                    bits = analysis.bits,
                    "using user supplied entropy"
                );
                let bytes = analysis.entropy_bytes(params.strength)?;
                Mnemonic::from_entropy(&bytes, params.language)?
            }
            None => Mnemonic::generate(word_count_for_strength(params.strength)?, params.language)?,
        };
        tracing::info!(
            words = mnemonic.word_count(),
            language = %mnemonic.language(),
            "generated mnemonic"
        );

        let seed = mnemonic.to_seed(&params.passphrase)?;
        Ok(Self {
            mnemonic,
            seed,
        })
    }

    /// Import an existing phrase; the language is detected from its words.
    pub fn import(phrase: &str, passphrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse(phrase)?;
        tracing::info!(words = mnemonic.word_count(), "imported mnemonic");
        let seed = mnemonic.to_seed(passphrase)?;
        Ok(Self {
            mnemonic,
            seed,
        })
    }

    /// The mnemonic
    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    /// The 64-byte seed
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Derive the BIP32 root key for `network`.
    pub fn into_root(self, network: &NetworkParameters) -> Result<HdWallet> {
        let root = ExtendedPrivKey::new_master(network.bip32_versions, self.seed.as_bytes())?;
        tracing::debug!(network = network.symbol, "derived root key");
        Ok(HdWallet {
            mnemonic: self.mnemonic,
            seed: self.seed,
            root,
            network: *network,
            secp: Secp256k1::new(),
        })
    }
}

impl fmt::Debug for SeededWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededWallet")
            .field("mnemonic", &self.mnemonic)
            .field("seed", &self.seed)
            .finish()
    }
}

/// One derived address with its keys
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressRecord {
    /// Full derivation path
    pub path: String,
    /// Encoded address
    pub address: String,
    /// Compressed public key, hex
    pub public_key_hex: String,
    /// Private scalar, hex
    pub private_key_hex: String,
    /// Private key in wallet import format
    pub wif: String,
    /// Address index
    pub index: u32,
}

impl fmt::Debug for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressRecord")
            .field("path", &self.path)
            .field("address", &self.address)
            .field("public_key_hex", &self.public_key_hex)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Everything a consumer displays for one configuration, built in one go
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WalletSnapshot {
    /// Mnemonic text
    pub mnemonic: String,
    /// Seed, hex
    pub seed: String,
    /// Root extended private key
    pub root_key: String,
    /// Path of the account chain the addresses hang off
    pub derivation_path: String,
    /// Extended private key at `derivation_path`
    pub extended_private_key: String,
    /// Extended public key at `derivation_path`
    pub extended_public_key: String,
    /// Derived addresses in index order
    pub addresses: Vec<AddressRecord>,
}

impl fmt::Debug for WalletSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSnapshot")
            .field("derivation_path", &self.derivation_path)
            .field("extended_public_key", &self.extended_public_key)
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

/// A wallet with its root key, bound to one network
#[derive(Clone)]
pub struct HdWallet {
    mnemonic: Mnemonic,
    seed: Seed,
    root: ExtendedPrivKey,
    network: NetworkParameters,
    secp: Secp256k1<All>,
}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdWallet")
            .field("network", &self.network.symbol)
            .field("root", &"<hidden>")
            .finish()
    }
}

impl HdWallet {
    /// The mnemonic
    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    /// The seed as hex
    pub fn seed_hex(&self) -> Zeroizing<String> {
        self.seed.to_hex()
    }

    /// The BIP32 root key
    pub fn root_key(&self) -> &ExtendedPrivKey {
        &self.root
    }

    /// Network the root key is bound to
    pub fn network(&self) -> &NetworkParameters {
        &self.network
    }

    /// The same wallet on another network.
    pub fn with_network(&self, network: &NetworkParameters) -> Result<HdWallet> {
        SeededWallet {
            mnemonic: self.mnemonic.clone(),
            seed: self.seed.clone(),
        }
        .into_root(network)
    }

    /// Extended keys at the account chain `build_path(coords, standard)`.
    pub fn extended_keys(
        &self,
        coords: &DerivationCoordinates,
        standard: BipStandard,
    ) -> Result<(String, ExtendedPrivKey, ExtendedPubKey)> {
        let path = build_path(coords, standard)?;
        let xprv = self.root.derive_path(&self.secp, &path)?;
        let xpub = ExtendedPubKey::from_priv(&self.secp, &xprv);
        Ok((path, xprv, xpub))
    }

    /// Derive `count` consecutive addresses starting at `start`.
    ///
    /// An index whose child key is invalid is skipped and the next index is
    /// used instead, so the result always holds `count` records.
    pub fn derive_addresses(
        &self,
        coords: &DerivationCoordinates,
        standard: BipStandard,
        start: u32,
        count: u32,
        hardened: bool,
    ) -> Result<Vec<AddressRecord>> {
        if u64::from(start) + u64::from(count) > u64::from(HARDENED_OFFSET) {
            return Err(Error::InvalidDerivationPath(format!(
                "address range {}..{} is out of range",
                start,
                u64::from(start) + u64::from(count)
            )));
        }

        let (base, chain, _) = self.extended_keys(coords, standard)?;
        tracing::debug!(
            network = self.network.symbol,
            %standard,
            path = %base,
            start,
            count,
            "deriving addresses"
        );

        let mut records = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS) as usize);
        let mut index = start;
        while records.len() < count as usize {
            if index >= HARDENED_OFFSET {
                return Err(Error::InvalidDerivationPath(format!(
                    "address index {} is out of range",
                    index
                )));
            }
            let child = match chain.ckd_priv(&self.secp, ChildNumber::new(index, hardened)?) {
                Ok(child) => child,
                Err(crate::bip32::Error::DerivationOverflow(child_number)) => {
                    tracing::warn!(%child_number, "invalid child key, skipping index");
                    index += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let public_key = child.public_key(&self.secp);
            records.push(AddressRecord {
                path: address_path(&base, index, hardened),
                address: encode_address(&public_key, &self.network, standard)?,
                public_key_hex: hex::encode(public_key.serialize()),
                private_key_hex: hex::encode(child.private_key.secret_bytes()),
                wif: wif_encode(&child.private_key, &self.network).to_string(),
                index,
            });
            index += 1;
        }
        Ok(records)
    }

    /// BIP85 child output from the root key.
    pub fn derive_bip85(&self, request: &Bip85Request) -> Result<Zeroizing<String>> {
        derive_bip85(&self.secp, &self.root, request, &self.network)
    }

    /// Build the complete consumer view for `config`.
    ///
    /// The network of the wallet is used; `config.network` is only consulted
    /// by callers when choosing which wallet to build.
    pub fn snapshot(&self, config: &WalletConfig) -> Result<WalletSnapshot> {
        let coords = config.coordinates(self.network.bip44_coin_type);
        let (derivation_path, xprv, xpub) = self.extended_keys(&coords, config.standard)?;
        let addresses = self.derive_addresses(
            &coords,
            config.standard,
            config.start_index,
            config.address_count,
            config.hardened_addresses,
        )?;

        Ok(WalletSnapshot {
            mnemonic: self.mnemonic.phrase().to_string(),
            seed: self.seed_hex().to_string(),
            root_key: self.root.to_string(),
            derivation_path,
            extended_private_key: xprv.to_string(),
            extended_public_key: xpub.to_string(),
            addresses,
        })
    }
}

/// The wallet slot a consumer keeps between calls
#[derive(Debug, Clone, Default)]
pub enum WalletState {
    /// Nothing generated or imported yet
    #[default]
    Uninitialized,
    /// Mnemonic and seed known, root key not derived yet
    SeedDerived(SeededWallet),
    /// Root key available
    RootKeyDerived(HdWallet),
}

impl WalletState {
    /// Generate a mnemonic, replacing whatever the slot held.
    pub fn generate(params: &GenerateParams) -> Result<Self> {
        SeededWallet::generate(params).map(WalletState::SeedDerived)
    }

    /// Import a mnemonic, replacing whatever the slot held.
    pub fn import(phrase: &str, passphrase: &str) -> Result<Self> {
        SeededWallet::import(phrase, passphrase).map(WalletState::SeedDerived)
    }

    /// Advance to the root key stage. A wallet that already has a root key
    /// is rebound to `network`.
    pub fn derive_root(self, network: &NetworkParameters) -> Result<Self> {
        match self {
            WalletState::Uninitialized => Err(Error::RootKeyUnavailable),
            WalletState::SeedDerived(seeded) => seeded.into_root(network).map(WalletState::RootKeyDerived),
            WalletState::RootKeyDerived(wallet) => {
                wallet.with_network(network).map(WalletState::RootKeyDerived)
            }
        }
    }

    /// The wallet, once its root key exists.
    pub fn hd_wallet(&self) -> Result<&HdWallet> {
        match self {
            WalletState::RootKeyDerived(wallet) => Ok(wallet),
            _ => Err(Error::RootKeyUnavailable),
        }
    }

    /// Mnemonic of any initialized stage
    pub fn mnemonic(&self) -> Option<&Mnemonic> {
        match self {
            WalletState::Uninitialized => None,
            WalletState::SeedDerived(seeded) => Some(seeded.mnemonic()),
            WalletState::RootKeyDerived(wallet) => Some(wallet.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use coin_network::{BITCOIN, DOGECOIN};

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_state_transitions() {
        let state = WalletState::default();
        assert_matches!(state.hd_wallet(), Err(Error::RootKeyUnavailable));
        assert_matches!(state.derive_root(&BITCOIN), Err(Error::RootKeyUnavailable));

        let state = WalletState::import(ABANDON, "").unwrap();
        assert_matches!(state.hd_wallet(), Err(Error::RootKeyUnavailable));
        assert_eq!(state.mnemonic().unwrap().phrase(), ABANDON);

        let state = state.derive_root(&BITCOIN).unwrap();
        assert!(state.hd_wallet().unwrap().root_key().to_string().starts_with("xprv"));
    }

    #[test]
    fn test_import_rejects_bad_phrase() {
        assert_matches!(
            SeededWallet::import("abandon abandon", ""),
            Err(Error::Mnemonic(crate::mnemonic::MnemonicError::InvalidWordCount(2)))
        );
    }

    #[test]
    fn test_generate_from_user_entropy() {
        let params = GenerateParams::default().with_entropy(&"0".repeat(128));
        let params = GenerateParams {
            strength: 128,
            ..params
        };
        let seeded = SeededWallet::generate(&params).unwrap();
        assert_eq!(seeded.mnemonic().phrase(), ABANDON);

        let short = GenerateParams::default().with_entropy("123456");
        assert_matches!(SeededWallet::generate(&short), Err(Error::Entropy(_)));
    }

    #[test]
    #[cfg(feature = "getrandom")]
    fn test_generate_random() {
        let params = GenerateParams {
            strength: 160,
            ..GenerateParams::default()
        };
        let seeded = SeededWallet::generate(&params).unwrap();
        assert_eq!(seeded.mnemonic().word_count(), 15);
    }

    #[test]
    fn test_snapshot_is_complete() {
        let wallet = SeededWallet::import(ABANDON, "").unwrap().into_root(&BITCOIN).unwrap();
        let config = WalletConfig::new().with_address_range(10, 3);
        let snapshot = wallet.snapshot(&config).unwrap();

        assert_eq!(snapshot.derivation_path, "m/44'/0'/0'/0");
        assert_eq!(snapshot.addresses.len(), 3);
        let indices: Vec<u32> = snapshot.addresses.iter().map(|record| record.index).collect();
        assert_eq!(indices, vec![10, 11, 12]);
        for record in &snapshot.addresses {
            assert!(record.path.starts_with("m/44'/0'/0'/0/"));
        }
        assert_eq!(snapshot.seed.len(), 128);
    }

    #[test]
    fn test_address_range_is_checked_up_front() {
        let wallet = SeededWallet::import(ABANDON, "").unwrap().into_root(&BITCOIN).unwrap();
        let coords = DerivationCoordinates::new(0, 0, 0);

        assert_matches!(
            wallet.derive_addresses(&coords, BipStandard::Bip44, HARDENED_OFFSET - 1, u32::MAX, false),
            Err(Error::InvalidDerivationPath(_))
        );
        assert_matches!(
            wallet.derive_addresses(&coords, BipStandard::Bip44, HARDENED_OFFSET - 1, 5, false),
            Err(Error::InvalidDerivationPath(_))
        );

        let config = WalletConfig::new().with_address_range(0, u32::MAX);
        assert_matches!(wallet.snapshot(&config), Err(Error::InvalidDerivationPath(_)));

        let last = wallet.derive_addresses(&coords, BipStandard::Bip44, HARDENED_OFFSET - 1, 1, false).unwrap();
        assert_eq!(last[0].index, HARDENED_OFFSET - 1);
    }

    #[test]
    fn test_snapshot_fails_without_capability() {
        let wallet = SeededWallet::import(ABANDON, "").unwrap().into_root(&DOGECOIN).unwrap();
        let config = WalletConfig::new().with_standard(BipStandard::Bip84);
        assert_matches!(wallet.snapshot(&config), Err(Error::Address(_)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let wallet = SeededWallet::import(ABANDON, "").unwrap().into_root(&BITCOIN).unwrap();
        let records = wallet
            .derive_addresses(&DerivationCoordinates::new(0, 0, 0), BipStandard::Bip44, 0, 1, false)
            .unwrap();
        let debug = format!("{:?} {:?}", wallet, records);
        assert!(!debug.contains("abandon"));
        assert!(!debug.contains(&records[0].wif));
        assert!(!debug.contains(&records[0].private_key_hex));
    }

    #[test]
    fn test_resolve_network() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(resolve_network(&registry, "doge").unwrap().symbol, "DOGE");
        assert_matches!(resolve_network(&registry, "xyz"), Err(Error::UnknownNetwork(_)));
    }
}
