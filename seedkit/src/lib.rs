//! Seedkit Library
//!
//! Deterministic key derivation from a human-memorable phrase: BIP39
//! mnemonics and seeds, BIP32 hierarchical deterministic keys, BIP44/49/84/141
//! derivation paths and addresses, BIP85 child entropy, and analysis of user
//! supplied entropy such as dice rolls or shuffled cards.
//!
//! # Examples
//!
//! ```rust
//! use coin_network::BITCOIN;
//! use seedkit::prelude::*;
//!
//! let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
//! let wallet = SeededWallet::import(phrase, "").unwrap().into_root(&BITCOIN).unwrap();
//! let addresses = wallet
//!     .derive_addresses(&DerivationCoordinates::new(0, 0, 0), BipStandard::Bip84, 0, 1, false)
//!     .unwrap();
//! assert_eq!(addresses[0].address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
//! ```

pub mod address;
pub mod bip32;
pub mod bip85;
pub mod config;
pub mod derivation;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod mnemonic;
pub mod seed;
pub mod wallet;

pub use coin_network;
pub use coin_network::{NetworkParameters, NetworkRegistry};

pub use address::{encode_address, wif_decode, wif_encode, Address, AddressError, AddressType};
pub use bip32::{ChildNumber, DerivationPath, ExtendedKey, ExtendedPrivKey, ExtendedPubKey};
pub use bip85::{derive_bip85, Bip85Application, Bip85Error, Bip85Request};
pub use config::WalletConfig;
pub use derivation::{
    address_path, build_path, BipStandard, DerivationCoordinates, DerivationPathBuilder,
};
pub use entropy::{analyze, EntropyAnalysis, EntropyError, EntropyKind};
pub use error::{Error, Result};
pub use mnemonic::{validate, Language, Mnemonic, MnemonicError, ValidationReport};
pub use seed::{Seed, SeedError};
pub use wallet::{
    AddressRecord, GenerateParams, HdWallet, SeededWallet, WalletSnapshot, WalletState,
};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        BipStandard, ChildNumber, DerivationCoordinates, DerivationPath, Error, ExtendedKey,
        ExtendedPrivKey, ExtendedPubKey, GenerateParams, HdWallet, Language, Mnemonic, Result,
        SeededWallet, WalletConfig, WalletState,
    };
}
