//! Error types for the seedkit library

use thiserror::Error;

use crate::address::AddressError;
use crate::bip85::Bip85Error;
use crate::entropy::EntropyError;
use crate::logging::LoggingError;
use crate::mnemonic::MnemonicError;
use crate::seed::SeedError;

/// Result type alias for seedkit operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur in seedkit operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Mnemonic encoding or validation failed
    #[error("Invalid mnemonic: {0}")]
    Mnemonic(#[from] MnemonicError),
    /// Seed derivation failed
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
    /// BIP32 related error
    #[error("BIP32 error: {0}")]
    Bip32(#[from] crate::bip32::Error),
    /// Address encoding failed
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
    /// BIP85 derivation failed
    #[error("BIP85 error: {0}")]
    Bip85(#[from] Bip85Error),
    /// User entropy could not be used
    #[error("Entropy error: {0}")]
    Entropy(#[from] EntropyError),
    /// The wallet has not derived its root key yet
    #[error("Root key is not available in the current wallet state")]
    RootKeyUnavailable,
    /// No network with this symbol in the registry
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    /// Invalid derivation path or coordinates
    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),
    /// Logging could not be initialised
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Bip32(crate::bip32::Error::Secp256k1(e))
    }
}
