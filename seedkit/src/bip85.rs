//! BIP85 deterministic entropy
//!
//! Child entropy for unrelated applications is derived from one root key:
//! the application path is derived with hardened steps only, and the child
//! private key is fed through HMAC-SHA512 keyed with `bip-entropy-from-k`.

use core::fmt;
use core::str::FromStr;

use bitcoin_hashes::{sha512, Hash, HashEngine, Hmac, HmacEngine};
use coin_network::NetworkParameters;
use secp256k1::{Secp256k1, SecretKey, Signing};
use zeroize::{Zeroize, Zeroizing};

use crate::address::wif_encode;
use crate::bip32::{ChainCode, ChildNumber, DerivationPath, ExtendedPrivKey};
use crate::error::Result;
use crate::mnemonic::{Language, Mnemonic, VALID_WORD_COUNTS};

/// First path level of every BIP85 derivation
pub const BIP85_PURPOSE: u32 = 83696968;

const HMAC_KEY: &[u8] = b"bip-entropy-from-k";

/// BIP85 errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Bip85Error {
    /// Application name is not one of bip39, wif, xprv or hex
    #[error("unsupported BIP85 application: {0}")]
    UnsupportedApplication(String),
    /// Word count outside 12, 15, 18, 21, 24
    #[error("unsupported BIP85 word count {0}")]
    InvalidWordCount(u32),
    /// Hex length outside 16..=64 bytes
    #[error("BIP85 hex length must be between 16 and 64 bytes, got {0}")]
    InvalidByteCount(u32),
    /// Language code without a wordlist
    #[error("unknown BIP85 language code {0}")]
    UnknownLanguage(u32),
}

/// Applications with a registered BIP85 number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Bip85Application {
    /// A new BIP39 mnemonic
    Bip39,
    /// A WIF private key
    Wif,
    /// A BIP32 master extended private key
    Xprv,
    /// Raw entropy as hex
    Hex,
}

impl Bip85Application {
    /// Application number used as second path level
    pub fn number(&self) -> u32 {
        match self {
            Bip85Application::Bip39 => 39,
            Bip85Application::Wif => 2,
            Bip85Application::Xprv => 32,
            Bip85Application::Hex => 128169,
        }
    }
}

impl fmt::Display for Bip85Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bip85Application::Bip39 => "bip39",
            Bip85Application::Wif => "wif",
            Bip85Application::Xprv => "xprv",
            Bip85Application::Hex => "hex",
        };
        f.write_str(name)
    }
}

impl FromStr for Bip85Application {
    type Err = Bip85Error;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bip39" => Ok(Bip85Application::Bip39),
            "wif" => Ok(Bip85Application::Wif),
            "xprv" => Ok(Bip85Application::Xprv),
            "hex" => Ok(Bip85Application::Hex),
            _ => Err(Bip85Error::UnsupportedApplication(s.to_string())),
        }
    }
}

/// What to derive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bip85Request {
    /// Target application
    pub application: Bip85Application,
    /// Child index, last path level
    pub index: u32,
    /// BIP85 language code, bip39 only
    pub language_index: u32,
    /// Mnemonic length, bip39 only
    pub word_count: u32,
    /// Entropy length in bytes, hex only
    pub byte_count: u32,
}

impl Bip85Request {
    /// Request with the defaults: English, 12 words, 64 bytes.
    pub fn new(application: Bip85Application, index: u32) -> Self {
        Self {
            application,
            index,
            language_index: 0,
            word_count: 12,
            byte_count: 64,
        }
    }

    /// Full derivation path of the request.
    pub fn path(&self) -> Result<DerivationPath> {
        let levels: Vec<u32> = match self.application {
            Bip85Application::Bip39 => {
                if !VALID_WORD_COUNTS.contains(&(self.word_count as usize)) {
                    return Err(Bip85Error::InvalidWordCount(self.word_count).into());
                }
                vec![self.language_index, self.word_count, self.index]
            }
            Bip85Application::Hex => {
                if !(16..=64).contains(&self.byte_count) {
                    return Err(Bip85Error::InvalidByteCount(self.byte_count).into());
                }
                vec![self.byte_count, self.index]
            }
            Bip85Application::Wif | Bip85Application::Xprv => vec![self.index],
        };

        let mut path = DerivationPath::master();
        path.push(ChildNumber::from_hardened_idx(BIP85_PURPOSE)?);
        path.push(ChildNumber::from_hardened_idx(self.application.number())?);
        for level in levels {
            path.push(ChildNumber::from_hardened_idx(level)?);
        }
        Ok(path)
    }
}

/// 64 bytes of entropy for an arbitrary BIP85 path.
pub fn derive_entropy<C: Signing>(
    secp: &Secp256k1<C>,
    root: &ExtendedPrivKey,
    path: &DerivationPath,
) -> Result<Zeroizing<[u8; 64]>> {
    let child = root.derive_priv(secp, path)?;
    let mut secret = child.private_key.secret_bytes();

    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(HMAC_KEY);
    engine.input(&secret);
    secret.zeroize();
    Ok(Zeroizing::new(Hmac::<sha512::Hash>::from_engine(engine).to_byte_array()))
}

/// Derive the application output for `request`.
pub fn derive_bip85<C: Signing>(
    secp: &Secp256k1<C>,
    root: &ExtendedPrivKey,
    request: &Bip85Request,
    network: &NetworkParameters,
) -> Result<Zeroizing<String>> {
    let language = match request.application {
        Bip85Application::Bip39 => Some(
            Language::from_bip85_index(request.language_index)
                .ok_or(Bip85Error::UnknownLanguage(request.language_index))?,
        ),
        _ => None,
    };
    let path = request.path()?;
    tracing::debug!(application = %request.application, path = %path, "deriving BIP85 child");

    let entropy = derive_entropy(secp, root, &path)?;

    match request.application {
        Bip85Application::Bip39 => {
            let words = request.word_count as usize;
            let len = (words * 11 - words / 3).div_ceil(8);
            let mnemonic = Mnemonic::from_entropy(&entropy[..len], language.unwrap_or_default())?;
            Ok(Zeroizing::new(mnemonic.phrase().to_string()))
        }
        Bip85Application::Wif => {
            let secret = SecretKey::from_slice(&entropy[..32])?;
            Ok(wif_encode(&secret, network))
        }
        Bip85Application::Xprv => {
            let mut chain_code = [0u8; 32];
            chain_code.copy_from_slice(&entropy[..32]);
            let private_key = SecretKey::from_slice(&entropy[32..64])?;
            let xprv = ExtendedPrivKey::from_parts(
                network.bip32_versions,
                ChainCode::from_bytes(chain_code),
                private_key,
            );
            chain_code.zeroize();
            Ok(Zeroizing::new(xprv.to_string()))
        }
        Bip85Application::Hex => {
            Ok(Zeroizing::new(hex::encode(&entropy[..request.byte_count as usize])))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use coin_network::BITCOIN;

    const ROOT: &str = "xprv9s21ZrQH143K2LBWUUQRFXhucrQqBpKdRRxNVq2zBqsx8HVqFk2uYo8kmbaLLHRdqtQpUm98uKfu3vca1LqdGhUtyoFnCNkfmXRyPXLjbKb";

    fn root() -> ExtendedPrivKey {
        ROOT.parse().unwrap()
    }

    #[test]
    fn test_bip39_vector() {
        let secp = Secp256k1::new();
        let request = Bip85Request::new(Bip85Application::Bip39, 0);
        let phrase = derive_bip85(&secp, &root(), &request, &BITCOIN).unwrap();
        assert_eq!(
            &*phrase,
            "girl mad pet galaxy egg matter matrix prison refuse sense ordinary nose"
        );
    }

    #[test]
    fn test_wif_vector() {
        let secp = Secp256k1::new();
        let request = Bip85Request::new(Bip85Application::Wif, 0);
        let wif = derive_bip85(&secp, &root(), &request, &BITCOIN).unwrap();
        assert_eq!(&*wif, "Kzyv4uF39d4Jrw2W7UryTHwZr1zQVNk4dAFyqE6BuMrMh1Za7uhp");
    }

    #[test]
    fn test_paths() {
        let mut request = Bip85Request::new(Bip85Application::Bip39, 3);
        request.word_count = 24;
        assert_eq!(request.path().unwrap().to_string(), "m/83696968'/39'/0'/24'/3'");

        request.application = Bip85Application::Hex;
        request.byte_count = 32;
        assert_eq!(request.path().unwrap().to_string(), "m/83696968'/128169'/32'/3'");

        request.application = Bip85Application::Xprv;
        assert_eq!(request.path().unwrap().to_string(), "m/83696968'/32'/3'");

        request.application = Bip85Application::Wif;
        assert_eq!(request.path().unwrap().to_string(), "m/83696968'/2'/3'");
    }

    #[test]
    fn test_xprv_is_a_master_key() {
        let secp = Secp256k1::new();
        let request = Bip85Request::new(Bip85Application::Xprv, 0);
        let encoded = derive_bip85(&secp, &root(), &request, &BITCOIN).unwrap();
        let xprv: ExtendedPrivKey = encoded.parse().unwrap();
        assert_eq!(xprv.depth, 0);
        assert_eq!(u32::from(xprv.child_number), 0);
        assert!(encoded.starts_with("xprv"));
    }

    #[test]
    fn test_hex_length() {
        let secp = Secp256k1::new();
        let mut request = Bip85Request::new(Bip85Application::Hex, 0);
        request.byte_count = 16;
        assert_eq!(derive_bip85(&secp, &root(), &request, &BITCOIN).unwrap().len(), 32);

        request.byte_count = 65;
        assert_matches!(
            derive_bip85(&secp, &root(), &request, &BITCOIN),
            Err(Error::Bip85(Bip85Error::InvalidByteCount(65)))
        );
    }

    #[test]
    fn test_unsupported_application() {
        assert_eq!(
            "rsa".parse::<Bip85Application>(),
            Err(Bip85Error::UnsupportedApplication("rsa".to_string()))
        );
        assert_eq!("XPRV".parse::<Bip85Application>(), Ok(Bip85Application::Xprv));
    }

    #[test]
    fn test_invalid_bip39_parameters() {
        let secp = Secp256k1::new();
        let mut request = Bip85Request::new(Bip85Application::Bip39, 0);
        request.word_count = 13;
        assert_matches!(
            derive_bip85(&secp, &root(), &request, &BITCOIN),
            Err(Error::Bip85(Bip85Error::InvalidWordCount(13)))
        );

        request.word_count = 12;
        request.language_index = 42;
        assert_matches!(
            derive_bip85(&secp, &root(), &request, &BITCOIN),
            Err(Error::Bip85(Bip85Error::UnknownLanguage(42)))
        );
    }
}
