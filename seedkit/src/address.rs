//! Address generation and encoding

use core::fmt;

use bech32::{u5, FromBase32, ToBase32, Variant};
use bitcoin_hashes::{hash160, Hash};
use coin_network::NetworkParameters;
use secp256k1::{PublicKey, SecretKey};
use zeroize::{Zeroize, Zeroizing};

use crate::derivation::BipStandard;

/// Address encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The network cannot encode addresses for this standard
    #[error("{network} does not support {standard} addresses")]
    UnsupportedCapability {
        /// Network symbol
        network: String,
        /// Requested standard
        standard: BipStandard,
    },
    /// Base58Check decoding failed
    #[error("invalid base58 encoding: {0}")]
    Base58(String),
    /// Bech32 encoding or decoding failed
    #[error("invalid bech32 encoding: {0}")]
    Bech32(String),
    /// Decoded payload has the wrong size
    #[error("invalid payload length {0}")]
    InvalidLength(usize),
    /// Version byte or prefix belongs to another network
    #[error("address does not belong to {0}")]
    WrongNetwork(String),
    /// Malformed WIF payload
    #[error("invalid WIF private key")]
    InvalidWif,
}

/// Address types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressType {
    /// Pay to public key hash (P2PKH)
    P2pkh,
    /// Pay to witness public key hash wrapped in P2SH
    P2shP2wpkh,
    /// Native segwit v0 pay to witness public key hash
    P2wpkh,
}

impl AddressType {
    /// Address type used by a derivation standard
    pub fn for_standard(standard: BipStandard) -> Self {
        match standard {
            BipStandard::Bip32 | BipStandard::Bip44 => AddressType::P2pkh,
            BipStandard::Bip49 => AddressType::P2shP2wpkh,
            BipStandard::Bip84 | BipStandard::Bip141 => AddressType::P2wpkh,
        }
    }
}

/// An address on one of the registry networks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// The network this address is valid for
    pub network: NetworkParameters,
    /// The type of address
    pub address_type: AddressType,
    /// HASH160 of the public key, or of the redeem script for P2SH
    pub hash: hash160::Hash,
}

/// `OP_0 PUSH20 <hash160(pubkey)>`
fn p2wpkh_redeem_script(pubkey_hash: &hash160::Hash) -> [u8; 22] {
    let mut script = [0u8; 22];
    script[0] = 0x00;
    script[1] = 0x14;
    script[2..].copy_from_slice(&pubkey_hash[..]);
    script
}

impl Address {
    /// Create a P2PKH address from a public key
    pub fn p2pkh(pubkey: &PublicKey, network: &NetworkParameters) -> Self {
        Self {
            network: *network,
            address_type: AddressType::P2pkh,
            hash: hash160::Hash::hash(&pubkey.serialize()),
        }
    }

    /// Create a P2SH-P2WPKH address from a public key
    pub fn p2sh_p2wpkh(
        pubkey: &PublicKey,
        network: &NetworkParameters,
    ) -> Result<Self, AddressError> {
        if !network.supports_nested_segwit() {
            return Err(unsupported(network, BipStandard::Bip49));
        }
        let pubkey_hash = hash160::Hash::hash(&pubkey.serialize());
        Ok(Self {
            network: *network,
            address_type: AddressType::P2shP2wpkh,
            hash: hash160::Hash::hash(&p2wpkh_redeem_script(&pubkey_hash)),
        })
    }

    /// Create a native segwit v0 address from a public key
    pub fn p2wpkh(pubkey: &PublicKey, network: &NetworkParameters) -> Result<Self, AddressError> {
        if !network.supports_native_segwit() {
            return Err(unsupported(network, BipStandard::Bip84));
        }
        Ok(Self {
            network: *network,
            address_type: AddressType::P2wpkh,
            hash: hash160::Hash::hash(&pubkey.serialize()),
        })
    }

    /// Parse an address of any supported type for `network`.
    pub fn parse(s: &str, network: &NetworkParameters) -> Result<Self, AddressError> {
        if let Some(hrp) = network.bech32_prefix {
            if s.to_ascii_lowercase().starts_with(&format!("{}1", hrp)) {
                return Self::parse_bech32(s, network, hrp);
            }
        }

        let data = base58ck::decode_check(s).map_err(|e| AddressError::Base58(e.to_string()))?;
        if data.len() != 21 {
            return Err(AddressError::InvalidLength(data.len()));
        }
        let hash = hash160::Hash::from_slice(&data[1..])
            .map_err(|_| AddressError::InvalidLength(data.len()))?;

        let address_type = if data[0] == network.pub_key_hash_version {
            AddressType::P2pkh
        } else if data[0] == network.script_hash_version {
            AddressType::P2shP2wpkh
        } else {
            return Err(AddressError::WrongNetwork(network.symbol.to_string()));
        };

        Ok(Self {
            network: *network,
            address_type,
            hash,
        })
    }

    fn parse_bech32(s: &str, network: &NetworkParameters, hrp: &str) -> Result<Self, AddressError> {
        let (decoded_hrp, data, variant) =
            bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
        if decoded_hrp != hrp || variant != Variant::Bech32 {
            return Err(AddressError::WrongNetwork(network.symbol.to_string()));
        }
        let (version, program) = data.split_first().ok_or(AddressError::InvalidLength(0))?;
        if version.to_u8() != 0 {
            return Err(AddressError::Bech32(format!("unsupported witness version {}", version.to_u8())));
        }
        let program =
            Vec::<u8>::from_base32(program).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let hash = hash160::Hash::from_slice(&program)
            .map_err(|_| AddressError::InvalidLength(program.len()))?;

        Ok(Self {
            network: *network,
            address_type: AddressType::P2wpkh,
            hash,
        })
    }

    /// Encode the address as a string
    pub fn encode(&self) -> Result<String, AddressError> {
        match self.address_type {
            AddressType::P2pkh => Ok(base58_payload(self.network.pub_key_hash_version, &self.hash)),
            AddressType::P2shP2wpkh => {
                Ok(base58_payload(self.network.script_hash_version, &self.hash))
            }
            AddressType::P2wpkh => {
                let hrp = self
                    .network
                    .bech32_prefix
                    .ok_or_else(|| unsupported(&self.network, BipStandard::Bip84))?;
                let mut data = vec![u5::try_from_u8(0).map_err(|e| AddressError::Bech32(e.to_string()))?];
                data.extend(self.hash.to_byte_array().to_base32());
                bech32::encode(hrp, data, Variant::Bech32)
                    .map_err(|e| AddressError::Bech32(e.to_string()))
            }
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.encode().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

fn base58_payload(version: u8, hash: &hash160::Hash) -> String {
    let mut data = Vec::with_capacity(21);
    data.push(version);
    data.extend_from_slice(&hash[..]);
    base58ck::encode_check(&data)
}

fn unsupported(network: &NetworkParameters, standard: BipStandard) -> AddressError {
    AddressError::UnsupportedCapability {
        network: network.symbol.to_string(),
        standard,
    }
}

/// Encode the address of `pubkey` the way `standard` prescribes.
///
/// Segwit standards on a network without the matching capability fail with
/// [`AddressError::UnsupportedCapability`].
pub fn encode_address(
    pubkey: &PublicKey,
    network: &NetworkParameters,
    standard: BipStandard,
) -> Result<String, AddressError> {
    let address = match AddressType::for_standard(standard) {
        AddressType::P2pkh => Address::p2pkh(pubkey, network),
        AddressType::P2shP2wpkh => Address::p2sh_p2wpkh(pubkey, network)
            .map_err(|_| unsupported(network, standard))?,
        AddressType::P2wpkh => {
            Address::p2wpkh(pubkey, network).map_err(|_| unsupported(network, standard))?
        }
    };
    address.encode()
}

/// Wallet import format of a compressed private key.
pub fn wif_encode(secret: &SecretKey, network: &NetworkParameters) -> Zeroizing<String> {
    let mut data = [0u8; 34];
    data[0] = network.wif_version;
    data[1..33].copy_from_slice(&secret.secret_bytes());
    data[33] = 0x01;
    let encoded = Zeroizing::new(base58ck::encode_check(&data));
    data.zeroize();
    encoded
}

/// Decode a WIF private key, checking the network version byte.
///
/// Both compressed and uncompressed encodings are accepted; the returned flag
/// is `true` for compressed keys.
pub fn wif_decode(
    wif: &str,
    network: &NetworkParameters,
) -> Result<(SecretKey, bool), AddressError> {
    let data = Zeroizing::new(
        base58ck::decode_check(wif).map_err(|e| AddressError::Base58(e.to_string()))?,
    );
    let compressed = match data.len() {
        34 if data[33] == 0x01 => true,
        33 => false,
        _ => return Err(AddressError::InvalidWif),
    };
    if data[0] != network.wif_version {
        return Err(AddressError::WrongNetwork(network.symbol.to_string()));
    }
    let secret = SecretKey::from_slice(&data[1..33]).map_err(|_| AddressError::InvalidWif)?;
    Ok((secret, compressed))
}
