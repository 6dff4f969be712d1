//! BIP32 hierarchical deterministic key tree
//!
//! Implementation of extended private and public keys as defined at
//! <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>.
//!
//! Every curve operation takes the secp256k1 context as an explicit argument;
//! nothing in this module keeps a global context. Derived children never share
//! buffers with their parent.

use core::fmt;
use core::str::FromStr;

use bitcoin_hashes::{hash160, sha512, Hash, HashEngine, Hmac, HmacEngine};
use coin_network::{Bip32Versions, NetworkParameters, NetworkRegistry};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey, Signing, Verification};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bit marking a child number as hardened.
pub const HARDENED_OFFSET: u32 = 1 << 31;

/// Length of a serialized extended key.
pub const EXTENDED_KEY_LEN: usize = 78;

/// BIP32 errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Index does not fit in 31 bits
    #[error("child number {0} is out of range")]
    InvalidChildNumber(u32),
    /// A path segment could not be parsed
    #[error("invalid child number format: {0}")]
    InvalidChildNumberFormat(String),
    /// A path string could not be parsed
    #[error("invalid derivation path format: {0}")]
    InvalidDerivationPathFormat(String),
    /// Hardened children need the parent private key
    #[error("cannot derive a hardened child from a public key")]
    CannotDeriveHardenedFromPublic,
    /// IL >= n or the resulting key is zero; the caller should move on to the next index
    #[error("derivation produced an invalid key at child {0}")]
    DerivationOverflow(ChildNumber),
    /// Master key scalar is zero or not below the curve order
    #[error("seed produced an invalid master key")]
    InvalidMasterKey,
    /// Seeds must be between 16 and 64 bytes
    #[error("invalid seed length: {0} bytes")]
    InvalidSeedLength(usize),
    /// Depth cannot exceed 255
    #[error("maximum derivation depth exceeded")]
    MaximumDepthExceeded,
    /// Serialized key is not 78 bytes
    #[error("encoded extended key has wrong length {0}")]
    WrongExtendedKeyLength(usize),
    /// Version bytes match no known network
    #[error("unknown extended key version {0:02x?}")]
    UnknownVersion([u8; 4]),
    /// Private key data does not start with 0x00
    #[error("private key data must start with 0x00")]
    InvalidPrivateKeyPrefix,
    /// Base58Check decoding failed
    #[error("base58 decoding error: {0}")]
    Base58(String),
    /// Curve error
    #[error("secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}

/// A child number for a derived key
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildNumber {
    /// Non-hardened key
    Normal {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
    /// Hardened key
    Hardened {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
}

impl ChildNumber {
    /// Create a [`ChildNumber::Normal`] from an index, fails if the index is not within [0, 2^31 - 1].
    pub fn from_normal_idx(index: u32) -> Result<Self, Error> {
        if index & HARDENED_OFFSET == 0 {
            Ok(ChildNumber::Normal {
                index,
            })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    /// Create a [`ChildNumber::Hardened`] from an index, fails if the index is not within [0, 2^31 - 1].
    pub fn from_hardened_idx(index: u32) -> Result<Self, Error> {
        if index & HARDENED_OFFSET == 0 {
            Ok(ChildNumber::Hardened {
                index,
            })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    /// Create a normal or hardened child number from a 31-bit index.
    pub fn new(index: u32, hardened: bool) -> Result<Self, Error> {
        if hardened {
            Self::from_hardened_idx(index)
        } else {
            Self::from_normal_idx(index)
        }
    }

    /// Returns `true` if the child number is a [`ChildNumber::Hardened`] value.
    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildNumber::Hardened { .. })
    }

    /// The 31-bit index without the hardened marker.
    pub fn index(&self) -> u32 {
        match *self {
            ChildNumber::Normal {
                index,
            }
            | ChildNumber::Hardened {
                index,
            } => index,
        }
    }
}

impl From<u32> for ChildNumber {
    fn from(number: u32) -> Self {
        if number & HARDENED_OFFSET != 0 {
            ChildNumber::Hardened {
                index: number ^ HARDENED_OFFSET,
            }
        } else {
            ChildNumber::Normal {
                index: number,
            }
        }
    }
}

impl From<ChildNumber> for u32 {
    fn from(cnum: ChildNumber) -> Self {
        match cnum {
            ChildNumber::Normal {
                index,
            } => index,
            ChildNumber::Hardened {
                index,
            } => index | HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ChildNumber::Hardened {
                index,
            } => write!(f, "{}'", index),
            ChildNumber::Normal {
                index,
            } => write!(f, "{}", index),
        }
    }
}

impl fmt::Debug for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(inp: &str) -> Result<ChildNumber, Error> {
        let is_hardened = inp.ends_with('\'') || inp.ends_with('h');
        let digits = if is_hardened {
            &inp[..inp.len() - 1]
        } else {
            inp
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidChildNumberFormat(inp.to_string()));
        }
        let index: u32 =
            digits.parse().map_err(|_| Error::InvalidChildNumberFormat(inp.to_string()))?;
        ChildNumber::new(index, is_hardened)
    }
}

/// A BIP32 derivation path
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// The empty path `m`
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    /// Returns `true` if this is the master path `m`
    pub fn is_master(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of derivation steps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`DerivationPath::is_master`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a child number
    pub fn push(&mut self, child: ChildNumber) {
        self.0.push(child);
    }

    /// A new path with `child` appended
    pub fn child(&self, child: ChildNumber) -> DerivationPath {
        let mut path = self.0.clone();
        path.push(child);
        DerivationPath(path)
    }

    /// Iterate over the path steps
    pub fn iter(&self) -> core::slice::Iter<'_, ChildNumber> {
        self.0.iter()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(numbers: Vec<ChildNumber>) -> Self {
        DerivationPath(numbers)
    }
}

impl From<&[ChildNumber]> for DerivationPath {
    fn from(numbers: &[ChildNumber]) -> Self {
        DerivationPath(numbers.to_vec())
    }
}

impl AsRef<[ChildNumber]> for DerivationPath {
    fn as_ref(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = core::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<DerivationPath, Error> {
        let mut parts = path.split('/');
        if parts.next() != Some("m") {
            return Err(Error::InvalidDerivationPathFormat(path.to_string()));
        }
        let numbers = parts
            .map(|part| {
                part.parse::<ChildNumber>().map_err(|e| match e {
                    Error::InvalidChildNumberFormat(_) => {
                        Error::InvalidDerivationPathFormat(path.to_string())
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivationPath(numbers))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("m")?;
        for child in &self.0 {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Chain code of an extended key
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct ChainCode([u8; 32]);

impl ChainCode {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ChainCode(bytes)
    }

    /// Copy from a 32-byte slice; callers guarantee the length.
    fn from_slice(slice: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&slice[..32]);
        ChainCode(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for ChainCode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ChainCode(<hidden>)")
    }
}

/// First four bytes of HASH160 of a public key
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint([u8; 4]);

impl Fingerprint {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Fingerprint(bytes)
    }

    /// Raw bytes
    pub fn to_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

fn fingerprint_of(public_key: &PublicKey) -> Fingerprint {
    let hash = hash160::Hash::hash(&public_key.serialize()).to_byte_array();
    Fingerprint([hash[0], hash[1], hash[2], hash[3]])
}

/// Runs HMAC-SHA512 and splits the digest into IL and the chain code IR.
fn hmac_split(key: &[u8], data: &[&[u8]]) -> ([u8; 32], ChainCode) {
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(key);
    for chunk in data {
        engine.input(chunk);
    }
    let mut digest = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
    let mut il = [0u8; 32];
    il.copy_from_slice(&digest[..32]);
    let chain_code = ChainCode::from_slice(&digest[32..]);
    digest.zeroize();
    (il, chain_code)
}

/// Writes the common 78-byte layout, leaving the 33 key bytes to the caller.
fn encode_header(
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: Fingerprint,
    child_number: ChildNumber,
    chain_code: &ChainCode,
) -> [u8; EXTENDED_KEY_LEN] {
    let mut ret = [0u8; EXTENDED_KEY_LEN];
    ret[0..4].copy_from_slice(&version);
    ret[4] = depth;
    ret[5..9].copy_from_slice(parent_fingerprint.as_ref());
    ret[9..13].copy_from_slice(&u32::from(child_number).to_be_bytes());
    ret[13..45].copy_from_slice(chain_code.as_ref());
    ret
}

struct DecodedHeader {
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: Fingerprint,
    child_number: ChildNumber,
    chain_code: ChainCode,
}

fn decode_header(data: &[u8]) -> Result<DecodedHeader, Error> {
    if data.len() != EXTENDED_KEY_LEN {
        return Err(Error::WrongExtendedKeyLength(data.len()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&data[0..4]);
    let mut fingerprint = [0u8; 4];
    fingerprint.copy_from_slice(&data[5..9]);
    let mut child = [0u8; 4];
    child.copy_from_slice(&data[9..13]);
    Ok(DecodedHeader {
        version,
        depth: data[4],
        parent_fingerprint: Fingerprint(fingerprint),
        child_number: ChildNumber::from(u32::from_be_bytes(child)),
        chain_code: ChainCode::from_slice(&data[13..45]),
    })
}

fn decode_base58(s: &str) -> Result<Vec<u8>, Error> {
    base58ck::decode_check(s).map_err(|e| Error::Base58(e.to_string()))
}

/// Extended private key
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPrivKey {
    /// Serialization version bytes of the network this key belongs to
    pub versions: Bip32Versions,
    /// How many derivations this key is from the master (which is 0)
    pub depth: u8,
    /// Fingerprint of the parent key (0 for master)
    pub parent_fingerprint: Fingerprint,
    /// Child number of the key used to derive from parent (0 for master)
    pub child_number: ChildNumber,
    /// Private key
    pub private_key: SecretKey,
    /// Chain code
    pub chain_code: ChainCode,
}

impl Drop for ExtendedPrivKey {
    fn drop(&mut self) {
        self.private_key.non_secure_erase();
    }
}

impl ExtendedPrivKey {
    /// Construct a new master key from a seed value
    pub fn new_master(versions: Bip32Versions, seed: &[u8]) -> Result<ExtendedPrivKey, Error> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Error::InvalidSeedLength(seed.len()));
        }

        let (mut il, chain_code) = hmac_split(b"Bitcoin seed", &[seed]);
        let private_key = SecretKey::from_byte_array(&il).map_err(|_| Error::InvalidMasterKey);
        il.zeroize();

        Ok(ExtendedPrivKey {
            versions,
            depth: 0,
            parent_fingerprint: Fingerprint::default(),
            child_number: ChildNumber::from(0),
            private_key: private_key?,
            chain_code,
        })
    }

    /// Assemble a key from raw parts, as BIP85 does for its XPRV application.
    pub fn from_parts(
        versions: Bip32Versions,
        chain_code: ChainCode,
        private_key: SecretKey,
    ) -> ExtendedPrivKey {
        ExtendedPrivKey {
            versions,
            depth: 0,
            parent_fingerprint: Fingerprint::default(),
            child_number: ChildNumber::from(0),
            private_key,
            chain_code,
        }
    }

    /// Private->Private child key derivation
    pub fn ckd_priv<C: Signing>(
        &self,
        secp: &Secp256k1<C>,
        child: ChildNumber,
    ) -> Result<ExtendedPrivKey, Error> {
        let depth = self.depth.checked_add(1).ok_or(Error::MaximumDepthExceeded)?;
        let index = u32::from(child).to_be_bytes();

        let (mut il, chain_code) = match child {
            ChildNumber::Normal {
                ..
            } => {
                let public_key = PublicKey::from_secret_key(secp, &self.private_key).serialize();
                hmac_split(self.chain_code.as_ref(), &[&public_key, &index])
            }
            ChildNumber::Hardened {
                ..
            } => {
                let mut secret = self.private_key.secret_bytes();
                let split = hmac_split(self.chain_code.as_ref(), &[&[0u8], &secret, &index]);
                secret.zeroize();
                split
            }
        };

        let tweak = Scalar::from_be_bytes(il);
        il.zeroize();
        let private_key = tweak
            .ok()
            .and_then(|tweak| self.private_key.add_tweak(&tweak).ok())
            .ok_or(Error::DerivationOverflow(child))?;

        Ok(ExtendedPrivKey {
            versions: self.versions,
            depth,
            parent_fingerprint: self.fingerprint(secp),
            child_number: child,
            private_key,
            chain_code,
        })
    }

    /// Attempts to derive an extended private key from a path.
    pub fn derive_priv<C: Signing, P: AsRef<[ChildNumber]>>(
        &self,
        secp: &Secp256k1<C>,
        path: &P,
    ) -> Result<ExtendedPrivKey, Error> {
        let mut key = self.clone();
        for &child in path.as_ref() {
            key = key.ckd_priv(secp, child)?;
        }
        Ok(key)
    }

    /// Parses a textual path such as `m/44'/0'/0'/0/5` and derives along it.
    pub fn derive_path<C: Signing>(
        &self,
        secp: &Secp256k1<C>,
        path: &str,
    ) -> Result<ExtendedPrivKey, Error> {
        let path = DerivationPath::from_str(path)?;
        self.derive_priv(secp, &path)
    }

    /// Compressed public key of this node
    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        PublicKey::from_secret_key(secp, &self.private_key)
    }

    /// Returns the HASH160 of the public key belonging to the xpriv
    pub fn identifier<C: Signing>(&self, secp: &Secp256k1<C>) -> [u8; 20] {
        hash160::Hash::hash(&self.public_key(secp).serialize()).to_byte_array()
    }

    /// Returns the first four bytes of the identifier
    pub fn fingerprint<C: Signing>(&self, secp: &Secp256k1<C>) -> Fingerprint {
        fingerprint_of(&self.public_key(secp))
    }

    /// Extended private key binary encoding according to BIP 32
    pub fn encode(&self) -> [u8; EXTENDED_KEY_LEN] {
        let mut ret = encode_header(
            self.versions.private,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
        );
        ret[45] = 0;
        ret[46..78].copy_from_slice(&self.private_key.secret_bytes());
        ret
    }

    /// Decoding extended private key from binary data according to BIP 32.
    ///
    /// The public version prefix is assumed to be the matching one of the
    /// built-in networks when known, and the mainnet prefix otherwise.
    pub fn decode(data: &[u8]) -> Result<ExtendedPrivKey, Error> {
        let registry = NetworkRegistry::builtin();
        let header = decode_header(data)?;
        let versions = registry
            .by_bip32_version(header.version)
            .map(|network| network.bip32_versions)
            .find(|versions| versions.private == header.version)
            .unwrap_or(Bip32Versions {
                private: header.version,
                public: Bip32Versions::MAINNET.public,
            });
        Self::decode_with(data, versions)
    }

    fn decode_with(data: &[u8], versions: Bip32Versions) -> Result<ExtendedPrivKey, Error> {
        let header = decode_header(data)?;
        if header.version != versions.private {
            return Err(Error::UnknownVersion(header.version));
        }
        if data[45] != 0 {
            return Err(Error::InvalidPrivateKeyPrefix);
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&data[46..78]);
        let private_key = SecretKey::from_byte_array(&secret);
        secret.zeroize();

        Ok(ExtendedPrivKey {
            versions,
            depth: header.depth,
            parent_fingerprint: header.parent_fingerprint,
            child_number: header.child_number,
            private_key: private_key?,
            chain_code: header.chain_code,
        })
    }

    /// Parses a Base58Check string, accepting only version bytes of a network
    /// in `registry`.
    pub fn from_base58_in(
        s: &str,
        registry: &NetworkRegistry<'_>,
    ) -> Result<(ExtendedPrivKey, Vec<&'static str>), Error> {
        let mut data = decode_base58(s)?;
        let result = Self::decode_in(&data, registry);
        data.zeroize();
        result
    }

    fn decode_in(
        data: &[u8],
        registry: &NetworkRegistry<'_>,
    ) -> Result<(ExtendedPrivKey, Vec<&'static str>), Error> {
        let header = decode_header(data)?;
        let networks: Vec<&NetworkParameters> = registry
            .by_bip32_version(header.version)
            .filter(|network| network.bip32_versions.private == header.version)
            .collect();
        let first = networks.first().ok_or(Error::UnknownVersion(header.version))?;
        let key = Self::decode_with(data, first.bip32_versions)?;
        Ok((key, networks.iter().map(|network| network.symbol).collect()))
    }
}

impl fmt::Display for ExtendedPrivKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mut data = self.encode();
        let encoded = base58ck::encode_check(&data);
        data.zeroize();
        fmt.write_str(&encoded)
    }
}

impl fmt::Debug for ExtendedPrivKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExtendedPrivKey")
            .field("versions", &self.versions)
            .field("depth", &self.depth)
            .field("parent_fingerprint", &self.parent_fingerprint)
            .field("child_number", &self.child_number)
            .field("private_key", &"<hidden>")
            .finish()
    }
}

impl FromStr for ExtendedPrivKey {
    type Err = Error;

    fn from_str(inp: &str) -> Result<ExtendedPrivKey, Error> {
        let mut data = decode_base58(inp)?;
        let result = ExtendedPrivKey::decode(&data);
        data.zeroize();
        result
    }
}

/// Extended public key
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPubKey {
    /// Serialization version bytes of the network this key belongs to
    pub versions: Bip32Versions,
    /// How many derivations this key is from the master (which is 0)
    pub depth: u8,
    /// Fingerprint of the parent key
    pub parent_fingerprint: Fingerprint,
    /// Child number of the key used to derive from parent (0 for master)
    pub child_number: ChildNumber,
    /// Public key
    pub public_key: PublicKey,
    /// Chain code
    pub chain_code: ChainCode,
}

impl ExtendedPubKey {
    /// Derives a public key from a private key
    pub fn from_priv<C: Signing>(secp: &Secp256k1<C>, sk: &ExtendedPrivKey) -> ExtendedPubKey {
        ExtendedPubKey {
            versions: sk.versions,
            depth: sk.depth,
            parent_fingerprint: sk.parent_fingerprint,
            child_number: sk.child_number,
            public_key: sk.public_key(secp),
            chain_code: sk.chain_code.clone(),
        }
    }

    /// Public->Public child key derivation
    pub fn ckd_pub<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        child: ChildNumber,
    ) -> Result<ExtendedPubKey, Error> {
        if child.is_hardened() {
            return Err(Error::CannotDeriveHardenedFromPublic);
        }
        let depth = self.depth.checked_add(1).ok_or(Error::MaximumDepthExceeded)?;
        let index = u32::from(child).to_be_bytes();

        let (il, chain_code) =
            hmac_split(self.chain_code.as_ref(), &[&self.public_key.serialize(), &index]);
        let public_key = Scalar::from_be_bytes(il)
            .ok()
            .and_then(|tweak| self.public_key.add_exp_tweak(secp, &tweak).ok())
            .ok_or(Error::DerivationOverflow(child))?;

        Ok(ExtendedPubKey {
            versions: self.versions,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: child,
            public_key,
            chain_code,
        })
    }

    /// Attempts to derive an extended public key from a path.
    pub fn derive_pub<C: Verification, P: AsRef<[ChildNumber]>>(
        &self,
        secp: &Secp256k1<C>,
        path: &P,
    ) -> Result<ExtendedPubKey, Error> {
        let mut key = self.clone();
        for &child in path.as_ref() {
            key = key.ckd_pub(secp, child)?;
        }
        Ok(key)
    }

    /// Returns the HASH160 of the chaincode
    pub fn identifier(&self) -> [u8; 20] {
        hash160::Hash::hash(&self.public_key.serialize()).to_byte_array()
    }

    /// Returns the first four bytes of the identifier
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint_of(&self.public_key)
    }

    /// Extended public key binary encoding according to BIP 32
    pub fn encode(&self) -> [u8; EXTENDED_KEY_LEN] {
        let mut ret = encode_header(
            self.versions.public,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
        );
        ret[45..78].copy_from_slice(&self.public_key.serialize());
        ret
    }

    /// Decoding extended public key from binary data according to BIP 32
    pub fn decode(data: &[u8]) -> Result<ExtendedPubKey, Error> {
        let header = decode_header(data)?;
        let versions = NetworkRegistry::builtin()
            .by_bip32_version(header.version)
            .map(|network| network.bip32_versions)
            .find(|versions| versions.public == header.version)
            .unwrap_or(Bip32Versions {
                private: Bip32Versions::MAINNET.private,
                public: header.version,
            });
        Ok(ExtendedPubKey {
            versions,
            depth: header.depth,
            parent_fingerprint: header.parent_fingerprint,
            child_number: header.child_number,
            public_key: PublicKey::from_slice(&data[45..78])?,
            chain_code: header.chain_code,
        })
    }
}

impl fmt::Display for ExtendedPubKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&base58ck::encode_check(&self.encode()))
    }
}

impl FromStr for ExtendedPubKey {
    type Err = Error;

    fn from_str(inp: &str) -> Result<ExtendedPubKey, Error> {
        ExtendedPubKey::decode(&decode_base58(inp)?)
    }
}

/// Either half of a BIP32 node
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExtendedKey {
    /// Node holding the private scalar
    Private(ExtendedPrivKey),
    /// Public-only node
    Public(ExtendedPubKey),
}

impl ExtendedKey {
    /// Derive one child, hardened or not.
    ///
    /// Public nodes refuse hardened derivation with
    /// [`Error::CannotDeriveHardenedFromPublic`].
    pub fn derive_child<C: Signing + Verification>(
        &self,
        secp: &Secp256k1<C>,
        index: u32,
        hardened: bool,
    ) -> Result<ExtendedKey, Error> {
        let child = ChildNumber::new(index, hardened)?;
        match self {
            ExtendedKey::Private(xprv) => xprv.ckd_priv(secp, child).map(ExtendedKey::Private),
            ExtendedKey::Public(xpub) => xpub.ckd_pub(secp, child).map(ExtendedKey::Public),
        }
    }

    /// Strip private material, keeping the same node.
    pub fn neuter<C: Signing>(&self, secp: &Secp256k1<C>) -> ExtendedPubKey {
        match self {
            ExtendedKey::Private(xprv) => ExtendedPubKey::from_priv(secp, xprv),
            ExtendedKey::Public(xpub) => xpub.clone(),
        }
    }

    /// Whether this node holds private material
    pub fn is_private(&self) -> bool {
        matches!(self, ExtendedKey::Private(_))
    }

    /// Depth of the node in the tree
    pub fn depth(&self) -> u8 {
        match self {
            ExtendedKey::Private(xprv) => xprv.depth,
            ExtendedKey::Public(xpub) => xpub.depth,
        }
    }
}

impl From<ExtendedPrivKey> for ExtendedKey {
    fn from(key: ExtendedPrivKey) -> Self {
        ExtendedKey::Private(key)
    }
}

impl From<ExtendedPubKey> for ExtendedKey {
    fn from(key: ExtendedPubKey) -> Self {
        ExtendedKey::Public(key)
    }
}

impl fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtendedKey::Private(xprv) => fmt::Display::fmt(xprv, f),
            ExtendedKey::Public(xpub) => fmt::Display::fmt(xpub, f),
        }
    }
}
