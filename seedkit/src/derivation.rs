//! Key derivation functionality
//!
//! Canonical path strings for the supported BIP standards, and a builder for
//! constructing typed paths.

use core::fmt;
use core::str::FromStr;

use crate::bip32::{ChildNumber, DerivationPath, HARDENED_OFFSET};
use crate::error::{Error, Result};

/// Derivation standard selecting the path layout and address type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BipStandard {
    /// `m/<account>/<change>`, legacy addresses
    Bip32,
    /// `m/44'/<coin>'/<account>'/<change>`, legacy addresses
    #[default]
    Bip44,
    /// `m/49'/<coin>'/<account>'/<change>`, P2SH wrapped segwit
    Bip49,
    /// `m/84'/<coin>'/<account>'/<change>`, native segwit
    Bip84,
    /// `m/<account>`, native segwit
    Bip141,
}

impl BipStandard {
    /// All standards in display order
    pub const ALL: [BipStandard; 5] =
        [BipStandard::Bip32, BipStandard::Bip44, BipStandard::Bip49, BipStandard::Bip84, BipStandard::Bip141];

    /// Hardened purpose level, for the standards that have one
    pub fn purpose(&self) -> Option<u32> {
        match self {
            BipStandard::Bip44 => Some(44),
            BipStandard::Bip49 => Some(49),
            BipStandard::Bip84 => Some(84),
            BipStandard::Bip32 | BipStandard::Bip141 => None,
        }
    }
}

impl fmt::Display for BipStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BipStandard::Bip32 => "BIP32",
            BipStandard::Bip44 => "BIP44",
            BipStandard::Bip49 => "BIP49",
            BipStandard::Bip84 => "BIP84",
            BipStandard::Bip141 => "BIP141",
        };
        f.write_str(name)
    }
}

impl FromStr for BipStandard {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BipStandard::ALL
            .iter()
            .copied()
            .find(|standard| standard.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidDerivationPath(format!("unknown standard: {}", s)))
    }
}

/// Position of an address in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivationCoordinates {
    /// Purpose level; ignored by [`build_path`], which takes it from the standard
    pub purpose: u32,
    /// SLIP-44 coin type
    pub coin: u32,
    /// Account index
    pub account: u32,
    /// 0 for receiving, 1 for change
    pub change: u32,
    /// Address index
    pub index: u32,
}

impl DerivationCoordinates {
    /// Coordinates of the first receiving address of an account
    pub fn new(coin: u32, account: u32, change: u32) -> Self {
        Self {
            purpose: 0,
            coin,
            account,
            change,
            index: 0,
        }
    }

    /// Same coordinates at another address index
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }
}

fn check_level(name: &str, value: u32) -> Result<u32> {
    if value >= HARDENED_OFFSET {
        return Err(Error::InvalidDerivationPath(format!("{} {} is out of range", name, value)));
    }
    Ok(value)
}

/// Base path of an address chain, without the address index.
///
/// ```rust
/// use seedkit::derivation::{build_path, BipStandard, DerivationCoordinates};
///
/// let coords = DerivationCoordinates::new(0, 0, 0);
/// assert_eq!(build_path(&coords, BipStandard::Bip44).unwrap(), "m/44'/0'/0'/0");
/// assert_eq!(build_path(&coords, BipStandard::Bip141).unwrap(), "m/0");
/// ```
pub fn build_path(coords: &DerivationCoordinates, standard: BipStandard) -> Result<String> {
    let account = check_level("account", coords.account)?;
    match standard {
        BipStandard::Bip32 => {
            Ok(format!("m/{}/{}", account, check_level("change", coords.change)?))
        }
        BipStandard::Bip141 => Ok(format!("m/{}", account)),
        BipStandard::Bip44 | BipStandard::Bip49 | BipStandard::Bip84 => {
            let purpose = standard.purpose().unwrap_or_default();
            Ok(format!(
                "m/{}'/{}'/{}'/{}",
                purpose,
                check_level("coin", coords.coin)?,
                account,
                check_level("change", coords.change)?
            ))
        }
    }
}

/// Appends an address index to a base path.
pub fn address_path(base: &str, index: u32, hardened: bool) -> String {
    if hardened {
        format!("{}/{}'", base, index)
    } else {
        format!("{}/{}", base, index)
    }
}

/// Builder for constructing derivation paths
#[derive(Debug, Clone, Default)]
pub struct DerivationPathBuilder {
    components: Vec<ChildNumber>,
    standard: Option<BipStandard>,
    coin_type: Option<u32>,
    account: Option<u32>,
    change: Option<u32>,
    address_index: Option<u32>,
}

impl DerivationPathBuilder {
    /// Create a new derivation path builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the layout of a standard
    pub fn standard(mut self, standard: BipStandard) -> Self {
        self.standard = Some(standard);
        self
    }

    /// Set coin type
    pub fn coin_type(mut self, coin_type: u32) -> Self {
        self.coin_type = Some(coin_type);
        self
    }

    /// Set account index
    pub fn account(mut self, account: u32) -> Self {
        self.account = Some(account);
        self
    }

    /// Set change (0 for external, 1 for internal)
    pub fn change(mut self, change: u32) -> Self {
        self.change = Some(change);
        self
    }

    /// Set address index
    pub fn address_index(mut self, index: u32) -> Self {
        self.address_index = Some(index);
        self
    }

    /// Add a hardened child number
    pub fn hardened(mut self, index: u32) -> Result<Self> {
        self.components.push(ChildNumber::from_hardened_idx(index)?);
        Ok(self)
    }

    /// Add a normal (non-hardened) child number
    pub fn normal(mut self, index: u32) -> Result<Self> {
        self.components.push(ChildNumber::from_normal_idx(index)?);
        Ok(self)
    }

    /// Build the path.
    ///
    /// Explicit components win; otherwise the standard's layout is filled in
    /// from the coordinates, with zero for anything unset.
    pub fn build(self) -> Result<DerivationPath> {
        if !self.components.is_empty() {
            return Ok(DerivationPath::from(self.components));
        }

        let standard = self.standard.unwrap_or_default();
        let coords = DerivationCoordinates::new(
            self.coin_type.unwrap_or(0),
            self.account.unwrap_or(0),
            self.change.unwrap_or(0),
        );
        let mut path = build_path(&coords, standard)?;
        if let Some(index) = self.address_index {
            path = address_path(&path, index, false);
        }
        Ok(path.parse::<DerivationPath>()?)
    }
}
