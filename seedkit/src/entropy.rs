//! Classification of user supplied entropy
//!
//! Raw text typed by a user (dice rolls, coin flips, playing cards, hex, ...)
//! is cleaned, classified and converted into a canonical bit string. The
//! analysis never fails; unusable input simply yields zero bits.

use core::fmt;
use core::str::FromStr;

use zeroize::{Zeroize, Zeroizing};

/// Card ranks in value order
const CARD_RANKS: &[u8] = b"a23456789tjqk";
/// Card suits in value order
const CARD_SUITS: &[u8] = b"cdhs";

/// Guesses per second assumed for the crack time estimate
const GUESSES_PER_SECOND: f64 = 1e9;

/// Errors raised when turning an analysis into key material
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntropyError {
    /// The analysis holds fewer bits than requested
    #[error("not enough entropy: {required} bits required, {available} available")]
    InsufficientBits {
        /// Requested bits
        required: usize,
        /// Bits in the canonical binary string
        available: usize,
    },
    /// Requested strength is not a whole number of bytes
    #[error("entropy strength must be a multiple of 8 bits, got {0}")]
    InvalidStrength(usize),
}

/// Detected source of the entropy text
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntropyKind {
    /// `0` and `1`
    Binary,
    /// Digits `0` to `5`
    Base6,
    /// Die faces `1` to `6`
    Dice,
    /// Two character card tokens such as `ac` or `th`
    Cards,
    /// Digits `0` to `9`
    Decimal,
    /// Hexadecimal digits
    Hexadecimal,
}

impl EntropyKind {
    /// Detection order. The first kind whose predicate accepts the whole
    /// cleaned string wins.
    pub const PRIORITY: [EntropyKind; 6] = [
        EntropyKind::Binary,
        EntropyKind::Base6,
        EntropyKind::Dice,
        EntropyKind::Cards,
        EntropyKind::Decimal,
        EntropyKind::Hexadecimal,
    ];

    /// Whether a single character belongs to this kind's alphabet.
    pub fn accepts(&self, c: char) -> bool {
        match self {
            EntropyKind::Binary => matches!(c, '0' | '1'),
            EntropyKind::Base6 => matches!(c, '0'..='5'),
            EntropyKind::Dice => matches!(c, '1'..='6'),
            EntropyKind::Cards => is_card_rank(c) || is_card_suit(c),
            EntropyKind::Decimal => c.is_ascii_digit(),
            EntropyKind::Hexadecimal => c.is_ascii_hexdigit(),
        }
    }

    fn matches_all(&self, input: &str) -> bool {
        if input.is_empty() {
            return false;
        }
        match self {
            EntropyKind::Cards => {
                input.len() % 2 == 0 && input.as_bytes().chunks(2).all(|pair| card_value(pair).is_some())
            }
            kind => input.chars().all(|c| kind.accepts(c)),
        }
    }

    /// Bits produced by one input symbol (one card for [`EntropyKind::Cards`]).
    pub fn bits_per_event(&self) -> usize {
        match self {
            EntropyKind::Binary => 1,
            EntropyKind::Base6 | EntropyKind::Dice => 3,
            EntropyKind::Decimal | EntropyKind::Hexadecimal => 4,
            EntropyKind::Cards => 6,
        }
    }
}

impl fmt::Display for EntropyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            EntropyKind::Binary => "binary",
            EntropyKind::Base6 => "base6",
            EntropyKind::Dice => "dice",
            EntropyKind::Cards => "cards",
            EntropyKind::Decimal => "decimal",
            EntropyKind::Hexadecimal => "hexadecimal",
        };
        f.write_str(s)
    }
}

impl FromStr for EntropyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(EntropyKind::Binary),
            "base6" => Ok(EntropyKind::Base6),
            "dice" => Ok(EntropyKind::Dice),
            "cards" => Ok(EntropyKind::Cards),
            "decimal" => Ok(EntropyKind::Decimal),
            "hex" | "hexadecimal" => Ok(EntropyKind::Hexadecimal),
            _ => Err(format!("unknown entropy kind: {}", s)),
        }
    }
}

fn is_card_rank(c: char) -> bool {
    c.is_ascii() && CARD_RANKS.contains(&(c as u8))
}

fn is_card_suit(c: char) -> bool {
    c.is_ascii() && CARD_SUITS.contains(&(c as u8))
}

/// Value of a two byte card token, `rank * 4 + suit`, in `0..52`.
fn card_value(token: &[u8]) -> Option<u8> {
    let [rank, suit] = token else {
        return None;
    };
    let rank = CARD_RANKS.iter().position(|r| r == rank)?;
    let suit = CARD_SUITS.iter().position(|s| s == suit)?;
    Some((rank * 4 + suit) as u8)
}

/// Result of [`analyze`]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntropyAnalysis {
    /// Detected source
    pub kind: EntropyKind,
    /// Input reduced to the detected alphabet
    pub filtered: String,
    /// Canonical bit string
    pub binary: String,
    /// Length of `binary`
    pub bits: usize,
    /// Number of events (characters, or cards)
    pub event_count: usize,
    /// `2^bits`
    pub strength: f64,
    /// Human readable brute force estimate
    pub crack_time: String,
    /// Mnemonic words fully covered by the bits
    pub word_count: usize,
}

impl Drop for EntropyAnalysis {
    fn drop(&mut self) {
        self.filtered.zeroize();
        self.binary.zeroize();
    }
}

impl EntropyAnalysis {
    /// Packs the first `strength` bits of the canonical binary string into
    /// bytes, ready to be used as mnemonic entropy.
    pub fn entropy_bytes(&self, strength: usize) -> Result<Zeroizing<Vec<u8>>, EntropyError> {
        if strength % 8 != 0 {
            return Err(EntropyError::InvalidStrength(strength));
        }
        if self.bits < strength {
            return Err(EntropyError::InsufficientBits {
                required: strength,
                available: self.bits,
            });
        }

        let mut bytes = Zeroizing::new(vec![0u8; strength / 8]);
        for (i, bit) in self.binary.bytes().take(strength).enumerate() {
            if bit == b'1' {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }
        Ok(bytes)
    }
}

/// Classifies raw entropy text.
///
/// Whitespace is removed and the text is lower-cased. Characters that belong
/// to no entropy alphabet are dropped before detection, so `"101xyz010"` is
/// read as binary.
pub fn analyze(raw: &str) -> EntropyAnalysis {
    let cleaned: Zeroizing<String> = Zeroizing::new(
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .filter(|&c| EntropyKind::PRIORITY.iter().any(|kind| kind.accepts(c)))
            .collect(),
    );

    let kind = EntropyKind::PRIORITY
        .iter()
        .copied()
        .find(|kind| kind.matches_all(&cleaned))
        .unwrap_or(EntropyKind::Hexadecimal);

    let (filtered, binary, event_count) = match kind {
        EntropyKind::Cards => {
            let mut filtered = String::new();
            let mut binary = String::new();
            for token in cleaned.as_bytes().chunks(2) {
                if let Some(value) = card_value(token) {
                    filtered.extend(token.iter().map(|&b| b as char));
                    binary.push_str(&format!("{:06b}", value));
                }
            }
            let events = filtered.len() / 2;
            (filtered, binary, events)
        }
        kind => {
            let filtered: String = cleaned.chars().filter(|&c| kind.accepts(c)).collect();
            let binary = to_binary(&filtered, kind);
            let events = filtered.chars().count();
            (filtered, binary, events)
        }
    };

    let bits = binary.len();
    let strength = 2f64.powf(bits as f64);

    EntropyAnalysis {
        kind,
        filtered,
        binary,
        bits,
        event_count,
        strength,
        crack_time: crack_time(strength),
        word_count: bits / 11,
    }
}

fn to_binary(filtered: &str, kind: EntropyKind) -> String {
    let width = kind.bits_per_event();
    filtered
        .chars()
        .filter_map(|c| {
            let value = match kind {
                EntropyKind::Binary | EntropyKind::Base6 | EntropyKind::Decimal => c.to_digit(10),
                EntropyKind::Dice => c.to_digit(10).map(|d| d - 1),
                EntropyKind::Hexadecimal => c.to_digit(16),
                EntropyKind::Cards => None,
            }?;
            Some(format!("{:0width$b}", value, width = width))
        })
        .collect()
}

/// Time to search half the space at 10^9 guesses per second.
fn crack_time(strength: f64) -> String {
    let seconds = strength / 2.0 / GUESSES_PER_SECOND;

    if seconds < 60.0 {
        format!("{:.0} seconds", seconds)
    } else if seconds < 3_600.0 {
        format!("{:.0} minutes", seconds / 60.0)
    } else if seconds < 86_400.0 {
        format!("{:.0} hours", seconds / 3_600.0)
    } else if seconds < 31_536_000.0 {
        format!("{:.0} days", seconds / 86_400.0)
    } else {
        let years = seconds / 31_536_000.0;
        if years < 1e15 {
            format!("{:.0} years", years)
        } else {
            format!("{:.2e} years", years)
        }
    }
}

/// Dice rolls as entropy text, one digit per roll.
pub fn dice_rolls_to_text(rolls: &[u8]) -> String {
    rolls.iter().map(|roll| roll.to_string()).collect()
}

/// Coin flips as binary entropy text, heads is `1`.
pub fn coin_flips_to_text(flips: &[bool]) -> String {
    flips.iter().map(|&flip| if flip { '1' } else { '0' }).collect()
}
