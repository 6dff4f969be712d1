//! BIP39 Mnemonic implementation
//!
//! The entropy/checksum/word mapping is done here; the `bip39` crate only
//! supplies the nine standard wordlists.

use core::fmt;
use core::str::FromStr;

use bip39 as bip39_crate;
use bitcoin_hashes::{sha256, Hash};
use coin_network::NetworkParameters;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::bip32::ExtendedPrivKey;
use crate::error::{Error, Result};
use crate::seed::Seed;

/// Word counts accepted by BIP39
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Phrases shorter than this get a low entropy warning
pub const MIN_RECOMMENDED_WORDS: usize = 12;

const LOW_ENTROPY_WARNING: &str =
    "Mnemonics with less than 12 words have low entropy and may be guessed by an attacker.";

/// Mnemonic codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MnemonicError {
    /// Nothing but whitespace was supplied
    #[error("mnemonic is empty")]
    EmptyInput,
    /// Word count is not 12, 15, 18, 21 or 24
    #[error("invalid word count {0}, expected 12, 15, 18, 21 or 24")]
    InvalidWordCount(usize),
    /// A word is missing from the wordlist; positions start at 1
    #[error("word {position} is not in the wordlist")]
    UnknownWord {
        /// Position of the offending word
        position: usize,
    },
    /// Checksum bits do not match the entropy
    #[error("invalid checksum")]
    InvalidChecksum,
    /// Entropy is not 128, 160, 192, 224 or 256 bits
    #[error("invalid entropy length {0} bits")]
    InvalidEntropyLength(usize),
    /// No wordlist with this name
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
    /// The operating system random source failed
    #[error("failed to generate entropy: {0}")]
    Randomness(String),
}

/// Language for mnemonic generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Language {
    #[default]
    English,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    French,
    Italian,
    Japanese,
    Korean,
    Spanish,
}

impl From<Language> for bip39_crate::Language {
    fn from(lang: Language) -> Self {
        match lang {
            Language::English => bip39_crate::Language::English,
            Language::ChineseSimplified => bip39_crate::Language::SimplifiedChinese,
            Language::ChineseTraditional => bip39_crate::Language::TraditionalChinese,
            Language::Czech => bip39_crate::Language::Czech,
            Language::French => bip39_crate::Language::French,
            Language::Italian => bip39_crate::Language::Italian,
            Language::Japanese => bip39_crate::Language::Japanese,
            Language::Korean => bip39_crate::Language::Korean,
            Language::Spanish => bip39_crate::Language::Spanish,
        }
    }
}

impl Language {
    /// Every supported language, English first.
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Japanese,
        Language::Korean,
        Language::Spanish,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::French,
        Language::Italian,
        Language::Czech,
    ];

    /// The 2048 words of this language.
    pub fn word_list(self) -> &'static [&'static str; 2048] {
        bip39_crate::Language::from(self).word_list()
    }

    /// Index of a word in the list, comparing NFKD forms.
    pub fn find_word(self, word: &str) -> Option<u16> {
        self.word_list().iter().position(|w| w.nfkd().eq(word.nfkd())).map(|i| i as u16)
    }

    /// Language code used in BIP85 derivation paths.
    pub fn bip85_index(self) -> u32 {
        match self {
            Language::English => 0,
            Language::Japanese => 1,
            Language::Korean => 2,
            Language::Spanish => 3,
            Language::ChineseSimplified => 4,
            Language::ChineseTraditional => 5,
            Language::French => 6,
            Language::Italian => 7,
            Language::Czech => 8,
        }
    }

    /// Inverse of [`Language::bip85_index`].
    pub fn from_bip85_index(index: u32) -> Option<Language> {
        Language::ALL.iter().copied().find(|lang| lang.bip85_index() == index)
    }

    fn separator(self) -> &'static str {
        match self {
            Language::Japanese => "\u{3000}",
            _ => " ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "english",
            Language::ChineseSimplified => "chinese_simplified",
            Language::ChineseTraditional => "chinese_traditional",
            Language::Czech => "czech",
            Language::French => "french",
            Language::Italian => "italian",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Spanish => "spanish",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| MnemonicError::UnknownLanguage(s.to_string()).into())
    }
}

/// Trims, lower-cases, collapses whitespace and applies NFKD.
///
/// Both generated and imported phrases go through this before any word
/// lookup or seed stretching.
pub fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    let mut collapsed = Zeroizing::new(String::with_capacity(phrase.len()));
    for word in phrase.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.extend(word.chars().flat_map(char::to_lowercase));
    }
    Zeroizing::new(collapsed.nfkd().collect())
}

/// Number of words produced from `strength` bits of entropy.
pub fn word_count_for_strength(strength: usize) -> core::result::Result<usize, MnemonicError> {
    match strength {
        128 | 160 | 192 | 224 | 256 => Ok(strength / 32 * 3),
        _ => Err(MnemonicError::InvalidEntropyLength(strength)),
    }
}

/// BIP39 Mnemonic phrase
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    phrase: Zeroizing<String>,
    language: Language,
}

impl Mnemonic {
    /// Generate a new mnemonic with the specified word count
    #[cfg(feature = "getrandom")]
    pub fn generate(word_count: usize, language: Language) -> Result<Self> {
        if !VALID_WORD_COUNTS.contains(&word_count) {
            return Err(MnemonicError::InvalidWordCount(word_count).into());
        }

        let mut entropy = Zeroizing::new(vec![0u8; word_count / 3 * 4]);
        getrandom::getrandom(&mut entropy)
            .map_err(|e| MnemonicError::Randomness(e.to_string()))?;

        Self::from_entropy(&entropy, language)
    }

    /// Generate a new mnemonic with the specified word count
    #[cfg(not(feature = "getrandom"))]
    pub fn generate(word_count: usize, _language: Language) -> Result<Self> {
        if !VALID_WORD_COUNTS.contains(&word_count) {
            return Err(MnemonicError::InvalidWordCount(word_count).into());
        }

        Err(MnemonicError::Randomness("mnemonic generation requires the getrandom feature".into())
            .into())
    }

    /// Create a mnemonic from entropy bytes
    pub fn from_entropy(entropy: &[u8], language: Language) -> Result<Self> {
        let bits = entropy.len() * 8;
        let word_count = word_count_for_strength(bits)?;
        let checksum_bits = bits / 32;
        let checksum = sha256::Hash::hash(entropy).to_byte_array()[0];

        let bit_at = |pos: usize| -> u16 {
            if pos < bits {
                ((entropy[pos / 8] >> (7 - pos % 8)) & 1) as u16
            } else {
                ((checksum >> (7 - (pos - bits))) & 1) as u16
            }
        };
        debug_assert_eq!(word_count * 11, bits + checksum_bits);

        let words = language.word_list();
        let mut raw = Zeroizing::new(String::new());
        for i in 0..word_count {
            let index = (0..11).fold(0u16, |acc, j| (acc << 1) | bit_at(i * 11 + j));
            if i > 0 {
                raw.push(' ');
            }
            raw.push_str(words[index as usize]);
        }

        // Stored in the same form `parse_in` produces.
        Ok(Self {
            phrase: normalize_phrase(&raw),
            language,
        })
    }

    /// Create a mnemonic from a phrase in a known language
    pub fn parse_in(language: Language, phrase: &str) -> Result<Self> {
        let normalized = normalize_phrase(phrase);
        let indices = Zeroizing::new(word_indices(language, &normalized)?);
        entropy_from_indices(&indices)?;

        Ok(Self {
            phrase: normalized,
            language,
        })
    }

    /// Create a mnemonic from a phrase, detecting its language
    pub fn parse(phrase: &str) -> Result<Self> {
        let normalized = normalize_phrase(phrase);
        Self::parse_in(detect_language(&normalized), &normalized)
    }

    /// Create a mnemonic from a phrase
    pub fn from_phrase(phrase: &str, language: Language) -> Result<Self> {
        Self::parse_in(language, phrase)
    }

    /// Recover the entropy the phrase encodes
    pub fn to_entropy(&self) -> Zeroizing<Vec<u8>> {
        // The phrase was validated on construction.
        word_indices(self.language, &self.phrase)
            .and_then(|indices| entropy_from_indices(&indices))
            .unwrap_or_default()
    }

    /// Get the mnemonic phrase as a string
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Iterate over the words
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.phrase.split_whitespace()
    }

    /// Get the word count
    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Language of the wordlist
    pub fn language(&self) -> Language {
        self.language
    }

    /// Convert to seed with optional passphrase
    pub fn to_seed(&self, passphrase: &str) -> Result<Seed> {
        Seed::from_mnemonic(&self.phrase, passphrase)
    }

    /// Derive extended private key from this mnemonic
    pub fn to_extended_key(
        &self,
        passphrase: &str,
        network: &NetworkParameters,
    ) -> Result<ExtendedPrivKey> {
        let seed = self.to_seed(passphrase)?;
        ExtendedPrivKey::new_master(network.bip32_versions, seed.as_bytes()).map_err(Into::into)
    }

    /// Validate a mnemonic phrase
    pub fn validate(phrase: &str) -> ValidationReport {
        validate(phrase)
    }
}

fn word_indices(
    language: Language,
    normalized: &str,
) -> core::result::Result<Vec<u16>, MnemonicError> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.is_empty() {
        return Err(MnemonicError::EmptyInput);
    }
    if !VALID_WORD_COUNTS.contains(&words.len()) {
        return Err(MnemonicError::InvalidWordCount(words.len()));
    }
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            language.find_word(word).ok_or(MnemonicError::UnknownWord {
                position: i + 1,
            })
        })
        .collect()
}

fn entropy_from_indices(indices: &[u16]) -> core::result::Result<Zeroizing<Vec<u8>>, MnemonicError> {
    let total_bits = indices.len() * 11;
    let checksum_bits = total_bits / 33;
    let entropy_bits = total_bits - checksum_bits;

    let bit_at = |pos: usize| -> u8 { ((indices[pos / 11] >> (10 - pos % 11)) & 1) as u8 };

    let mut entropy = Zeroizing::new(vec![0u8; entropy_bits / 8]);
    for pos in 0..entropy_bits {
        entropy[pos / 8] |= bit_at(pos) << (7 - pos % 8);
    }

    let actual = (0..checksum_bits).fold(0u8, |acc, i| (acc << 1) | bit_at(entropy_bits + i));
    let expected = sha256::Hash::hash(&entropy).to_byte_array()[0] >> (8 - checksum_bits);
    if actual != expected {
        return Err(MnemonicError::InvalidChecksum);
    }
    Ok(entropy)
}

/// Picks the language whose wordlist contains the most words of the phrase.
/// Ties go to the earlier entry of [`Language::ALL`].
pub fn detect_language(normalized: &str) -> Language {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let mut best = (Language::English, 0usize);
    for language in Language::ALL {
        let found = words.iter().filter(|w| language.find_word(w).is_some()).count();
        if found > best.1 {
            best = (language, found);
        }
        if found == words.len() {
            break;
        }
    }
    best.0
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationReport {
    /// Whether the phrase is a valid BIP39 mnemonic
    pub is_valid: bool,
    /// Reason for rejection
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_error"))]
    pub error: Option<MnemonicError>,
    /// Non-fatal remarks
    pub warnings: Vec<String>,
}

#[cfg(feature = "serde")]
fn serialize_error<S: serde::Serializer>(
    error: &Option<MnemonicError>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Check a user supplied phrase without raising errors.
///
/// The language is detected from the words. Phrases shorter than twelve words
/// get a low entropy warning regardless of the verdict.
pub fn validate(phrase: &str) -> ValidationReport {
    let normalized = normalize_phrase(phrase);
    let word_count = normalized.split_whitespace().count();

    let mut warnings = Vec::new();
    if word_count > 0 && word_count < MIN_RECOMMENDED_WORDS {
        warnings.push(LOW_ENTROPY_WARNING.to_string());
    }

    let language = detect_language(&normalized);
    let error = match word_indices(language, &normalized) {
        Ok(indices) => entropy_from_indices(&indices).err(),
        Err(e) => Some(e),
    };

    ValidationReport {
        is_valid: error.is_none(),
        error,
        warnings,
    }
}

impl FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Words joined with the language's separator, U+3000 for Japanese.
impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words().enumerate() {
            if i > 0 {
                f.write_str(self.language.separator())?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({}, {} words, ***)", self.language, self.word_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    #[cfg(feature = "getrandom")]
    fn test_mnemonic_generation() {
        let mnemonic = Mnemonic::generate(12, Language::English).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert!(validate(mnemonic.phrase()).is_valid);

        assert!(Mnemonic::generate(13, Language::English).is_err());
    }

    #[test]
    fn test_mnemonic_validation() {
        let report = validate(ABANDON);
        assert!(report.is_valid);
        assert!(report.error.is_none());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_normalization() {
        assert_eq!(&*normalize_phrase("  Abandon \t ABOUT\n"), "abandon about");
        let messy = format!("  {}  ", ABANDON.to_uppercase().replace(' ', "   "));
        assert_eq!(Mnemonic::parse(&messy).unwrap().phrase(), ABANDON);
    }

    #[test]
    fn test_all_zero_entropy() {
        let mnemonic = Mnemonic::from_entropy(&[0u8; 16], Language::English).unwrap();
        assert_eq!(mnemonic.phrase(), ABANDON);
        assert_eq!(&**mnemonic.to_entropy(), &[0u8; 16]);
    }

    #[test]
    fn test_distinct_errors() {
        assert_eq!(validate("").error, Some(MnemonicError::EmptyInput));
        assert_eq!(validate("abandon abandon about").error, Some(MnemonicError::InvalidWordCount(3)));

        let unknown = ABANDON.replacen("abandon", "notaword", 1);
        assert_eq!(
            validate(&unknown).error,
            Some(MnemonicError::UnknownWord {
                position: 1
            })
        );

        let bad_checksum = ABANDON.replace("about", "abandon");
        assert_eq!(validate(&bad_checksum).error, Some(MnemonicError::InvalidChecksum));
    }

    #[test]
    fn test_low_entropy_warning() {
        let report = validate("abandon abandon about");
        assert!(!report.is_valid);
        assert_eq!(report.warnings, vec![LOW_ENTROPY_WARNING.to_string()]);
    }

    #[test]
    fn test_invalid_entropy_length() {
        assert_eq!(
            Mnemonic::from_entropy(&[0u8; 17], Language::English).unwrap_err(),
            Error::Mnemonic(MnemonicError::InvalidEntropyLength(136))
        );
    }

    #[test]
    fn test_bip85_language_indices() {
        for language in Language::ALL {
            assert_eq!(Language::from_bip85_index(language.bip85_index()), Some(language));
        }
        assert_eq!(Language::from_bip85_index(9), None);
    }

    #[test]
    fn test_language_detection() {
        let spanish = Mnemonic::from_entropy(&[0x42; 16], Language::Spanish).unwrap();
        let parsed = Mnemonic::parse(spanish.phrase()).unwrap();
        assert_eq!(parsed.language(), Language::Spanish);
        assert_eq!(parsed.to_entropy(), spanish.to_entropy());
    }

    #[test]
    fn test_debug_is_redacted() {
        let mnemonic = Mnemonic::parse(ABANDON).unwrap();
        let debug = format!("{:?}", mnemonic);
        assert!(!debug.contains("abandon"));
        assert!(debug.contains("12 words"));
    }
}
