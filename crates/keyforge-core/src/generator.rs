//! Password generation and strength scoring
//!
//! Generated passwords draw every character independently and uniformly from the
//! union of the enabled character-class alphabets. The default RNG is the
//! thread-local CSPRNG from `rand`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{KeyforgeError, Result};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+~`|}{[]:;?><,./-=";

/// Highest score `classify` can return
pub const MAX_SCORE: u8 = 5;

/// A character class that can contribute to the generation pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
    Lowercase,
    Uppercase,
    Digits,
    Symbols,
}

impl CharacterClass {
    /// All classes, in pool order
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Lowercase,
        CharacterClass::Uppercase,
        CharacterClass::Digits,
        CharacterClass::Symbols,
    ];

    /// The fixed alphabet for this class
    pub fn alphabet(self) -> &'static str {
        match self {
            Self::Lowercase => LOWERCASE,
            Self::Uppercase => UPPERCASE,
            Self::Digits => DIGITS,
            Self::Symbols => SYMBOLS,
        }
    }
}

/// Options for password generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Number of characters to produce
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    /// Options with the given length and no class enabled
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
        }
    }

    /// Enable a character class
    pub fn enable(mut self, class: CharacterClass) -> Self {
        *self.flag_mut(class) = true;
        self
    }

    /// Disable a character class
    pub fn disable(mut self, class: CharacterClass) -> Self {
        *self.flag_mut(class) = false;
        self
    }

    /// Whether a class is enabled
    pub fn is_enabled(&self, class: CharacterClass) -> bool {
        match class {
            CharacterClass::Lowercase => self.lowercase,
            CharacterClass::Uppercase => self.uppercase,
            CharacterClass::Digits => self.digits,
            CharacterClass::Symbols => self.symbols,
        }
    }

    /// Combined alphabet of every enabled class
    pub fn pool(&self) -> Vec<char> {
        CharacterClass::ALL
            .iter()
            .filter(|class| self.is_enabled(**class))
            .flat_map(|class| class.alphabet().chars())
            .collect()
    }

    fn flag_mut(&mut self, class: CharacterClass) -> &mut bool {
        match class {
            CharacterClass::Lowercase => &mut self.lowercase,
            CharacterClass::Uppercase => &mut self.uppercase,
            CharacterClass::Digits => &mut self.digits,
            CharacterClass::Symbols => &mut self.symbols,
        }
    }
}

/// Generate a password using the thread-local CSPRNG
pub fn generate(options: &GeneratorOptions) -> Result<String> {
    generate_with(options, &mut rand::thread_rng())
}

/// Generate a password drawing from the supplied RNG
pub fn generate_with<R: Rng + ?Sized>(options: &GeneratorOptions, rng: &mut R) -> Result<String> {
    let pool = options.pool();
    if pool.is_empty() {
        return Err(KeyforgeError::EmptyPool);
    }

    let mut password = String::with_capacity(options.length);
    for _ in 0..options.length {
        // pool is non-empty, so choose always yields
        if let Some(c) = pool.choose(rng) {
            password.push(*c);
        }
    }

    Ok(password)
}

/// Score a password from 0 to 5
///
/// Length contributes +2 at 12 characters or more, +1 at 8 or more. Each of
/// uppercase, lowercase, digit and symbol (anything not ASCII alphanumeric)
/// adds +1 when present.
pub fn classify(secret: &str) -> u8 {
    let length = secret.chars().count();
    let mut score: u8 = if length >= 12 {
        2
    } else if length >= 8 {
        1
    } else {
        0
    };

    if secret.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if secret.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if secret.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if secret.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    score.min(MAX_SCORE)
}

/// Human-readable strength bucket for a `classify` score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    NotGenerated,
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl StrengthLevel {
    /// Map a score to its level; scores above 5 saturate
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::NotGenerated,
            1 => Self::VeryWeak,
            2 => Self::Weak,
            3 => Self::Medium,
            4 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    /// Classify a secret straight to a level
    pub fn of(secret: &str) -> Self {
        Self::from_score(classify(secret))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotGenerated => "Not Generated",
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

impl std::fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
