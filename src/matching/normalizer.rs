//! Text normalization
//!
//! Canonicalizes raw text into a comparable token string: lowercase, strip
//! diacritics through full Unicode decomposition, drop punctuation, stem each
//! token and rejoin with single spaces.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Characters removed by the full profile
pub const PUNCTUATION: &str = "¿¡!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~";

/// Which normalization steps apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Case and diacritics only
    Light,
    /// Case, diacritics, punctuation and stemming
    #[default]
    Full,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Light => write!(f, "light"),
            Profile::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Profile::Light),
            "full" => Ok(Profile::Full),
            other => anyhow::bail!("Unknown profile '{}'. Available profiles: light, full", other),
        }
    }
}

/// Stemmer language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
    Portuguese,
    French,
    Italian,
    German,
}

impl Language {
    /// All supported languages
    pub fn all() -> &'static [&'static str] {
        &["spanish", "english", "portuguese", "french", "italian", "german"]
    }

    fn algorithm(self) -> Algorithm {
        match self {
            Language::Spanish => Algorithm::Spanish,
            Language::English => Algorithm::English,
            Language::Portuguese => Algorithm::Portuguese,
            Language::French => Algorithm::French,
            Language::Italian => Algorithm::Italian,
            Language::German => Algorithm::German,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::Spanish => "spanish",
            Language::English => "english",
            Language::Portuguese => "portuguese",
            Language::French => "french",
            Language::Italian => "italian",
            Language::German => "german",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spanish" | "es" => Ok(Language::Spanish),
            "english" | "en" => Ok(Language::English),
            "portuguese" | "pt" => Ok(Language::Portuguese),
            "french" | "fr" => Ok(Language::French),
            "italian" | "it" => Ok(Language::Italian),
            "german" | "de" => Ok(Language::German),
            other => anyhow::bail!(
                "Unknown language '{}'. Available languages: {}",
                other,
                Language::all().join(", ")
            ),
        }
    }
}

/// Stateless text normalizer.
///
/// The stemmer is owned by the normalizer and only read, so one instance can
/// serve every comparison in a session.
pub struct Normalizer {
    profile: Profile,
    language: Language,
    stemmer: Stemmer,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("profile", &self.profile)
            .field("language", &self.language)
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Profile::Full, Language::default())
    }
}

impl Normalizer {
    pub fn new(profile: Profile, language: Language) -> Self {
        Self {
            profile,
            language,
            stemmer: Stemmer::create(language.algorithm()),
        }
    }

    /// Case and diacritics only
    pub fn light() -> Self {
        Self::new(Profile::Light, Language::default())
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Normalize `text` according to the configured profile.
    ///
    /// Total over every input; the empty string maps to the empty string and
    /// the result is a fixed point (`normalize(normalize(s)) == normalize(s)`).
    pub fn normalize(&self, text: &str) -> String {
        let folded = fold(text);

        match self.profile {
            Profile::Light => folded.split_whitespace().collect::<Vec<_>>().join(" "),
            Profile::Full => {
                let stripped: String = folded.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();
                stripped
                    .split_whitespace()
                    .map(|token| self.stem(token))
                    .filter(|stem| !stem.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    }

    /// Stem a token until it stops changing.
    ///
    /// A single Snowball pass is not always a fixed point, and the ranker
    /// relies on normalized keys being stable under re-normalization.
    fn stem(&self, token: &str) -> String {
        let mut current = self.stemmer.stem(token).into_owned();
        for _ in 0..token.chars().count() {
            let next = self.stemmer.stem(&current);
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        current
    }
}

/// Lowercase, decompose and drop non-spacing marks.
///
/// Spacing (Mc) and enclosing (Me) marks stay: in scripts such as Devanagari
/// they carry the vowel and are part of the word.
fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
        .collect()
}
