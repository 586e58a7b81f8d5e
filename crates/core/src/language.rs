//! Language definitions for the advisory UI locales
//!
//! The advisory and live-conversation flows render all model output in the
//! user's language; keys and schema field names stay canonical English.
//! Each language also pins the prebuilt narration voice used for speech
//! synthesis and live sessions.

use serde::{Deserialize, Serialize};

/// Default narration voice, used when a locale has no dedicated entry.
pub const DEFAULT_VOICE: &str = "Zephyr";

/// Supported languages (English + 11 Indian languages)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Gujarati,
    Punjabi,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Odia,
    Assamese,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Gujarati => "gu",
            Self::Punjabi => "pa",
            Self::Bengali => "bn",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Odia => "or",
            Self::Assamese => "as",
        }
    }

    /// Human-readable English name, used in language directives to the model
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Gujarati => "Gujarati",
            Self::Punjabi => "Punjabi",
            Self::Bengali => "Bengali",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Odia => "Odia",
            Self::Assamese => "Assamese",
        }
    }

    /// Native-script name, shown in the language selector
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "हिन्दी",
            Self::Marathi => "मराठी",
            Self::Gujarati => "ગુજરાતી",
            Self::Punjabi => "ਪੰਜਾਬੀ",
            Self::Bengali => "বাংলা",
            Self::Tamil => "தமிழ்",
            Self::Telugu => "తెలుగు",
            Self::Kannada => "ಕನ್ನಡ",
            Self::Malayalam => "മലയാളം",
            Self::Odia => "ଓଡ଼ିଆ",
            Self::Assamese => "অসমীয়া",
        }
    }

    /// Prebuilt narration voice pinned to this language
    pub fn voice(&self) -> &'static str {
        match self {
            Self::English => "Zephyr",
            Self::Hindi => "Kore",
            Self::Marathi => "Puck",
            Self::Gujarati => "Charon",
            Self::Punjabi => "Fenrir",
            Self::Bengali => "Leda",
            Self::Tamil => "Aoede",
            Self::Telugu => "Orus",
            Self::Kannada => "Autonoe",
            Self::Malayalam => "Enceladus",
            Self::Odia => "Iapetus",
            Self::Assamese => "Umbriel",
        }
    }

    /// Parse an ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::English),
            "hi" => Some(Self::Hindi),
            "mr" => Some(Self::Marathi),
            "gu" => Some(Self::Gujarati),
            "pa" => Some(Self::Punjabi),
            "bn" => Some(Self::Bengali),
            "ta" => Some(Self::Tamil),
            "te" => Some(Self::Telugu),
            "kn" => Some(Self::Kannada),
            "ml" => Some(Self::Malayalam),
            "or" => Some(Self::Odia),
            "as" => Some(Self::Assamese),
            _ => None,
        }
    }

    /// All supported languages
    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Hindi,
            Self::Marathi,
            Self::Gujarati,
            Self::Punjabi,
            Self::Bengali,
            Self::Tamil,
            Self::Telugu,
            Self::Kannada,
            Self::Malayalam,
            Self::Odia,
            Self::Assamese,
        ]
    }
}

/// Resolve the narration voice for a raw locale code, falling back to
/// [`DEFAULT_VOICE`] on unknown locales.
pub fn voice_for_locale(code: &str) -> &'static str {
    Language::from_code(code).map_or(DEFAULT_VOICE, |l| l.voice())
}
