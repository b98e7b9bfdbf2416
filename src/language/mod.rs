pub mod core;
pub mod source;

pub use self::core::{Language, LanguageError};
pub use source::{FixedWordSource, RandomWordSource, WordSource};

/// Embedded word lists selectable from the command line
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SupportedLanguage {
    English,
    EnglishShort,
}

impl SupportedLanguage {
    pub fn as_lang(&self) -> Result<Language, LanguageError> {
        Language::load(&self.to_string())
    }

    /// Parses the name stored in the config file, falling back to English
    pub fn from_config_name(name: &str) -> Self {
        match name {
            "english_short" => SupportedLanguage::EnglishShort,
            _ => SupportedLanguage::English,
        }
    }
}
