//! The fixed vocabulary of storefront languages
//!
//! The store uses two spellings for every language: a short search key that
//! appears in the `supportedlang` query parameter, and the label printed in
//! the language table of each product page. Both are lower-cased here.

use crate::ConfigError;
use std::fmt;

/// A language tracked by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Language {
    key: &'static str,
    label: &'static str,
}

const fn lang(key: &'static str, label: &'static str) -> Language {
    Language { key, label }
}

/// Every language the store lists, ordered by search key
pub const LANGUAGES: &[Language] = &[
    lang("arabic", "arabic"),
    lang("brazilian", "portuguese - brazil"),
    lang("bulgarian", "bulgarian"),
    lang("czech", "czech"),
    lang("danish", "danish"),
    lang("dutch", "dutch"),
    lang("english", "english"),
    lang("finnish", "finnish"),
    lang("french", "french"),
    lang("german", "german"),
    lang("greek", "greek"),
    lang("hungarian", "hungarian"),
    lang("indonesian", "indonesian"),
    lang("italian", "italian"),
    lang("japanese", "japanese"),
    lang("koreana", "korean"),
    lang("latam", "spanish - latin america"),
    lang("norwegian", "norwegian"),
    lang("polish", "polish"),
    lang("portuguese", "portuguese - portugal"),
    lang("romanian", "romanian"),
    lang("russian", "russian"),
    lang("schinese", "simplified chinese"),
    lang("spanish", "spanish - spain"),
    lang("swedish", "swedish"),
    lang("tchinese", "traditional chinese"),
    lang("thai", "thai"),
    lang("turkish", "turkish"),
    lang("ukrainian", "ukrainian"),
    lang("vietnamese", "vietnamese"),
];

impl Language {
    /// Looks up a language by search key or table label, ignoring case
    ///
    /// # Example
    ///
    /// ```
    /// use lingo_sweep::Language;
    ///
    /// let language = Language::parse("Simplified Chinese").unwrap();
    /// assert_eq!(language.key(), "schinese");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let needle = input.trim().to_lowercase();

        LANGUAGES
            .iter()
            .copied()
            .find(|language| language.key == needle || language.label == needle)
            .ok_or_else(|| ConfigError::UnknownLanguage(input.trim().to_string()))
    }

    /// The key used in the search query and in partition file names
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The label shown in a product's language table (lower case)
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns true if a language-table label names this language
    pub fn matches_label(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.label)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key)
    }
}
