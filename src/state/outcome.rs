//! Per-product results produced by the extractor

use crate::catalog::Language;
use std::collections::BTreeMap;
use std::fmt;

/// Which parts of a product are localized into one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageSupport {
    pub interface: bool,
    pub audio: bool,
    pub subtitles: bool,
}

impl LanguageSupport {
    pub fn new(interface: bool, audio: bool, subtitles: bool) -> Self {
        Self {
            interface,
            audio,
            subtitles,
        }
    }
}

/// Why a product page could not be inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InaccessibleReason {
    /// The page hid its language table behind an age check
    AgeGated,

    /// The page does not exist (HTTP 404, 410 and other client errors)
    NotFound,

    /// The page was fetched but its content could not be understood
    ParseError,

    /// Retries were exhausted on network errors, 5xx or 429 responses
    Unreachable,
}

impl InaccessibleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgeGated => "age_gated",
            Self::NotFound => "not_found",
            Self::ParseError => "parse_error",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for InaccessibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result of processing one candidate link
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// The language table was read
    Accessible {
        name: String,
        /// Only requested languages the product lists appear here
        support_by_language: BTreeMap<Language, LanguageSupport>,
    },

    /// The page could not be inspected
    Inaccessible {
        uri: String,
        reason: InaccessibleReason,
    },
}

impl ScrapeOutcome {
    pub fn inaccessible(uri: impl Into<String>, reason: InaccessibleReason) -> Self {
        Self::Inaccessible {
            uri: uri.into(),
            reason,
        }
    }
}
