//! Active language resolution.

use std::fmt;

use crate::request::Request;

/// Default language when nothing was activated for a request.
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Resolves the language code active for a request.
pub trait LocaleResolver: Send + Sync + fmt::Debug {
    /// Language code (e.g. "en", "pt-br").
    fn active_language(&self, request: &Request) -> String;
}

/// Uses the language the locale layer activated on the request, or a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLanguage {
    fallback: String,
}

impl ActiveLanguage {
    /// Create a resolver with the given fallback language.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// The fallback language.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for ActiveLanguage {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl LocaleResolver for ActiveLanguage {
    fn active_language(&self, request: &Request) -> String {
        request
            .language
            .clone()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
