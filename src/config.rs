//! Static i18n configuration
//!
//! Declares the supported language set, default/fallback languages, the
//! preference storage key, and the timing constants used by the loader and
//! the provider. Read-only after startup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A supported language, uniquely identified by its short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language code (ISO 639-1-like, e.g. "zh", "en", "ja")
    pub code: String,
    /// English display name
    pub name: String,
    /// Name in the language itself
    pub native_name: String,
    /// Flag emoji shown by language switchers
    pub flag: String,
}

impl Language {
    /// Create a new language entry.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        native_name: impl Into<String>,
        flag: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            native_name: native_name.into(),
            flag: flag.into(),
        }
    }
}

static DEFAULT_LANGUAGES: Lazy<Vec<Language>> = Lazy::new(|| {
    vec![
        Language::new("zh", "Chinese", "中文", "\u{1F1E8}\u{1F1F3}"),
        Language::new("en", "English", "English", "\u{1F1FA}\u{1F1F8}"),
        Language::new("ja", "Japanese", "日本語", "\u{1F1EF}\u{1F1F5}"),
    ]
});

/// Process-wide i18n configuration.
#[derive(Debug, Clone)]
pub struct I18nConfig {
    /// Language used when detection finds nothing better
    pub default_language: String,
    /// Language substituted when a requested bundle cannot be loaded
    pub fallback_language: String,
    /// The full supported language set
    pub supported_languages: Vec<Language>,
    /// Preference key used across all storage tiers
    pub storage_key: String,
    /// Upper bound on a single bundle fetch
    pub load_timeout: Duration,
    /// Retries after the first failed load attempt
    pub max_retries: u32,
    /// Fixed delay between retry attempts
    pub retry_delay: Duration,
    /// Quiet period coalescing rapid language-change requests
    pub debounce_delay: Duration,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "zh".to_string(),
            fallback_language: "en".to_string(),
            supported_languages: DEFAULT_LANGUAGES.clone(),
            storage_key: "preferred-language".to_string(),
            load_timeout: Duration::from_millis(5000),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            debounce_delay: Duration::from_millis(300),
        }
    }
}

impl I18nConfig {
    /// Create a config with the default language set and constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default language.
    pub fn with_default_language(mut self, code: impl Into<String>) -> Self {
        self.default_language = code.into();
        self
    }

    /// Set the fallback language.
    pub fn with_fallback_language(mut self, code: impl Into<String>) -> Self {
        self.fallback_language = code.into();
        self
    }

    /// Replace the supported language set.
    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.supported_languages = languages;
        self
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the bundle load timeout.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set retry count and delay.
    pub fn with_retry(mut self, max_retries: u32, delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = delay;
        self
    }

    /// Set the language-change debounce window.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Check whether a language code is in the supported set.
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported_languages.iter().any(|l| l.code == code)
    }

    /// Look up a supported language by code.
    pub fn language(&self, code: &str) -> Option<&Language> {
        self.supported_languages.iter().find(|l| l.code == code)
    }

    /// All supported language codes, in declaration order.
    pub fn supported_codes(&self) -> Vec<&str> {
        self.supported_languages
            .iter()
            .map(|l| l.code.as_str())
            .collect()
    }
}
