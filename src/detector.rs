//! Language detection
//!
//! Picks the best-guess active language at startup, in priority order:
//! a stored preference, then the runtime's locale list, then the configured
//! default. Synchronous and side-effect-free beyond the storage read;
//! internal failures degrade to "not found" rather than surfacing.

use crate::{I18nConfig, StorageManager};
use std::sync::Arc;

/// Where a detected language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// A previously persisted user preference
    Stored,
    /// The runtime's locale preference list
    System,
    /// The configured default language
    Default,
}

/// Result of one detection pass. Not persisted; the caller decides whether
/// to store it.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub detected_language: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
    pub source: DetectionSource,
}

/// The runtime's locale preference list.
///
/// Seam for tests and embedders; the default implementation reads the
/// process environment.
pub trait LocaleSource: Send + Sync {
    /// The primary locale, if any (e.g. "en-US").
    fn primary(&self) -> Option<String>;

    /// The ordered list of secondary locales.
    fn preferred(&self) -> Vec<String>;
}

/// Locale source backed by POSIX locale environment variables.
pub struct SystemLocaleSource;

impl LocaleSource for SystemLocaleSource {
    fn primary(&self) -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
    }

    fn preferred(&self) -> Vec<String> {
        std::env::var("LANGUAGE")
            .map(|v| {
                v.split(':')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Detects the language to activate at startup.
pub struct LanguageDetector {
    config: Arc<I18nConfig>,
    storage: Arc<StorageManager>,
    locales: Box<dyn LocaleSource>,
}

impl LanguageDetector {
    /// Create a detector reading the process environment.
    pub fn new(config: Arc<I18nConfig>, storage: Arc<StorageManager>) -> Self {
        Self::with_locale_source(config, storage, Box::new(SystemLocaleSource))
    }

    /// Create a detector with an injected locale source.
    pub fn with_locale_source(
        config: Arc<I18nConfig>,
        storage: Arc<StorageManager>,
        locales: Box<dyn LocaleSource>,
    ) -> Self {
        Self {
            config,
            storage,
            locales,
        }
    }

    /// Detect the most appropriate language.
    ///
    /// Stored preference wins outright (confidence 1.0); a supported
    /// runtime locale is next (0.8); the configured default closes the
    /// chain (0.5).
    pub fn detect_language(&self) -> DetectionResult {
        if let Some(stored) = self.storage.get_language_preference() {
            return DetectionResult {
                detected_language: stored,
                confidence: 1.0,
                source: DetectionSource::Stored,
            };
        }

        if let Some(code) = self.system_language() {
            return DetectionResult {
                detected_language: code,
                confidence: 0.8,
                source: DetectionSource::System,
            };
        }

        DetectionResult {
            detected_language: self.config.default_language.clone(),
            confidence: 0.5,
            source: DetectionSource::Default,
        }
    }

    /// Check whether a language code is in the supported set.
    pub fn is_language_supported(&self, code: &str) -> bool {
        self.config.is_supported(code)
    }

    /// First supported language in the runtime locale list, primary first.
    fn system_language(&self) -> Option<String> {
        let candidates = self
            .locales
            .primary()
            .into_iter()
            .chain(self.locales.preferred());

        for candidate in candidates {
            if let Some(code) = normalize_language_code(&candidate) {
                if self.config.is_supported(&code) {
                    return Some(code);
                }
            }
        }

        None
    }
}

/// Normalize a locale tag to a bare language code.
///
/// Takes the substring before the first `-`/`_`, strips any encoding suffix
/// (`en_US.UTF-8`), lowercases, and validates the result is 2-3 ASCII
/// letters. `None` for anything else ("C", "POSIX", empty, malformed).
pub fn normalize_language_code(tag: &str) -> Option<String> {
    let primary = tag
        .split(['-', '_'])
        .next()?
        .split('.')
        .next()?
        .to_lowercase();

    let valid = (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_lowercase());

    valid.then_some(primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    struct FakeLocales {
        primary: Option<String>,
        preferred: Vec<String>,
    }

    impl LocaleSource for FakeLocales {
        fn primary(&self) -> Option<String> {
            self.primary.clone()
        }

        fn preferred(&self) -> Vec<String> {
            self.preferred.clone()
        }
    }

    fn detector(stored: Option<&str>, primary: Option<&str>, preferred: &[&str]) -> LanguageDetector {
        let config = Arc::new(I18nConfig::default());
        let storage = Arc::new(StorageManager::with_tiers(
            Arc::clone(&config),
            vec![Box::new(MemoryBackend::new())],
        ));
        if let Some(code) = stored {
            storage.save_language_preference(code);
        }
        LanguageDetector::with_locale_source(
            config,
            storage,
            Box::new(FakeLocales {
                primary: primary.map(str::to_string),
                preferred: preferred.iter().map(|s| s.to_string()).collect(),
            }),
        )
    }

    #[test]
    fn test_stored_preference_wins_over_system_locale() {
        let d = detector(Some("ja"), Some("en-US"), &[]);

        let result = d.detect_language();
        assert_eq!(result.detected_language, "ja");
        assert_eq!(result.source, DetectionSource::Stored);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_system_locale_wins_over_default() {
        let d = detector(None, Some("en-US"), &[]);

        let result = d.detect_language();
        assert_eq!(result.detected_language, "en");
        assert_eq!(result.source, DetectionSource::System);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_secondary_locales_scanned_in_order() {
        let d = detector(None, Some("fr-FR"), &["de", "ja-JP", "en"]);

        let result = d.detect_language();
        assert_eq!(result.detected_language, "ja");
        assert_eq!(result.source, DetectionSource::System);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let d = detector(None, Some("fr-FR"), &["de", "ko"]);

        let result = d.detect_language();
        assert_eq!(result.detected_language, "zh");
        assert_eq!(result.source, DetectionSource::Default);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_default_when_no_locales_at_all() {
        let d = detector(None, None, &[]);

        let result = d.detect_language();
        assert_eq!(result.detected_language, "zh");
        assert_eq!(result.source, DetectionSource::Default);
    }

    #[test]
    fn test_normalize_language_code() {
        assert_eq!(normalize_language_code("zh-CN"), Some("zh".to_string()));
        assert_eq!(normalize_language_code("en_US.UTF-8"), Some("en".to_string()));
        assert_eq!(normalize_language_code("JA"), Some("ja".to_string()));
        assert_eq!(normalize_language_code("yue"), Some("yue".to_string()));
        assert_eq!(normalize_language_code("C"), None);
        assert_eq!(normalize_language_code("POSIX"), None);
        assert_eq!(normalize_language_code(""), None);
        assert_eq!(normalize_language_code("e"), None);
        assert_eq!(normalize_language_code("1234"), None);
    }

    #[test]
    fn test_is_language_supported() {
        let d = detector(None, None, &[]);

        assert!(d.is_language_supported("en"));
        assert!(!d.is_language_supported("fr"));
    }
}
