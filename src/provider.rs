//! Provider: the i18n orchestrator
//!
//! Owns the translation state, runs detection once at startup, drives the
//! loader with retry and debounce, and recovers from initialization or
//! runtime errors without taking the host application down. All other
//! components are readers or intent-senders; state is mutated only here.

use crate::content::{self, Translations};
use crate::debounce::DebounceSlot;
use crate::detector::{DetectionSource, LanguageDetector, LocaleSource};
use crate::loader::{BundleSource, DirBundleSource, LanguageLoader};
use crate::retry::retry_with_delay;
use crate::storage::{PreferenceBackend, StorageManager};
use crate::translator::Translator;
use crate::{I18nConfig, I18nError, Language, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// External error-reporting hook, invoked whenever the provider's internal
/// error handler fires.
pub type ErrorHook = Box<dyn Fn(&I18nError) + Send + Sync>;

/// Translation state, exclusively owned by the provider.
struct ProviderState {
    current_language: String,
    translations: Arc<Translations>,
    is_loading: bool,
    error: Option<String>,
}

/// Builder for [`I18nProvider`], with injectable collaborators.
///
/// Defaults wire the process-environment locale source, the
/// file → session → memory storage tiers, and a filesystem bundle source
/// reading `locales/<code>.json`.
pub struct I18nProviderBuilder {
    config: I18nConfig,
    bundle_source: Option<Arc<dyn BundleSource>>,
    storage_tiers: Option<Vec<Box<dyn PreferenceBackend>>>,
    locale_source: Option<Box<dyn LocaleSource>>,
    on_error: Option<ErrorHook>,
}

impl I18nProviderBuilder {
    /// Start from a configuration.
    pub fn new(config: I18nConfig) -> Self {
        Self {
            config,
            bundle_source: None,
            storage_tiers: None,
            locale_source: None,
            on_error: None,
        }
    }

    /// Use a custom bundle source.
    pub fn bundle_source(mut self, source: Arc<dyn BundleSource>) -> Self {
        self.bundle_source = Some(source);
        self
    }

    /// Use custom preference storage tiers (most durable first).
    pub fn storage_tiers(mut self, tiers: Vec<Box<dyn PreferenceBackend>>) -> Self {
        self.storage_tiers = Some(tiers);
        self
    }

    /// Use a custom runtime locale source.
    pub fn locale_source(mut self, source: Box<dyn LocaleSource>) -> Self {
        self.locale_source = Some(source);
        self
    }

    /// Register an external error-reporting hook.
    pub fn on_error(mut self, hook: impl Fn(&I18nError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Assemble the provider.
    pub fn build(self) -> I18nProvider {
        let config = Arc::new(self.config);

        let storage = Arc::new(match self.storage_tiers {
            Some(tiers) => StorageManager::with_tiers(Arc::clone(&config), tiers),
            None => StorageManager::new(Arc::clone(&config)),
        });

        let detector = match self.locale_source {
            Some(locales) => LanguageDetector::with_locale_source(
                Arc::clone(&config),
                Arc::clone(&storage),
                locales,
            ),
            None => LanguageDetector::new(Arc::clone(&config), Arc::clone(&storage)),
        };

        let source = self
            .bundle_source
            .unwrap_or_else(|| Arc::new(DirBundleSource::new("locales")));
        let loader = LanguageLoader::new(Arc::clone(&config), source);

        let state = ProviderState {
            current_language: config.default_language.clone(),
            translations: Arc::new(Translations::new()),
            is_loading: false,
            error: None,
        };

        I18nProvider {
            config,
            storage,
            detector,
            loader,
            state: RwLock::new(state),
            debounce: DebounceSlot::new(),
            initialized: AtomicBool::new(false),
            on_error: self.on_error,
        }
    }
}

/// The i18n runtime orchestrator.
pub struct I18nProvider {
    config: Arc<I18nConfig>,
    storage: Arc<StorageManager>,
    detector: LanguageDetector,
    loader: LanguageLoader,
    state: RwLock<ProviderState>,
    debounce: DebounceSlot,
    initialized: AtomicBool,
    on_error: Option<ErrorHook>,
}

impl I18nProvider {
    /// Create a provider with default collaborators.
    pub fn new(config: I18nConfig) -> Self {
        I18nProviderBuilder::new(config).build()
    }

    /// Start building a provider with custom collaborators.
    pub fn builder(config: I18nConfig) -> I18nProviderBuilder {
        I18nProviderBuilder::new(config)
    }

    /// Initialize the runtime: clean storage, detect a language, load its
    /// bundle, commit.
    ///
    /// Runs at most once per provider; later calls are no-ops. On
    /// unrecoverable failure the provider enters the emergency state
    /// (default language, empty translations, error surfaced) so consumers
    /// keep rendering raw keys instead of crashing. The loading flag is
    /// cleared on every path.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("i18n provider already initialized");
            return;
        }

        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }

        self.storage.validate_and_clean_storage();

        let detection = self.detector.detect_language();
        tracing::debug!(
            language = detection.detected_language,
            confidence = detection.confidence,
            source = ?detection.source,
            "language detected"
        );

        let loaded = retry_with_delay(
            || self.loader.load_language(&detection.detected_language),
            self.config.max_retries,
            self.config.retry_delay,
        )
        .await;

        match loaded {
            Ok(translations) => {
                {
                    let mut state = self.state.write();
                    state.current_language = detection.detected_language.clone();
                    state.translations = translations;
                }

                // Only a system-detected language is a new fact worth
                // persisting; a stored one already is, and the default is
                // not a user choice.
                if detection.source == DetectionSource::System {
                    self.storage
                        .save_language_preference(&detection.detected_language);
                }

                tracing::info!(
                    language = detection.detected_language,
                    "i18n runtime initialized"
                );
            }
            Err(error) => {
                self.report_error(&error, "i18n initialization");

                let mut state = self.state.write();
                state.current_language = self.config.default_language.clone();
                state.translations = Arc::new(Translations::new());
            }
        }

        self.state.write().is_loading = false;
    }

    /// Switch to another supported language.
    ///
    /// Unsupported codes fail immediately: the error is surfaced and no
    /// language state changes. Valid requests are debounced; within the
    /// quiet window only the most recent request fires. On load failure the
    /// previous language and translations stay intact.
    pub async fn change_language(&self, code: &str) -> Result<()> {
        if !self.config.is_supported(code) {
            let error = I18nError::UnsupportedLanguage(code.to_string());
            self.report_error(&error, "language change");
            return Err(error);
        }

        let token = self.debounce.arm();
        if !self.debounce.expire(token, self.config.debounce_delay).await {
            tracing::debug!(code, "language change superseded");
            return Ok(());
        }

        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }

        let loaded = retry_with_delay(
            || self.loader.load_language(code),
            self.config.max_retries,
            self.config.retry_delay,
        )
        .await;

        let result = match loaded {
            Ok(translations) => {
                {
                    let mut state = self.state.write();
                    state.current_language = code.to_string();
                    state.translations = translations;
                }
                self.storage.save_language_preference(code);
                tracing::info!(code, "language switched");
                Ok(())
            }
            Err(error) => {
                self.report_error(&error, "language change");
                Err(error)
            }
        };

        self.state.write().is_loading = false;
        result
    }

    /// Translate a dot-delimited key with optional parameters.
    ///
    /// Missing keys degrade to the key string itself; this never fails.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let translations = Arc::clone(&self.state.read().translations);
        content::translate(&translations, key, params)
    }

    /// The active language code.
    pub fn current_language(&self) -> String {
        self.state.read().current_language.clone()
    }

    /// The configured supported languages.
    pub fn available_languages(&self) -> &[Language] {
        &self.config.supported_languages
    }

    /// Whether a load is in progress.
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// The last surfaced error, if any.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// The active translation tree.
    pub fn translations(&self) -> Arc<Translations> {
        Arc::clone(&self.state.read().translations)
    }

    /// The loader, for cache introspection and warmup.
    pub fn loader(&self) -> &LanguageLoader {
        &self.loader
    }

    /// The storage manager, for preference diagnostics.
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Take a read-only snapshot handle for consumers.
    pub fn translator(&self) -> Translator {
        let state = self.state.read();
        Translator::new(
            Arc::clone(&state.translations),
            state.current_language.clone(),
            state.is_loading,
            state.error.clone(),
        )
    }

    /// Cancel any pending debounced language change.
    ///
    /// Called from `Drop` as well, so a superseded request never fires
    /// after teardown.
    pub fn shutdown(&self) {
        self.debounce.cancel_all();
    }

    fn report_error(&self, error: &I18nError, context: &str) {
        tracing::error!(context, error = %error, "i18n error");
        self.state.write().error = Some(format!("{context}: {error}"));

        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }
}

impl Drop for I18nProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticBundleSource;
    use crate::storage::MemoryBackend;
    use std::time::Duration;

    fn bundle(marker: &str) -> serde_json::Value {
        serde_json::json!({
            "common": { "marker": marker, "welcome": "Welcome, {{name}}!" },
            "navigation": { "home": "Home" },
            "home": { "title": "Title" }
        })
    }

    fn fast_config() -> I18nConfig {
        I18nConfig::default()
            .with_retry(1, Duration::ZERO)
            .with_debounce_delay(Duration::ZERO)
    }

    /// Locale source with no system preference, so detection in tests is
    /// independent of the host environment.
    struct NoLocales;

    impl LocaleSource for NoLocales {
        fn primary(&self) -> Option<String> {
            None
        }

        fn preferred(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn provider_with(bundles: &[(&str, serde_json::Value)]) -> I18nProvider {
        let mut source = StaticBundleSource::new();
        for (code, value) in bundles {
            source = source.with_bundle(*code, value.clone());
        }

        I18nProvider::builder(fast_config())
            .bundle_source(Arc::new(source))
            .storage_tiers(vec![Box::new(MemoryBackend::new())])
            .locale_source(Box::new(NoLocales))
            .build()
    }

    #[tokio::test]
    async fn test_initialize_commits_default_language() {
        let provider = provider_with(&[("zh", bundle("zh")), ("en", bundle("en"))]);

        provider.initialize().await;

        assert_eq!(provider.current_language(), "zh");
        assert_eq!(provider.t("common.marker", &[]), "zh");
        assert!(!provider.is_loading());
        assert!(provider.error().is_none());
    }

    #[tokio::test]
    async fn test_initialize_is_guarded_against_reentry() {
        let provider = provider_with(&[("zh", bundle("first")), ("en", bundle("en"))]);

        provider.initialize().await;
        provider.loader().clear_cache(None);
        provider.initialize().await;

        // The second call was a no-op: still the committed translations.
        assert_eq!(provider.t("common.marker", &[]), "first");
    }

    #[tokio::test]
    async fn test_initialize_emergency_state_on_total_failure() {
        let provider = provider_with(&[]);

        provider.initialize().await;

        assert_eq!(provider.current_language(), "zh");
        assert!(provider.translations().is_empty());
        assert!(provider.error().is_some());
        assert!(!provider.is_loading());
        // Raw keys still render
        assert_eq!(provider.t("common.anything", &[]), "common.anything");
    }

    #[tokio::test]
    async fn test_change_language_commits_and_persists() {
        let provider = provider_with(&[("zh", bundle("zh")), ("en", bundle("en"))]);
        provider.initialize().await;

        provider.change_language("en").await.unwrap();

        assert_eq!(provider.current_language(), "en");
        assert_eq!(provider.t("common.marker", &[]), "en");
        assert_eq!(
            provider.storage().get_language_preference(),
            Some("en".to_string())
        );
    }

    #[tokio::test]
    async fn test_change_language_rejects_unsupported_code() {
        let provider = provider_with(&[("zh", bundle("zh")), ("en", bundle("en"))]);
        provider.initialize().await;

        let err = provider.change_language("xx").await.unwrap_err();

        assert_eq!(err, I18nError::UnsupportedLanguage("xx".to_string()));
        assert_eq!(provider.current_language(), "zh");
        assert_eq!(provider.t("common.marker", &[]), "zh");
        assert!(provider.error().is_some());
    }

    #[tokio::test]
    async fn test_failed_change_keeps_previous_state() {
        // "ja" is supported but has no bundle, and neither does the "en"
        // fallback, so the change fails end to end.
        let provider = provider_with(&[("zh", bundle("zh"))]);
        provider.initialize().await;

        let result = provider.change_language("ja").await;

        assert!(result.is_err());
        assert_eq!(provider.current_language(), "zh");
        assert_eq!(provider.t("common.marker", &[]), "zh");
        assert!(provider.error().is_some());
        assert!(!provider.is_loading());
    }

    #[tokio::test]
    async fn test_error_hook_fires() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let provider = I18nProvider::builder(fast_config())
            .bundle_source(Arc::new(StaticBundleSource::new()))
            .storage_tiers(vec![Box::new(MemoryBackend::new())])
            .locale_source(Box::new(NoLocales))
            .on_error(move |e| sink.lock().push(e.clone()))
            .build();

        provider.initialize().await;

        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_and_translator_agree() {
        let provider = provider_with(&[("zh", bundle("zh")), ("en", bundle("en"))]);
        provider.initialize().await;

        let translator = provider.translator();
        let cases: &[(&str, &[(&str, &str)])] = &[
            ("common.welcome", &[("name", "John")]),
            ("common.marker", &[]),
            ("a.b.c", &[]),
            ("common", &[]),
            ("", &[]),
        ];

        for (key, params) in cases {
            assert_eq!(provider.t(key, params), translator.t(key, params));
        }
    }
}
