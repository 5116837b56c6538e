//! Internationalization Runtime
//!
//! Provides the full i18n lifecycle for an application front end:
//!
//! - **Language Detection**: stored preference → runtime locale → default
//! - **Tiered Preference Storage**: durable → session → in-memory fallback
//! - **Bundle Loading**: async, cached, timeout-bounded, request-coalescing,
//!   with a fallback-language chain
//! - **Orchestration**: a provider owning the translation state, with retry,
//!   debounced language switching, and emergency degradation
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lattice_i18n::{I18nConfig, I18nProvider};
//!
//! let provider = I18nProvider::new(I18nConfig::default());
//! provider.initialize().await;
//!
//! // Translate, with parameter interpolation
//! let msg = provider.t("common.welcome", &[("name", "Alice")]);
//!
//! // Switch languages (debounced, persisted)
//! provider.change_language("ja").await?;
//!
//! // Hand a read-only snapshot to rendering code
//! let tr = provider.translator();
//! let title = tr.t("home.title", &[]);
//! ```
//!
//! Missing translations always degrade to the raw key string; the runtime
//! never leaves the host blocked or crashed over a failed load.

mod boundary;
mod config;
mod content;
mod debounce;
mod detector;
mod error;
mod loader;
mod provider;
mod retry;
mod storage;
mod translator;

pub use boundary::{RenderGuard, RECOVERY_MESSAGE};
pub use config::{I18nConfig, Language};
pub use content::{interpolate, translate, TranslationNode, Translations};
pub use debounce::DebounceSlot;
pub use detector::{
    normalize_language_code, DetectionResult, DetectionSource, LanguageDetector, LocaleSource,
    SystemLocaleSource,
};
pub use error::I18nError;
pub use loader::{
    validate_language_package, BundleSource, CacheInfo, DirBundleSource, LanguageLoader,
    StaticBundleSource, ValidationReport, REQUIRED_NAMESPACES,
};
pub use provider::{ErrorHook, I18nProvider, I18nProviderBuilder};
pub use retry::retry_with_delay;
pub use storage::{
    FileBackend, MemoryBackend, PreferenceBackend, StorageInfo, StorageManager, TempFileBackend,
    TierStatus,
};
pub use translator::Translator;

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        translate, I18nConfig, I18nError, I18nProvider, Language, LanguageLoader, Result,
        StorageManager, TranslationNode, Translations, Translator,
    };
}
