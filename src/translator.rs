//! Read-only translation handle
//!
//! A snapshot projection of the provider for consumers that only need to
//! render: the translation function plus the current language and
//! loading/error flags. Lookups inside one snapshot never observe a
//! half-committed language switch; take a fresh snapshot to see newer
//! state.

use crate::content::{self, Translations};
use std::sync::Arc;

/// Snapshot handle over the provider's state.
///
/// Obtained from [`I18nProvider::translator`](crate::I18nProvider::translator);
/// cheap to clone and to pass into rendering code.
#[derive(Clone)]
pub struct Translator {
    translations: Arc<Translations>,
    current_language: String,
    is_loading: bool,
    error: Option<String>,
}

impl Translator {
    pub(crate) fn new(
        translations: Arc<Translations>,
        current_language: String,
        is_loading: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            translations,
            current_language,
            is_loading,
            error,
        }
    }

    /// Translate a dot-delimited key with optional parameters.
    ///
    /// Same contract as [`I18nProvider::t`](crate::I18nProvider::t): both
    /// delegate to the one shared lookup, so the two can never drift apart.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        content::translate(&self.translations, key, params)
    }

    /// The language this snapshot was taken under.
    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    /// Whether a load was in progress when the snapshot was taken.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The surfaced error at snapshot time, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The underlying translation tree.
    pub fn translations(&self) -> &Translations {
        &self.translations
    }
}
