//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur during i18n operations.
///
/// Variants carry string payloads rather than wrapped source errors so the
/// enum is `Clone`: a coalesced bundle load delivers one failure to every
/// waiter sharing the in-flight future.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum I18nError {
    /// Requested language is not in the configured supported set
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Loaded bundle failed structural validation
    #[error("invalid language package for '{code}': {detail}")]
    InvalidPackage { code: String, detail: String },

    /// Bundle fetch exceeded the configured load timeout
    #[error("timed out loading language package '{0}'")]
    LoadTimeout(String),

    /// Bundle fetch failed (and the fallback chain is exhausted)
    #[error("failed to load language package '{code}': {detail}")]
    LoadFailed { code: String, detail: String },

    /// A preference storage backend failed
    #[error("storage backend '{backend}' failed: {detail}")]
    Storage { backend: String, detail: String },

    /// Failed to parse bundle content
    #[error("failed to parse language package: {0}")]
    Parse(String),

    /// IO error reading a bundle or preference file
    #[error("io error: {0}")]
    Io(String),
}

impl I18nError {
    /// Wrap a fetch-layer error for the given language code.
    pub fn load_failed(code: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            code: code.into(),
            detail: detail.to_string(),
        }
    }

    /// Wrap a storage-backend error.
    pub fn storage(backend: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Storage {
            backend: backend.into(),
            detail: detail.to_string(),
        }
    }
}
