//! Language package loading
//!
//! Fetches, validates, and caches one translation bundle per language code.
//! Concurrent loads of the same code share a single in-flight fetch, each
//! fetch is bounded by the configured timeout, and any failure for a
//! non-fallback code resolves by loading the fallback language instead.

use crate::content::Translations;
use crate::{I18nConfig, I18nError, Result};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level namespaces every bundle must carry.
pub const REQUIRED_NAMESPACES: [&str; 3] = ["common", "navigation", "home"];

/// Where raw bundle content comes from.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Fetch the raw JSON bundle for a language code.
    async fn fetch(&self, code: &str) -> Result<Value>;
}

/// Bundle source reading `<dir>/<code>.json` from the filesystem.
pub struct DirBundleSource {
    dir: PathBuf,
}

impl DirBundleSource {
    /// Read bundles from the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BundleSource for DirBundleSource {
    async fn fetch(&self, code: &str) -> Result<Value> {
        // Codes address files; reject anything that is not a plain tag.
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(I18nError::load_failed(code, "malformed language code"));
        }

        let path = self.dir.join(format!("{code}.json"));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| I18nError::load_failed(code, format!("{}: {e}", path.display())))?;

        serde_json::from_str(&raw).map_err(|e| I18nError::Parse(e.to_string()))
    }
}

/// In-memory bundle source, for tests and embedded bundles.
#[derive(Default)]
pub struct StaticBundleSource {
    bundles: HashMap<String, Value>,
}

impl StaticBundleSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle for a language code.
    pub fn with_bundle(mut self, code: impl Into<String>, bundle: Value) -> Self {
        self.bundles.insert(code.into(), bundle);
        self
    }
}

#[async_trait]
impl BundleSource for StaticBundleSource {
    async fn fetch(&self, code: &str) -> Result<Value> {
        self.bundles
            .get(code)
            .cloned()
            .ok_or_else(|| I18nError::load_failed(code, "no bundle registered"))
    }
}

/// Outcome of validating one loaded bundle.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate bundle structure and content.
///
/// Errors (fatal): content is not an object; a required namespace is
/// missing or not an object; any leaf is neither a string nor a nested
/// object. Warnings (non-fatal): empty-string leaves.
pub fn validate_language_package(content: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(root) = content.as_object() else {
        errors.push("language package must be an object".to_string());
        return ValidationReport {
            is_valid: false,
            errors,
            warnings,
        };
    };

    for namespace in REQUIRED_NAMESPACES {
        match root.get(namespace) {
            None => errors.push(format!("missing required namespace: {namespace}")),
            Some(v) if !v.is_object() => {
                errors.push(format!("namespace '{namespace}' must be an object"))
            }
            _ => {}
        }
    }

    walk_values(root, "", &mut errors, &mut warnings);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn walk_values(
    map: &serde_json::Map<String, Value>,
    path: &str,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    for (key, value) in map {
        let current = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };

        match value {
            Value::String(s) => {
                if s.trim().is_empty() {
                    warnings.push(format!("empty translation value at {current}"));
                }
            }
            Value::Object(nested) => walk_values(nested, &current, errors, warnings),
            _ => errors.push(format!(
                "invalid translation value at {current}: expected string or namespace"
            )),
        }
    }
}

/// Cache contents snapshot.
#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub size: usize,
    pub languages: Vec<String>,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<Translations>>>>;

struct LoaderInner {
    config: Arc<I18nConfig>,
    source: Arc<dyn BundleSource>,
    cache: Mutex<HashMap<String, Arc<Translations>>>,
    in_flight: Mutex<HashMap<String, SharedLoad>>,
}

/// Asynchronous bundle loader with caching, request coalescing, and a
/// fallback-language chain.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct LanguageLoader {
    inner: Arc<LoaderInner>,
}

impl LanguageLoader {
    /// Create a loader over a bundle source.
    pub fn new(config: Arc<I18nConfig>, source: Arc<dyn BundleSource>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                config,
                source,
                cache: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Load the translation bundle for a language code.
    ///
    /// Cache hits resolve immediately. Concurrent calls for the same code
    /// share one underlying fetch. On any failure for a code other than the
    /// configured fallback language, the fallback's bundle is loaded and
    /// becomes the resolved value; it is cached under the fallback's own
    /// code only, never under the requested code.
    pub fn load_language(&self, code: &str) -> BoxFuture<'static, Result<Arc<Translations>>> {
        if let Some(hit) = self.inner.cache.lock().get(code).cloned() {
            return future::ready(Ok(hit)).boxed();
        }

        let shared = {
            let mut in_flight = self.inner.in_flight.lock();
            match in_flight.get(code) {
                Some(existing) => existing.clone(),
                None => {
                    let load = self.clone().drive_load(code.to_string()).boxed().shared();
                    in_flight.insert(code.to_string(), load.clone());
                    load
                }
            }
        };

        shared.boxed()
    }

    /// Best-effort parallel warmup; individual failures are logged and
    /// swallowed.
    pub async fn preload_languages(&self, codes: &[&str]) {
        let attempts = codes.iter().map(|code| {
            let load = self.load_language(code);
            let code = code.to_string();
            async move {
                if let Err(e) = load.await {
                    tracing::warn!(code, error = %e, "failed to preload language");
                }
            }
        });

        future::join_all(attempts).await;
    }

    /// Drop one cached bundle, or all of them.
    pub fn clear_cache(&self, code: Option<&str>) {
        let mut cache = self.inner.cache.lock();
        match code {
            Some(code) => {
                cache.remove(code);
            }
            None => cache.clear(),
        }
    }

    /// Snapshot of what is currently cached.
    pub fn cache_info(&self) -> CacheInfo {
        let cache = self.inner.cache.lock();
        let mut languages: Vec<String> = cache.keys().cloned().collect();
        languages.sort();

        CacheInfo {
            size: cache.len(),
            languages,
        }
    }

    /// Whether a bundle is cached for the given code.
    pub fn is_cached(&self, code: &str) -> bool {
        self.inner.cache.lock().contains_key(code)
    }

    async fn drive_load(self, code: String) -> Result<Arc<Translations>> {
        let result = self.resolve_load(&code).await;

        // The in-flight marker is cleared whether the load succeeded or not.
        self.inner.in_flight.lock().remove(&code);

        result
    }

    async fn resolve_load(&self, code: &str) -> Result<Arc<Translations>> {
        match self.fetch_and_validate(code).await {
            Ok(translations) => {
                self.inner
                    .cache
                    .lock()
                    .insert(code.to_string(), Arc::clone(&translations));
                tracing::debug!(code, "language package loaded");
                Ok(translations)
            }
            Err(error) if code != self.inner.config.fallback_language => {
                tracing::warn!(
                    code,
                    error = %error,
                    fallback = %self.inner.config.fallback_language,
                    "language load failed, substituting fallback"
                );
                let fallback = self.inner.config.fallback_language.clone();
                self.load_language(&fallback).await
            }
            Err(error) => Err(I18nError::load_failed(code, error)),
        }
    }

    async fn fetch_and_validate(&self, code: &str) -> Result<Arc<Translations>> {
        let fetched = tokio::time::timeout(
            self.inner.config.load_timeout,
            self.inner.source.fetch(code),
        )
        .await
        .map_err(|_| I18nError::LoadTimeout(code.to_string()))??;

        let report = validate_language_package(&fetched);
        for warning in &report.warnings {
            tracing::warn!(code, warning, "language package warning");
        }
        if !report.is_valid {
            return Err(I18nError::InvalidPackage {
                code: code.to_string(),
                detail: report.errors.join(", "),
            });
        }

        Ok(Arc::new(Translations::from_value(fetched)?))
    }
}
