//! Translation content model and lookup
//!
//! A translation tree is a recursive mapping: every node is either a string
//! leaf or a nested namespace. Arrays, numbers, and other primitives are
//! unrepresentable; the loader rejects them during validation before content
//! reaches this type.
//!
//! The [`translate`] function here is the single lookup implementation shared
//! by [`I18nProvider::t`](crate::I18nProvider::t) and
//! [`Translator::t`](crate::Translator::t).

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node of a translation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationNode {
    /// A leaf translation string
    Leaf(String),
    /// A nested namespace
    Namespace(HashMap<String, TranslationNode>),
}

/// A full translation tree for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(HashMap<String, TranslationNode>);

impl Translations {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-validated JSON content.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| I18nError::Parse(e.to_string()))
    }

    /// Insert a node at a top-level key.
    pub fn insert(&mut self, key: impl Into<String>, node: TranslationNode) {
        self.0.insert(key.into(), node);
    }

    /// Get the node at a dot-delimited path, if the path exists.
    ///
    /// Traversal is total: a missing segment or a segment that descends into
    /// a leaf yields `None`, never a panic.
    pub fn get(&self, key: &str) -> Option<&TranslationNode> {
        let mut segments = key.split('.');
        let mut node = self.0.get(segments.next()?)?;

        for segment in segments {
            match node {
                TranslationNode::Namespace(map) => node = map.get(segment)?,
                TranslationNode::Leaf(_) => return None,
            }
        }

        Some(node)
    }

    /// Get the leaf string at a dot-delimited path.
    ///
    /// Returns `None` when the path is missing or resolves to a namespace
    /// rather than a leaf.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            TranslationNode::Leaf(s) => Some(s),
            TranslationNode::Namespace(_) => None,
        }
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level namespace keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// Replace `{{name}}` and `{name}` placeholders with the given values.
///
/// Double-brace tokens are replaced before single-brace ones so `{{name}}`
/// is never mangled by the single-brace pass. Placeholders without a
/// matching parameter are left verbatim.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in params {
        result = result.replace(&format!("{{{{{key}}}}}"), value);
        result = result.replace(&format!("{{{key}}}"), value);
    }

    result
}

/// Look up a dot-delimited key and interpolate parameters.
///
/// Never fails: a missing key, or a key resolving to a namespace instead of
/// a leaf, logs a warning and returns the key itself so callers always have
/// something to render.
pub fn translate(translations: &Translations, key: &str, params: &[(&str, &str)]) -> String {
    if key.is_empty() {
        tracing::warn!("empty translation key");
        return String::new();
    }

    match translations.resolve(key) {
        Some(template) => {
            if params.is_empty() {
                template.to_string()
            } else {
                interpolate(template, params)
            }
        }
        None => {
            tracing::warn!(key, "translation key not found");
            key.to_string()
        }
    }
}
