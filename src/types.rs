//! Core types used throughout the project.

use std::collections::BTreeMap;

/// Translated texts keyed by catalog key, then by language code.
///
/// Produced by the orchestrator and consumed by the catalog merge.
pub type TranslationMap = BTreeMap<String, BTreeMap<String, String>>;

/// A unit of required translation work: one key into one target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationTask {
    pub key: String,
    /// Text sent to the translator. Falls back to the key itself when the
    /// catalog holds no source-language text for the entry.
    pub source_text: String,
    pub target_language: String,
    /// Developer comment of the entry, forwarded as translation context.
    pub comment: Option<String>,
}

impl TranslationTask {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        source_text: impl Into<String>,
        target_language: impl Into<String>,
        comment: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            source_text: source_text.into(),
            target_language: target_language.into(),
            comment,
        }
    }
}

/// A normalized translation for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub key: String,
    pub target_language: String,
    pub text: String,
}

/// Inserts a result into a [`TranslationMap`], keeping other languages of the same key.
pub fn insert_result(map: &mut TranslationMap, result: TranslationResult) {
    map.entry(result.key).or_default().insert(result.target_language, result.text);
}

/// Counts `(key, language)` pairs in a [`TranslationMap`].
#[must_use]
pub fn translation_count(map: &TranslationMap) -> usize {
    map.values().map(BTreeMap::len).sum()
}
