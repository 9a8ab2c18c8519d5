//! Decides which catalog entries need (re)translation, and why.

use crate::catalog::{
    Catalog,
    Entry,
    Localization,
    TranslationState,
};
use crate::types::TranslationTask;

/// Status of one `(entry, language)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationNeed {
    /// No localization for the language.
    Missing,
    /// A localization without a review state.
    Unreviewed,
    /// Marked `new` or `needs_review`.
    Stale,
    /// Marked `translated`.
    Fresh,
    /// Marked with a state other than the three known ones. Left as is.
    Unrecognized,
}

impl TranslationNeed {
    #[must_use]
    pub const fn of(localization: Option<&Localization>) -> Self {
        let Some(localization) = localization else {
            return Self::Missing;
        };
        let Some(unit) = &localization.string_unit else {
            return Self::Unreviewed;
        };
        match &unit.state {
            None => Self::Unreviewed,
            Some(TranslationState::New | TranslationState::NeedsReview) => Self::Stale,
            Some(TranslationState::Translated) => Self::Fresh,
            Some(TranslationState::Other(_)) => Self::Unrecognized,
        }
    }

    #[must_use]
    pub const fn requires_translation(self) -> bool {
        match self {
            Self::Missing | Self::Unreviewed | Self::Stale => true,
            Self::Fresh | Self::Unrecognized => false,
        }
    }
}

/// Lists the translation tasks still required by `catalog`.
///
/// When `target_languages` is `None`, every language found in the catalog except
/// the source language is used ([`Catalog::target_languages`]). The source
/// language is never a target, and duplicate languages are ignored.
///
/// Entries without source-language text use their key as the source text.
/// Entries marked `shouldTranslate: false` are skipped.
///
/// For a fixed catalog and language list the result is always the same list.
#[must_use]
pub fn reconcile(catalog: &Catalog, target_languages: Option<&[String]>) -> Vec<TranslationTask> {
    let languages = candidate_languages(catalog, target_languages);
    let mut tasks = Vec::new();

    for (key, entry) in &catalog.strings {
        if !entry.is_translatable() {
            continue;
        }
        let source_text = source_text(catalog, key, entry);

        for language in &languages {
            if TranslationNeed::of(entry.localization(language)).requires_translation() {
                tasks.push(TranslationTask::new(
                    key.as_str(),
                    source_text,
                    language.as_str(),
                    entry.comment.clone(),
                ));
            }
        }
    }

    tracing::debug!(
        languages = ?languages,
        tasks = tasks.len(),
        "Reconciled catalog against target languages"
    );
    tasks
}

/// Target languages with the source language and duplicates removed, order kept.
fn candidate_languages(catalog: &Catalog, target_languages: Option<&[String]>) -> Vec<String> {
    let Some(requested) = target_languages else {
        return catalog.target_languages();
    };

    let mut languages: Vec<String> = Vec::with_capacity(requested.len());
    for language in requested {
        if *language != catalog.source_language && !languages.contains(language) {
            languages.push(language.clone());
        }
    }
    languages
}

/// Source-language value of the entry, or the key when there is none.
fn source_text<'a>(catalog: &Catalog, key: &'a str, entry: &'a Entry) -> &'a str {
    entry.localization(&catalog.source_language).and_then(Localization::value).unwrap_or(key)
}

/// Translation progress of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCoverage {
    pub language: String,
    pub translated: usize,
    pub untranslated: usize,
    /// Number of translatable entries.
    pub total: usize,
}

impl LanguageCoverage {
    /// Rounded-down percentage of translated entries. An empty catalog counts as complete.
    #[must_use]
    pub const fn percent(&self) -> usize {
        if self.total == 0 { 100 } else { self.translated * 100 / self.total }
    }
}

/// Per-language counts of translated and untranslated entries.
///
/// `untranslated` is exactly the number of tasks [`reconcile`] would emit for the language.
#[must_use]
pub fn coverage(catalog: &Catalog, languages: &[String]) -> Vec<LanguageCoverage> {
    let total = catalog.strings.values().filter(|entry| entry.is_translatable()).count();
    let tasks = reconcile(catalog, Some(languages));

    candidate_languages(catalog, Some(languages))
        .into_iter()
        .map(|language| {
            let untranslated = tasks.iter().filter(|task| task.target_language == language).count();
            LanguageCoverage {
                language,
                translated: total.saturating_sub(untranslated),
                untranslated,
                total,
            }
        })
        .collect()
}
