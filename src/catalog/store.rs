//! カタログファイルの読み込み・マージ・保存

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use super::error::CatalogError;
use super::format::to_xcode_json;
use super::model::{
    Catalog,
    StringUnit,
};
use crate::reconcile::reconcile;
use crate::types::{
    TranslationMap,
    TranslationTask,
};

/// マージ結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 書き込んだ `(key, language)` の数
    pub applied: usize,
    /// カタログに存在しなかったため捨てたキー
    pub dropped_keys: Vec<String>,
}

impl Catalog {
    /// 翻訳結果をカタログにマージする
    ///
    /// 既存のキー・言語は削除しない。対象の `(key, language)` は
    /// `stringUnit` だけを `state = translated` で置き換え、`variations` などの
    /// その他のフィールドは保持する。
    ///
    /// カタログに存在しないキーの結果は捨て、[`MergeReport::dropped_keys`] に記録する。
    pub fn merge(&mut self, results: &TranslationMap) -> MergeReport {
        let mut report = MergeReport::default();

        for (key, languages) in results {
            let Some(entry) = self.strings.get_mut(key) else {
                tracing::warn!(key = %key, "Dropping translations for a key missing from the catalog");
                report.dropped_keys.push(key.clone());
                continue;
            };

            let localizations = entry.localizations.get_or_insert_with(BTreeMap::new);
            for (language, text) in languages {
                localizations.entry(language.clone()).or_default().string_unit =
                    Some(StringUnit::translated(text.clone()));
                report.applied += 1;
            }
        }

        report
    }
}

/// ファイルに紐づいたカタログ
///
/// メモリ上のカタログはこの構造体だけが所有し、変更は [`CatalogStore::merge`] のみで行う。
#[derive(Debug, Clone)]
pub struct CatalogStore {
    /// 保存先
    path: PathBuf,
    /// メモリ上のカタログ
    catalog: Catalog,
}

impl CatalogStore {
    /// カタログファイルを読み込む
    ///
    /// # Errors
    /// - ファイルが存在しない・読めない場合は [`CatalogError::Read`]
    /// - JSON として不正な場合は [`CatalogError::Format`]
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        tracing::debug!(path = %path.display(), "Loading catalog");

        let content = std::fs::read_to_string(&path)
            .map_err(|source| CatalogError::Read { path: path.clone(), source })?;
        let catalog: Catalog = serde_json::from_str(&content)
            .map_err(|source| CatalogError::Format { path: path.clone(), source })?;

        tracing::debug!(
            source_language = %catalog.source_language,
            entries = catalog.strings.len(),
            "Catalog loaded"
        );
        Ok(Self { path, catalog })
    }

    /// 読み込み済みのカタログから作成
    #[must_use]
    pub fn from_catalog(path: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self { path: path.into(), catalog }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn source_language(&self) -> &str {
        &self.catalog.source_language
    }

    /// See [`Catalog::target_languages`].
    #[must_use]
    pub fn target_languages(&self) -> Vec<String> {
        self.catalog.target_languages()
    }

    /// 翻訳が必要なタスクを列挙する
    #[must_use]
    pub fn find_tasks(&self, target_languages: Option<&[String]>) -> Vec<TranslationTask> {
        reconcile(&self.catalog, target_languages)
    }

    /// See [`Catalog::merge`].
    pub fn merge(&mut self, results: &TranslationMap) -> MergeReport {
        self.catalog.merge(results)
    }

    /// カタログをファイルに保存する
    ///
    /// 同じディレクトリの一時ファイルに書き込んでから置き換えるため、
    /// 失敗した場合は元のファイルがそのまま残る。
    ///
    /// # Errors
    /// シリアライズ・書き込み・置き換えに失敗した場合
    pub fn persist(&self) -> Result<(), CatalogError> {
        let bytes = to_xcode_json(&self.catalog).map_err(CatalogError::Serialize)?;
        let persist_error =
            |source: std::io::Error| CatalogError::Persist { path: self.path.clone(), source };

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(directory).map_err(persist_error)?;
        temp.write_all(&bytes).map_err(persist_error)?;
        temp.as_file().sync_all().map_err(persist_error)?;
        // 一時ファイルは 0600 で作られるので、既存ファイルのパーミッションを引き継ぐ
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            temp.as_file().set_permissions(metadata.permissions()).map_err(persist_error)?;
        }
        temp.persist(&self.path).map_err(|e| persist_error(e.error))?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Catalog persisted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::catalog::model::TranslationState;
    use crate::test_utils::{
        sample_catalog,
        translation_map,
    };

    #[googletest::test]
    fn merge_adds_and_overwrites_without_removing() {
        let mut catalog = sample_catalog();
        let before = catalog.clone();

        let report = catalog.merge(&translation_map(&[
            ("Hello", "es", "Hola"),
            ("Goodbye", "es", "Adiós"),
            ("NoLocalizations", "fr", "Sans localisations"),
        ]));

        expect_that!(report.applied, eq(3));
        expect_that!(report.dropped_keys, is_empty());

        // 既存のキー・言語はすべて残っている
        for (key, entry) in &before.strings {
            expect_that!(catalog.strings.contains_key(key), eq(true));
            for language in entry.localizations.iter().flat_map(BTreeMap::keys) {
                expect_that!(catalog.strings[key].localization(language), some(anything()));
            }
        }

        let hello_es = catalog.strings["Hello"].localization("es").unwrap();
        expect_that!(hello_es.value(), some(eq("Hola")));
        expect_that!(hello_es.state(), some(eq(&TranslationState::Translated)));

        let created = catalog.strings["NoLocalizations"].localization("fr").unwrap();
        expect_that!(created.value(), some(eq("Sans localisations")));
    }

    #[googletest::test]
    fn merge_preserves_pass_through_fields() {
        let mut catalog: Catalog = serde_json::from_value(json!({
            "sourceLanguage": "en",
            "version": "1.0",
            "strings": {
                "Items": {
                    "localizations": {
                        "de": {
                            "stringUnit": { "state": "new", "value": "Alt" },
                            "variations": { "plural": { "one": { "stringUnit": { "value": "1" } } } },
                            "extractionState": "manual"
                        },
                        "fr": {
                            "stringUnit": { "state": "translated", "value": "Articles" },
                            "variations": { "device": {} }
                        }
                    }
                }
            }
        }))
        .unwrap();

        catalog.merge(&translation_map(&[("Items", "de", "Neu")]));

        let de = catalog.strings["Items"].localization("de").unwrap();
        expect_that!(de.value(), some(eq("Neu")));
        expect_that!(de.variations, some(anything()));
        expect_that!(de.extraction_state.as_deref(), some(eq("manual")));

        let fr = catalog.strings["Items"].localization("fr").unwrap();
        expect_that!(fr.value(), some(eq("Articles")));
        expect_that!(fr.variations, some(eq(&json!({ "device": {} }))));
    }

    #[rstest]
    fn merge_drops_unknown_keys() {
        let mut catalog = sample_catalog();
        let before = catalog.clone();

        let report = catalog.merge(&translation_map(&[("Unknown", "es", "Desconocido")]));

        assert_that!(report.applied, eq(0));
        assert_that!(report.dropped_keys, elements_are![eq("Unknown")]);
        assert_that!(catalog, eq(&before));
    }

    #[googletest::test]
    fn persist_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Localizable.xcstrings");
        let mut store = CatalogStore::from_catalog(&path, sample_catalog());

        store.merge(&translation_map(&[("Goodbye", "es", "Adiós")]));
        store.persist().unwrap();

        let reloaded = CatalogStore::load(&path).unwrap();
        expect_that!(reloaded.catalog(), eq(store.catalog()));

        let text = fs::read_to_string(&path).unwrap();
        expect_that!(text, contains_substring("\"sourceLanguage\" : \"en\""));
        expect_that!(text, contains_substring("Adiós"));
    }

    #[cfg(unix)]
    #[googletest::test]
    fn persist_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Localizable.xcstrings");
        CatalogStore::from_catalog(&path, sample_catalog()).persist().unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = CatalogStore::load(&path).unwrap();
        store.merge(&translation_map(&[("Goodbye", "es", "Adiós")]));
        store.persist().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_that!(mode, eq(0o644));
    }

    #[rstest]
    fn persist_failure_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing-dir").join("Localizable.xcstrings");
        let store = CatalogStore::from_catalog(&path, sample_catalog());

        let result = store.persist();

        assert!(matches!(result, Err(CatalogError::Persist { .. })));
        assert!(!path.exists());
    }

    #[rstest]
    fn load_missing_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = CatalogStore::load(temp_dir.path().join("nope.xcstrings"));

        assert!(matches!(result, Err(CatalogError::Read { .. })));
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::missing_source_language(r#"{"version": "1.0", "strings": {}}"#)]
    #[case::wrong_type(r#"{"sourceLanguage": "en", "version": "1.0", "strings": []}"#)]
    fn load_malformed_file_is_format_error(#[case] content: &str) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.xcstrings");
        fs::write(&path, content).unwrap();

        let result = CatalogStore::load(&path);

        assert!(matches!(result, Err(CatalogError::Format { .. })));
    }
}
