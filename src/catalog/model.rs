//! String catalog (`.xcstrings`) data model

use std::collections::BTreeMap;
use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

/// `stringUnit.state` の値
///
/// Xcode が知らない値を書き込むこともあるため、未知の値は `Other` として保持し、
/// そのまま書き戻す。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TranslationState {
    New,
    NeedsReview,
    Translated,
    Other(String),
}

impl TranslationState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::NeedsReview => "needs_review",
            Self::Translated => "translated",
            Self::Other(state) => state,
        }
    }
}

impl From<String> for TranslationState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => Self::New,
            "needs_review" => Self::NeedsReview,
            "translated" => Self::Translated,
            _ => Self::Other(value),
        }
    }
}

impl From<TranslationState> for String {
    fn from(state: TranslationState) -> Self {
        match state {
            TranslationState::Other(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カタログ全体（ファイルのトップレベル）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub source_language: String,

    /// キー → エントリ
    #[serde(default)]
    pub strings: BTreeMap<String, Entry>,

    pub version: String,

    /// 解釈しないフィールド（そのまま書き戻す）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 1 つのキーに対応するエントリ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<String>,

    /// `false` の場合は翻訳対象外
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_translate: Option<bool>,

    /// 言語コード → ローカライズ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizations: Option<BTreeMap<String, Localization>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 1 言語分のローカライズ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    /// 複数形のみのローカライズでは存在しない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_unit: Option<StringUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 翻訳値とそのレビュー状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TranslationState>,

    pub value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StringUnit {
    /// `state = translated` の `StringUnit` を作成
    #[must_use]
    pub fn translated(value: impl Into<String>) -> Self {
        Self { state: Some(TranslationState::Translated), value: value.into(), extra: Map::new() }
    }
}

impl Catalog {
    /// 空のカタログを作成
    #[must_use]
    pub fn new(source_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            strings: BTreeMap::new(),
            version: "1.0".to_string(),
            extra: Map::new(),
        }
    }

    /// ソース言語以外で、いずれかのエントリに現れる言語をソートして返す
    #[must_use]
    pub fn target_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .strings
            .values()
            .filter_map(|entry| entry.localizations.as_ref())
            .flat_map(BTreeMap::keys)
            .filter(|language| **language != self.source_language)
            .cloned()
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

impl Entry {
    /// ローカライズが 1 つもないエントリかどうか
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.localizations.as_ref().is_none_or(BTreeMap::is_empty)
    }

    /// 翻訳対象かどうか（`shouldTranslate` 未指定なら対象）
    #[must_use]
    pub fn is_translatable(&self) -> bool {
        self.should_translate.unwrap_or(true)
    }

    #[must_use]
    pub fn localization(&self, language: &str) -> Option<&Localization> {
        self.localizations.as_ref()?.get(language)
    }
}

impl Localization {
    /// `stringUnit.value`
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.string_unit.as_ref().map(|unit| unit.value.as_str())
    }

    /// `stringUnit.state`
    #[must_use]
    pub fn state(&self) -> Option<&TranslationState> {
        self.string_unit.as_ref()?.state.as_ref()
    }
}
