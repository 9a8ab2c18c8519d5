//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use crate::catalog::Catalog;
use crate::types::TranslationMap;

/// テスト用のカタログを作成する
///
/// - `Hello`: en は translated、es は needs_review、fr は translated（コメント付き）
/// - `Goodbye`: en のみ
/// - `Empty`: 空の localizations
/// - `NoLocalizations`: localizations なし
#[allow(clippy::unwrap_used)]
pub(crate) fn sample_catalog() -> Catalog {
    serde_json::from_str(
        r#"{
            "version": "1.0",
            "sourceLanguage": "en",
            "strings": {
                "Hello": {
                    "comment": "Greeting",
                    "localizations": {
                        "en": { "stringUnit": { "state": "translated", "value": "Hello" } },
                        "es": { "stringUnit": { "state": "needs_review", "value": "Hola" } },
                        "fr": { "stringUnit": { "state": "translated", "value": "Bonjour" } }
                    }
                },
                "Goodbye": {
                    "localizations": {
                        "en": { "stringUnit": { "state": "translated", "value": "Goodbye" } }
                    }
                },
                "Empty": { "localizations": {} },
                "NoLocalizations": {}
            }
        }"#,
    )
    .unwrap()
}

/// `(key, language, text)` の組から [`TranslationMap`] を作成する
pub(crate) fn translation_map(entries: &[(&str, &str, &str)]) -> TranslationMap {
    let mut map = TranslationMap::new();
    for (key, language, text) in entries {
        map.entry((*key).to_string())
            .or_default()
            .insert((*language).to_string(), (*text).to_string());
    }
    map
}

/// 言語コードのリストを作成する
pub(crate) fn langs(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| (*code).to_string()).collect()
}
