use std::io::Write;
use std::path::Path;

use crate::catalog::CatalogStore;
use crate::error::LocalizeError;
use crate::reconcile::coverage;

/// カタログの翻訳状況を `out` に書き出す
///
/// `target_languages` が `None` ならカタログに含まれる言語すべて。
///
/// # Errors
/// - カタログの読み込みエラー
/// - 書き込みエラー
pub fn info(
    path: &Path,
    target_languages: Option<&[String]>,
    out: &mut impl Write,
) -> Result<(), LocalizeError> {
    let store = CatalogStore::load(path)?;
    let languages =
        target_languages.map_or_else(|| store.target_languages(), <[String]>::to_vec);

    writeln!(out, "Source language: {}", store.source_language())?;
    writeln!(out, "Target languages: {}", languages.join(", "))?;
    writeln!(out, "Strings: {}", store.catalog().strings.len())?;

    let report = coverage(store.catalog(), &languages);
    if report.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nTranslation status:")?;
    for language in report {
        writeln!(
            out,
            "{}: {}/{} ({}%), {} untranslated",
            language.language,
            language.translated,
            language.total,
            language.percent(),
            language.untranslated
        )?;
    }

    Ok(())
}
