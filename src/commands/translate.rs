use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{
    CatalogHandle,
    CatalogStore,
};
use crate::config::LocalizeSettings;
use crate::error::LocalizeError;
use crate::orchestrator::BatchOrchestrator;
use crate::translator::Translator;

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    pub settings: LocalizeSettings,
    /// 失敗時も完了した分の翻訳を保存する
    pub keep_partial: bool,
}

/// `translate` の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateSummary {
    pub source_language: String,
    pub target_languages: Vec<String>,
    /// 翻訳が必要だった `(key, language)` の数
    pub tasks: usize,
    /// カタログに書き込んだ数
    pub applied: usize,
    pub dropped_keys: Vec<String>,
}

impl fmt::Display for TranslateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source language: {}", self.source_language)?;
        writeln!(f, "Target languages: {}", self.target_languages.join(", "))?;
        if self.tasks == 0 {
            return writeln!(f, "No strings need translation");
        }
        writeln!(f, "Found {} strings needing translation", self.tasks)?;
        write!(f, "Updated catalog with {} translations", self.applied)?;
        if !self.dropped_keys.is_empty() {
            write!(f, "\nSkipped keys missing from the catalog: {}", self.dropped_keys.join(", "))?;
        }
        writeln!(f)
    }
}

/// カタログの未翻訳文字列を翻訳して保存する
///
/// 翻訳に失敗した場合、デフォルトではファイルを変更しない。
/// `keep_partial` が有効なら、完了した分をマージして保存してからエラーを返す。
/// その保存に失敗した場合もログに残すだけで、返すのは翻訳のエラー。
///
/// # Errors
/// - カタログの読み込み・保存エラー
/// - 翻訳エラー
pub async fn translate(
    path: &Path,
    translator: Arc<dyn Translator>,
    options: &TranslateOptions,
) -> Result<TranslateSummary, LocalizeError> {
    let store = CatalogStore::load(path)?;
    let source_language = store.source_language().to_string();
    let target_languages = options
        .settings
        .target_languages
        .clone()
        .unwrap_or_else(|| store.target_languages());

    tracing::info!(
        source_language = %source_language,
        target_languages = ?target_languages,
        "Loaded catalog"
    );

    let catalog = CatalogHandle::spawn(store);
    let tasks = catalog.find_tasks(Some(target_languages.clone())).await?;
    let mut summary = TranslateSummary {
        source_language,
        target_languages,
        tasks: tasks.len(),
        ..TranslateSummary::default()
    };

    if tasks.is_empty() {
        tracing::info!("No strings need translation");
        return Ok(summary);
    }

    let orchestrator = BatchOrchestrator::new(translator, options.settings.batch_size)
        .with_pacing(options.settings.pacing());

    match orchestrator.run_all(tasks, &summary.source_language).await {
        Ok(translations) => {
            let report = catalog.merge_and_persist(translations).await?;
            tracing::info!(applied = report.applied, path = %path.display(), "Catalog updated");
            summary.applied = report.applied;
            summary.dropped_keys = report.dropped_keys;
            Ok(summary)
        }
        Err(error) => {
            tracing::warn!(error = %error, "Translation failed");
            if options.keep_partial && !error.partial().is_empty() {
                // 保存に失敗しても、返すのは翻訳のエラー
                match catalog.merge_and_persist(error.partial().clone()).await {
                    Ok(report) => tracing::warn!(
                        applied = report.applied,
                        path = %path.display(),
                        "Saved completed translations before failing"
                    ),
                    Err(save_error) => tracing::error!(
                        error = %save_error,
                        path = %path.display(),
                        "Failed to save completed translations"
                    ),
                }
            } else {
                tracing::warn!(path = %path.display(), "Catalog left unchanged");
            }
            Err(error.into())
        }
    }
}
