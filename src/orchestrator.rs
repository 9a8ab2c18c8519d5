//! Runs translation tasks concurrently, one worker per target language.
//!
//! Tasks of a language are split into batches of at most `batch_size`. A batch
//! runs all of its tasks at once; the next batch of the same language starts
//! after the whole batch has finished and the pacing delay has elapsed.
//! Languages do not wait for each other.
//!
//! A failed task cancels the rest of its batch and stops its language. Other
//! languages keep going, and everything finished before the failure is
//! returned with the error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::normalize::normalize;
use crate::translator::{
    TranslationError,
    TranslationRequest,
    Translator,
};
use crate::types::{
    TranslationMap,
    TranslationResult,
    TranslationTask,
    insert_result,
    translation_count,
};

/// Delay between batches of one language unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Translating '{key}' into {language} failed: {source}")]
    Translation {
        language: String,
        key: String,
        #[source]
        source: TranslationError,
        /// Results of every batch that finished before the failure.
        partial: TranslationMap,
    },

    #[error("Translation worker for {language} stopped unexpectedly")]
    WorkerPanicked { language: String, partial: TranslationMap },
}

impl OrchestratorError {
    /// Results that completed despite the failure.
    #[must_use]
    pub const fn partial(&self) -> &TranslationMap {
        match self {
            Self::Translation { partial, .. } | Self::WorkerPanicked { partial, .. } => partial,
        }
    }

    #[must_use]
    pub fn into_partial(self) -> TranslationMap {
        match self {
            Self::Translation { partial, .. } | Self::WorkerPanicked { partial, .. } => partial,
        }
    }
}

/// Why a batch stopped.
#[derive(Debug)]
enum TaskFailure {
    Translation { key: String, source: TranslationError },
    Panicked,
}

/// What a language worker hands back to the coordinator.
#[derive(Debug)]
struct GroupOutcome {
    results: Vec<TranslationResult>,
    failure: Option<TaskFailure>,
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    translator: Arc<dyn Translator>,
    /// 1 以上
    batch_size: usize,
    pacing: Duration,
}

impl fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("batch_size", &self.batch_size)
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}

impl BatchOrchestrator {
    /// A `batch_size` of 0 is treated as 1.
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>, batch_size: usize) -> Self {
        Self { translator, batch_size: batch_size.max(1), pacing: DEFAULT_PACING }
    }

    #[must_use]
    pub const fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Translates every task and collects the normalized results.
    ///
    /// # Errors
    /// The failure of the first failing language in language-code order, not the
    /// failure that happened earliest. Which error is reported does not depend on
    /// timing. The error carries the results of all batches that completed.
    pub async fn run_all(
        &self,
        tasks: Vec<TranslationTask>,
        source_language: &str,
    ) -> Result<TranslationMap, OrchestratorError> {
        let groups = partition_batches(tasks, self.batch_size);
        let source_language: Arc<str> = Arc::from(source_language);

        tracing::info!(
            languages = groups.len(),
            batch_size = self.batch_size,
            "Starting translation"
        );

        let (languages, workers): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .map(|(language, batches)| {
                let worker = tokio::spawn(run_group(
                    Arc::clone(&self.translator),
                    language.clone(),
                    batches,
                    Arc::clone(&source_language),
                    self.pacing,
                ));
                (language, worker)
            })
            .unzip();

        let outcomes = join_all(workers).await;

        let mut translations = TranslationMap::new();
        let mut first_failure = None;
        for (language, outcome) in languages.into_iter().zip(outcomes) {
            let failure = match outcome {
                Ok(group) => {
                    for result in group.results {
                        insert_result(&mut translations, result);
                    }
                    group.failure
                }
                Err(error) => {
                    tracing::warn!(language = %language, error = %error, "Translation worker panicked");
                    Some(TaskFailure::Panicked)
                }
            };
            if first_failure.is_none() {
                first_failure = failure.map(|failure| (language, failure));
            }
        }

        tracing::info!(translated = translation_count(&translations), "Translation finished");

        match first_failure {
            None => Ok(translations),
            Some((language, TaskFailure::Translation { key, source })) => {
                Err(OrchestratorError::Translation { language, key, source, partial: translations })
            }
            Some((language, TaskFailure::Panicked)) => {
                Err(OrchestratorError::WorkerPanicked { language, partial: translations })
            }
        }
    }
}

/// Groups tasks by target language and splits each group into batches of at
/// most `batch_size` tasks, keeping the input order.
#[must_use]
pub fn partition_batches(
    tasks: Vec<TranslationTask>,
    batch_size: usize,
) -> BTreeMap<String, Vec<Vec<TranslationTask>>> {
    let batch_size = batch_size.max(1);
    let mut by_language: BTreeMap<String, Vec<TranslationTask>> = BTreeMap::new();
    for task in tasks {
        by_language.entry(task.target_language.clone()).or_default().push(task);
    }

    by_language
        .into_iter()
        .map(|(language, tasks)| {
            let mut batches = Vec::with_capacity(tasks.len().div_ceil(batch_size));
            let mut rest = tasks.into_iter().peekable();
            while rest.peek().is_some() {
                batches.push(rest.by_ref().take(batch_size).collect());
            }
            (language, batches)
        })
        .collect()
}

/// 1 言語分のバッチを順番に処理する
async fn run_group(
    translator: Arc<dyn Translator>,
    language: String,
    batches: Vec<Vec<TranslationTask>>,
    source_language: Arc<str>,
    pacing: Duration,
) -> GroupOutcome {
    let total = batches.len();
    let mut results = Vec::new();

    for (index, batch) in batches.into_iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        match run_batch(&translator, batch, &source_language).await {
            Ok(batch_results) => results.extend(batch_results),
            Err(failure) => {
                tracing::warn!(language = %language, batch = index + 1, total, "Stopping language after failure");
                return GroupOutcome { results, failure: Some(failure) };
            }
        }
        tracing::debug!(language = %language, batch = index + 1, total, "Batch completed");
    }

    tracing::info!(language = %language, translated = results.len(), "Language completed");
    GroupOutcome { results, failure: None }
}

/// バッチ内のタスクを同時に実行し、全員の終了を待ってから結果を確認する
///
/// 1 つでも失敗したら残りはキャンセルされ、バッチの結果は捨てる。
async fn run_batch(
    translator: &Arc<dyn Translator>,
    batch: Vec<TranslationTask>,
    source_language: &Arc<str>,
) -> Result<Vec<TranslationResult>, TaskFailure> {
    let cancel = CancellationToken::new();
    let mut workers = JoinSet::new();

    for task in batch {
        let translator = Arc::clone(translator);
        let source_language = Arc::clone(source_language);
        let cancel = cancel.clone();
        workers.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                outcome = translate_one(translator.as_ref(), &task, &source_language) => {
                    if outcome.is_err() {
                        cancel.cancel();
                    }
                    Some(outcome.map_err(|source| TaskFailure::Translation {
                        key: task.key.clone(),
                        source,
                    }))
                }
            }
        });
    }

    let mut results = Vec::new();
    let mut failure = None;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Some(Ok(result))) => results.push(result),
            Ok(Some(Err(task_failure))) => {
                if failure.is_none() {
                    failure = Some(task_failure);
                }
            }
            // キャンセル済み
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(error = %error, "Translation task panicked");
                cancel.cancel();
                if failure.is_none() {
                    failure = Some(TaskFailure::Panicked);
                }
            }
        }
    }

    failure.map_or(Ok(results), Err)
}

async fn translate_one(
    translator: &dyn Translator,
    task: &TranslationTask,
    source_language: &str,
) -> Result<TranslationResult, TranslationError> {
    let request = TranslationRequest {
        text: &task.source_text,
        source_language,
        target_language: &task.target_language,
        context: task.comment.as_deref(),
    };

    let raw = translator.translate(&request).await?;
    let text = normalize(&raw);
    tracing::debug!(key = %task.key, language = %task.target_language, "Translated");

    Ok(TranslationResult { key: task.key.clone(), target_language: task.target_language.clone(), text })
}
