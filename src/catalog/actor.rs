//! Single-writer owner of a catalog.
//!
//! All reads, merges and saves of one catalog file go through one task that owns
//! the [`CatalogStore`]. Handles are cheap to clone and can be shared between
//! concurrent callers; commands are applied strictly in arrival order.

use tokio::sync::{
    mpsc,
    oneshot,
};

use super::error::CatalogError;
use super::model::Catalog;
use super::store::{
    CatalogStore,
    MergeReport,
};
use crate::types::{
    TranslationMap,
    TranslationTask,
};

/// Pending commands before senders start waiting.
const COMMAND_BUFFER: usize = 32;

/// Requests understood by the catalog task.
#[derive(Debug)]
enum Command {
    /// Clone of the current catalog.
    Snapshot { reply: oneshot::Sender<Catalog> },
    /// Run the reconciler against the current catalog.
    FindTasks {
        target_languages: Option<Vec<String>>,
        reply: oneshot::Sender<Vec<TranslationTask>>,
    },
    /// Merge without saving.
    Merge { results: TranslationMap, reply: oneshot::Sender<MergeReport> },
    /// Save the current catalog.
    Persist { reply: oneshot::Sender<Result<(), CatalogError>> },
    /// Merge and save as one step, so no other command runs in between.
    MergeAndPersist {
        results: TranslationMap,
        reply: oneshot::Sender<Result<MergeReport, CatalogError>>,
    },
}

/// Handle to a running catalog task.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    /// Command queue of the task.
    tx: mpsc::Sender<Command>,
}

impl CatalogHandle {
    /// Moves `store` into a new task and returns a handle to it.
    ///
    /// The task stops once every handle is dropped.
    #[must_use]
    pub fn spawn(store: CatalogStore) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    /// Sends a command built around a fresh reply channel and waits for the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CatalogError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).await.map_err(|_| CatalogError::ActorClosed)?;
        rx.await.map_err(|_| CatalogError::ActorClosed)
    }

    pub async fn snapshot(&self) -> Result<Catalog, CatalogError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn find_tasks(
        &self,
        target_languages: Option<Vec<String>>,
    ) -> Result<Vec<TranslationTask>, CatalogError> {
        self.request(|reply| Command::FindTasks { target_languages, reply }).await
    }

    pub async fn merge(&self, results: TranslationMap) -> Result<MergeReport, CatalogError> {
        self.request(|reply| Command::Merge { results, reply }).await
    }

    pub async fn persist(&self) -> Result<(), CatalogError> {
        self.request(|reply| Command::Persist { reply }).await?
    }

    pub async fn merge_and_persist(
        &self,
        results: TranslationMap,
    ) -> Result<MergeReport, CatalogError> {
        self.request(|reply| Command::MergeAndPersist { results, reply }).await?
    }
}

/// Command loop of the catalog task.
async fn run(mut store: CatalogStore, mut commands: mpsc::Receiver<Command>) {
    tracing::debug!(path = %store.path().display(), "Catalog actor started");

    while let Some(command) = commands.recv().await {
        match command {
            Command::Snapshot { reply } => {
                let _ = reply.send(store.catalog().clone());
            }
            Command::FindTasks { target_languages, reply } => {
                let _ = reply.send(store.find_tasks(target_languages.as_deref()));
            }
            Command::Merge { results, reply } => {
                let _ = reply.send(store.merge(&results));
            }
            Command::Persist { reply } => {
                let _ = reply.send(persist(&store).await);
            }
            Command::MergeAndPersist { results, reply } => {
                let report = store.merge(&results);
                let _ = reply.send(persist(&store).await.map(|()| report));
            }
        }
    }

    tracing::debug!(path = %store.path().display(), "Catalog actor stopped");
}

/// Saves a copy of the store off the async worker threads.
async fn persist(store: &CatalogStore) -> Result<(), CatalogError> {
    let snapshot = store.clone();
    tokio::task::spawn_blocking(move || snapshot.persist())
        .await
        .map_err(|_| CatalogError::ActorClosed)?
}
