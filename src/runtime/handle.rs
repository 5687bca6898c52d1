use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    core::{
        normalize::{NoteOrigin, new_wine_id, normalize, now_ms},
        store::StoreError,
    },
    persist::{PersistError, journal::Journal},
    synth::{SynthesisError, client::WineSynthesizer},
    types::{SortBy, WineId},
    wine::{WineNote, WinePatch},
};

use super::events::JournalEvent;

/// Failures surfaced through [`JournalHandle`].
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Persisting the change failed; the change was not kept.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// The AI service could not produce a record; nothing was stored.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    /// The journal task has shut down.
    #[error("journal task is not running")]
    ChannelClosed,
}

/// Channel sizing for the journal task.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending command capacity.
    pub command_queue_bound: usize,
    /// Broadcast buffer for [`JournalEvent`]s.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

/// Cloneable async front end to the journal task.
///
/// Synthesis runs on the caller's task; only the resulting insert goes
/// through the single writer, so reads are never blocked by a slow AI call.
#[derive(Clone)]
pub struct JournalHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<JournalEvent>,
    synthesizer: WineSynthesizer,
}

enum Command {
    Insert {
        note: WineNote,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Replace {
        id: WineId,
        note: WineNote,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Patch {
        id: WineId,
        patch: WinePatch,
        resp: oneshot::Sender<Result<Option<WineNote>, RuntimeError>>,
    },
    Remove {
        id: WineId,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Get {
        id: WineId,
        resp: oneshot::Sender<Option<WineNote>>,
    },
    Sorted {
        by: SortBy,
        resp: oneshot::Sender<Vec<WineNote>>,
    },
    Export {
        resp: oneshot::Sender<Result<String, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `journal` onto a dedicated blocking thread and returns a handle.
///
/// Must be called from within a tokio runtime.
pub fn spawn_journal(
    journal: Journal,
    synthesizer: WineSynthesizer,
    config: RuntimeConfig,
) -> JournalHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<JournalEvent>(config.event_capacity);
    let events_tx_loop = events_tx.clone();

    // Storage backends are synchronous; keep them off the async workers.
    tokio::task::spawn_blocking(move || {
        let mut journal = journal;
        info!(records = journal.store().len(), "journal task started");
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if handle_command(cmd, &mut journal, &events_tx_loop) {
                break;
            }
        }
        info!("journal task stopped");
    });

    JournalHandle {
        cmd_tx,
        events_tx,
        synthesizer,
    }
}

impl JournalHandle {
    /// Subscribes to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<JournalEvent> {
        self.events_tx.subscribe()
    }

    /// Identifies a label photo and stores the resulting record.
    ///
    /// Nothing is stored when synthesis fails.
    pub async fn add_from_image(&self, image_data_url: String) -> Result<WineNote, RuntimeError> {
        let analysis = self.synthesizer.analyze_from_image(&image_data_url).await?;
        let note = normalize(
            analysis,
            NoteOrigin::Photo {
                image_url: image_data_url,
            },
            now_ms(),
        );
        self.insert_fresh(note).await
    }

    /// Researches a free-text query and stores the resulting record.
    ///
    /// Nothing is stored when synthesis fails.
    pub async fn add_from_query(&self, query: &str) -> Result<WineNote, RuntimeError> {
        let research = self.synthesizer.research_from_query(query).await?;
        let note = normalize(
            research.analysis,
            NoteOrigin::Search {
                sources: research.sources,
            },
            now_ms(),
        );
        self.insert_fresh(note).await
    }

    /// Prepends a generated record, re-keying it once if its id is taken.
    ///
    /// Returns the record as stored.
    pub async fn insert_fresh(&self, mut note: WineNote) -> Result<WineNote, RuntimeError> {
        match self.insert(note.clone()).await {
            Err(RuntimeError::Persist(PersistError::Store(StoreError::AlreadyExists(taken)))) => {
                note.id = new_wine_id(note.created_at);
                warn!(taken = %taken, id = %note.id, "id collision, retrying with a new id");
                self.insert(note.clone()).await?;
                Ok(note)
            }
            res => res.map(|()| note),
        }
    }

    /// Prepends a ready-made record.
    pub async fn insert(&self, note: WineNote) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Insert { note, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Replaces a record by id; `false` when the id is unknown.
    pub async fn replace(&self, id: impl Into<WineId>, note: WineNote) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Replace {
            id: id.into(),
            note,
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Applies `patch` to a record and saves it through replace.
    ///
    /// Returns the updated record, or `None` when the id is unknown.
    pub async fn update(
        &self,
        id: impl Into<WineId>,
        patch: WinePatch,
    ) -> Result<Option<WineNote>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Patch {
            id: id.into(),
            patch,
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Deletes a record by id; `false` when the id is unknown.
    pub async fn remove(&self, id: impl Into<WineId>) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Remove {
            id: id.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Fetches one record.
    pub async fn get(&self, id: impl Into<WineId>) -> Result<Option<WineNote>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Get {
            id: id.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Ordered copy of the collection.
    pub async fn sorted(&self, by: SortBy) -> Result<Vec<WineNote>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Sorted { by, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// The stored JSON array, pretty-printed.
    pub async fn export_json(&self) -> Result<String, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Export { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stops the journal task after pending commands.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    journal: &mut Journal,
    events_tx: &broadcast::Sender<JournalEvent>,
) -> bool {
    match cmd {
        Command::Insert { note, resp } => {
            let id = note.id.clone();
            let res = journal.insert(note).map_err(RuntimeError::from);
            if res.is_ok() {
                info!(id = %id, "record added");
                let _ = events_tx.send(JournalEvent::Added { id });
            }
            let _ = resp.send(res);
        }
        Command::Replace { id, note, resp } => {
            let res = journal.replace(&id, note).map_err(RuntimeError::from);
            if matches!(res, Ok(true)) {
                info!(id = %id, "record updated");
                let _ = events_tx.send(JournalEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::Patch { id, patch, resp } => {
            let res = match journal.store().get(&id).map(|rec| patch.applied(rec)) {
                Some(updated) => journal
                    .replace(&id, updated.clone())
                    .map(|replaced| replaced.then_some(updated))
                    .map_err(RuntimeError::from),
                None => Ok(None),
            };
            if matches!(res, Ok(Some(_))) {
                info!(id = %id, "record updated");
                let _ = events_tx.send(JournalEvent::Updated { id });
            } else if matches!(res, Ok(None)) {
                debug!(id = %id, "update skipped: unknown id");
            }
            let _ = resp.send(res);
        }
        Command::Remove { id, resp } => {
            let res = journal.remove(&id).map_err(RuntimeError::from);
            if matches!(res, Ok(true)) {
                info!(id = %id, "record removed");
                let _ = events_tx.send(JournalEvent::Removed { id });
            }
            let _ = resp.send(res);
        }
        Command::Get { id, resp } => {
            let _ = resp.send(journal.store().get_cloned(&id));
        }
        Command::Sorted { by, resp } => {
            let _ = resp.send(journal.sorted_view(by));
        }
        Command::Export { resp } => {
            let _ = resp.send(journal.export_json().map_err(RuntimeError::from));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}
