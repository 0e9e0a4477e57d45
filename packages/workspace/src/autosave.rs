//! Debounced autosave
//!
//! Every committed change cancels the pending save and re-arms the timer a
//! full delay into the future, so only the last state of a burst of edits is
//! written. Changes made inside the quiet window are lost if the process dies
//! before the timer fires; `flush` forces an immediate write.

use std::sync::Arc;
use std::time::Duration;

use blockpad_common::{CommonResult, KeyValueStore};
use blockpad_editor::DocumentState;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::{DocumentHandle, WorkspaceError, WorkspaceResult};

enum Command {
    Flush(oneshot::Sender<CommonResult<()>>),
    Shutdown(oneshot::Sender<CommonResult<()>>),
}

/// Background task persisting a document after a quiet period
pub struct Autosave {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl Autosave {
    /// Start autosaving `handle` under `key`. Must run inside a tokio runtime.
    pub fn spawn(
        handle: &DocumentHandle,
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        delay: Duration,
    ) -> Self {
        let (commands, command_rx) = mpsc::channel(8);
        let task = tokio::spawn(run(handle.watch(), store, key.into(), delay, command_rx));
        Self { commands, task }
    }

    /// Write the latest state now, cancelling any pending timer
    pub async fn flush(&self) -> WorkspaceResult<()> {
        let (ack, done) = oneshot::channel();
        self.commands
            .send(Command::Flush(ack))
            .await
            .map_err(|_| WorkspaceError::AutosaveStopped)?;
        done.await.map_err(|_| WorkspaceError::AutosaveStopped)??;
        Ok(())
    }

    /// Save anything pending and stop the task
    pub async fn shutdown(self) -> WorkspaceResult<()> {
        let (ack, done) = oneshot::channel();
        let result = match self.commands.send(Command::Shutdown(ack)).await {
            Ok(()) => done.await.ok(),
            Err(_) => None,
        };

        if let Err(err) = self.task.await {
            tracing::error!("autosave task ended abnormally: {err}");
            return Err(WorkspaceError::AutosaveStopped);
        }

        result
            .ok_or(WorkspaceError::AutosaveStopped)?
            .map_err(WorkspaceError::from)
    }
}

async fn run(
    mut snapshots: watch::Receiver<Arc<DocumentState>>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    delay: Duration,
    mut commands: mpsc::Receiver<Command>,
) {
    let timer = sleep(delay);
    tokio::pin!(timer);
    let mut pending = false;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Document dropped: write what we have and stop
                    if pending {
                        if let Err(err) = save_latest(&mut snapshots, store.as_ref(), &key) {
                            tracing::error!(key = %key, "final autosave failed: {err}");
                        }
                    }
                    break;
                }
                pending = true;
                timer.as_mut().reset(Instant::now() + delay);
            }

            () = &mut timer, if pending => {
                pending = false;
                if let Err(err) = save_latest(&mut snapshots, store.as_ref(), &key) {
                    tracing::error!(key = %key, "autosave failed: {err}");
                }
            }

            command = commands.recv() => match command {
                Some(Command::Flush(ack)) => {
                    pending = false;
                    let _ = ack.send(save_latest(&mut snapshots, store.as_ref(), &key));
                }
                Some(Command::Shutdown(ack)) => {
                    let result = if pending || unseen(&snapshots) {
                        save_latest(&mut snapshots, store.as_ref(), &key)
                    } else {
                        Ok(())
                    };
                    let _ = ack.send(result);
                    break;
                }
                None => {
                    if pending || unseen(&snapshots) {
                        if let Err(err) = save_latest(&mut snapshots, store.as_ref(), &key) {
                            tracing::error!(key = %key, "final autosave failed: {err}");
                        }
                    }
                    break;
                }
            },
        }
    }

    tracing::debug!(key = %key, "autosave stopped");
}

/// A change was published that the loop has not picked up yet
fn unseen(snapshots: &watch::Receiver<Arc<DocumentState>>) -> bool {
    snapshots.has_changed().unwrap_or(false)
}

fn save_latest(
    snapshots: &mut watch::Receiver<Arc<DocumentState>>,
    store: &dyn KeyValueStore,
    key: &str,
) -> CommonResult<()> {
    let state = snapshots.borrow_and_update().clone();
    let bytes = serde_json::to_vec(&state.document)?;

    match store.save(key, &bytes) {
        Ok(()) => {
            tracing::debug!(key, blocks = state.document.blocks.len(), "autosaved document");
            Ok(())
        }
        Err(err) => {
            tracing::error!(key, "failed to save document: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_common::{CommonError, MemoryStore};
    use blockpad_editor::{BlockData, Document, SerializedDocument};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn save(&self, _key: &str, _bytes: &[u8]) -> CommonResult<()> {
            Err(CommonError::Generic("disk unavailable".to_string()))
        }

        fn load(&self, _key: &str) -> CommonResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    struct PanickingStore;

    impl KeyValueStore for PanickingStore {
        fn save(&self, _key: &str, _bytes: &[u8]) -> CommonResult<()> {
            panic!("store driver crashed");
        }

        fn load(&self, _key: &str) -> CommonResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn add(handle: &DocumentHandle, text: &str) {
        handle
            .mutate(|doc| doc.add_block(BlockData::text(text), None))
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_coalesced_into_one_save() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::new("Burst"));
        let _autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        add(&handle, "b");
        add(&handle, "c");
        settle().await;

        tokio::time::advance(Duration::from_millis(1999)).await;
        settle().await;
        assert_eq!(store.save_count(), 0);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(store.save_count(), 1);

        let saved: SerializedDocument =
            serde_json::from_str(&store.get_string("doc").unwrap()).unwrap();
        assert_eq!(saved.blocks.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_change_reschedules_the_timer() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let _autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        settle().await;
        tokio::time::advance(Duration::from_millis(1500)).await;
        settle().await;

        add(&handle, "b");
        settle().await;
        tokio::time::advance(Duration::from_millis(1500)).await;
        settle().await;
        assert_eq!(store.save_count(), 0);

        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_immediately() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        autosave.flush().await.unwrap();
        assert_eq!(store.save_count(), 1);

        // The flushed change does not fire again later
        tokio::time::advance(Duration::from_millis(5000)).await;
        settle().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_writes_pending_change() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        settle().await;
        autosave.shutdown().await.unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_right_after_mutation_still_saves() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        autosave.shutdown().await.unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_without_changes_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        settle().await;
        autosave.shutdown().await.unwrap();
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_document_writes_pending_change() {
        let store = Arc::new(MemoryStore::new());
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, store.clone(), "doc", Duration::from_millis(2000));

        add(&handle, "a");
        settle().await;
        drop(handle);
        settle().await;

        assert_eq!(store.save_count(), 1);
        assert!(autosave.task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_task_is_reported_on_shutdown() {
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, Arc::new(PanickingStore), "doc", Duration::from_millis(10));

        add(&handle, "a");
        settle().await;
        tokio::time::advance(Duration::from_millis(20)).await;
        settle().await;

        let err = autosave.shutdown().await.unwrap_err();
        assert!(matches!(err, WorkspaceError::AutosaveStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_leaves_document_intact() {
        let handle = DocumentHandle::new(Document::default());
        let autosave = Autosave::spawn(&handle, Arc::new(FailingStore), "doc", Duration::from_millis(10));

        add(&handle, "a");
        settle().await;
        tokio::time::advance(Duration::from_millis(20)).await;
        settle().await;

        add(&handle, "b");
        assert_eq!(handle.read(|doc| doc.len()).unwrap(), 2);

        let err = autosave.flush().await.unwrap_err();
        assert!(matches!(err, WorkspaceError::Store(CommonError::Generic(_))));
    }
}
