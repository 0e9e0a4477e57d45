//! Shared, thread-safe access to one document.
//!
//! All writers go through a single mutex, so mutations are serialized.
//! After every committed change the document's observer publishes an owned
//! `Arc<DocumentState>` on a watch channel; readers take that snapshot
//! without touching the writer lock.

use std::sync::{Arc, Mutex};

use blockpad_editor::{ChangeEvent, Document, DocumentState};
use tokio::sync::{broadcast, watch};

use crate::{WorkspaceError, WorkspaceResult};

const EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct DocumentHandle {
    document: Arc<Mutex<Document>>,
    snapshots: watch::Receiver<Arc<DocumentState>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl DocumentHandle {
    pub fn new(mut document: Document) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(document.state()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let event_tx = events.clone();
        document.subscribe(move |event, state| {
            snapshot_tx.send_replace(Arc::new(state.clone()));
            // No receivers is fine
            let _ = event_tx.send(event.clone());
            Ok(())
        });

        Self {
            document: Arc::new(Mutex::new(document)),
            snapshots: snapshot_rx,
            events,
        }
    }

    /// Run a mutation with exclusive access to the document.
    ///
    /// Observers run while the lock is held. An observer must never call
    /// `mutate` or `read` on a clone of this handle: the lock is not
    /// re-entrant and the nested call deadlocks or panics. `snapshot` does not
    /// take the lock and is safe there.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Document) -> R) -> WorkspaceResult<R> {
        let mut document = self
            .document
            .lock()
            .map_err(|_| WorkspaceError::Poisoned)?;
        Ok(f(&mut document))
    }

    /// Read through the writer lock (for data not in the snapshot)
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> WorkspaceResult<R> {
        let document = self
            .document
            .lock()
            .map_err(|_| WorkspaceError::Poisoned)?;
        Ok(f(&document))
    }

    /// Latest committed state, without taking the writer lock
    pub fn snapshot(&self) -> Arc<DocumentState> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every committed change
    pub fn watch(&self) -> watch::Receiver<Arc<DocumentState>> {
        self.snapshots.clone()
    }

    /// Stream of change events for renderers
    pub fn events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("document_id", &self.snapshots.borrow().document.id)
            .finish()
    }
}
