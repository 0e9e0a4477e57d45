//! # Blockpad Workspace
//!
//! Composition root for an editing session: owns the document handle, the
//! persistence store and the autosave task, and wires them together.
//!
//! ```text
//! Document ──observer──▶ watch<Arc<DocumentState>> ──▶ Autosave ──▶ KeyValueStore
//!     ▲                          │
//!     └── DocumentHandle::mutate └──▶ DocumentHandle::snapshot (lock-free reads)
//! ```

pub mod autosave;
pub mod config;
pub mod error;
pub mod handle;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use blockpad_common::{FileStore, KeyValueStore};
use blockpad_editor::{Document, DEFAULT_TITLE};

pub use autosave::Autosave;
pub use config::{WorkspaceConfig, DEFAULT_CONFIG_NAME};
pub use error::{WorkspaceError, WorkspaceResult};
pub use handle::DocumentHandle;

/// One document, its store and its autosave
pub struct Workspace {
    config: WorkspaceConfig,
    store: Arc<dyn KeyValueStore>,
    handle: DocumentHandle,
    autosave: Autosave,
}

impl Workspace {
    /// Open the workspace rooted at `root`, using its config file and a
    /// directory-backed store
    pub async fn open(root: &Path) -> WorkspaceResult<Self> {
        let config = WorkspaceConfig::load(root)?;
        let store = Arc::new(FileStore::new(config.get_store_dir(root)));
        Self::open_with_store(config, store).await
    }

    /// Open with an explicit store. Must run inside a tokio runtime.
    pub async fn open_with_store(
        config: WorkspaceConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> WorkspaceResult<Self> {
        let document = load_document(store.as_ref(), &config)?;
        tracing::info!(
            document = document.id(),
            key = %config.document_key,
            blocks = document.len(),
            "workspace opened"
        );

        let handle = DocumentHandle::new(document);
        let autosave = Autosave::spawn(
            &handle,
            store.clone(),
            config.document_key.clone(),
            config.autosave_delay(),
        );

        Ok(Self {
            config,
            store,
            handle,
            autosave,
        })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    /// Persist the current state immediately
    pub async fn flush(&self) -> WorkspaceResult<()> {
        self.autosave.flush().await
    }

    /// Persist anything pending and stop autosaving
    pub async fn close(self) -> WorkspaceResult<()> {
        self.autosave.shutdown().await
    }
}

/// Initialize a workspace directory with a config file and store directory
pub fn init(root: &Path, config: &WorkspaceConfig) -> WorkspaceResult<PathBuf> {
    std::fs::create_dir_all(config.get_store_dir(root))?;
    config.save(root)
}

/// Load the configured document, or start a fresh one.
///
/// A stored blob that does not parse is logged and replaced by an empty
/// document rather than failing the open.
fn load_document(
    store: &dyn KeyValueStore,
    config: &WorkspaceConfig,
) -> WorkspaceResult<Document> {
    let document = match store.load(&config.document_key)? {
        Some(bytes) => match Document::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(
                    key = %config.document_key,
                    "stored document is unreadable, starting fresh: {err}"
                );
                Document::new(DEFAULT_TITLE)
            }
        },
        None => Document::new(DEFAULT_TITLE),
    };

    Ok(document.with_history_limit(config.history_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_common::MemoryStore;
    use blockpad_editor::BlockData;

    fn config() -> WorkspaceConfig {
        WorkspaceConfig {
            history_limit: 5,
            ..WorkspaceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_empty_store_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        let workspace = Workspace::open_with_store(config(), store).await.unwrap();

        let snapshot = workspace.handle().snapshot();
        assert!(snapshot.document.blocks.is_empty());
        assert_eq!(snapshot.document.title, DEFAULT_TITLE);
        assert_eq!(
            workspace.handle().read(|doc| doc.history().max_levels()).unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_reopen_restores_saved_document() {
        let store = Arc::new(MemoryStore::new());

        let workspace = Workspace::open_with_store(config(), store.clone()).await.unwrap();
        let id = workspace
            .handle()
            .mutate(|doc| {
                doc.set_title("Saved");
                doc.add_block(BlockData::text("kept"), None)
            })
            .unwrap();
        workspace.close().await.unwrap();

        let reopened = Workspace::open_with_store(config(), store).await.unwrap();
        let snapshot = reopened.handle().snapshot();
        assert_eq!(snapshot.document.title, "Saved");
        assert_eq!(snapshot.document.blocks[0].id, id);
        assert!(!snapshot.can_undo);
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        store.save("document", b"{broken").unwrap();

        let workspace = Workspace::open_with_store(config(), store).await.unwrap();
        assert!(workspace.handle().snapshot().document.blocks.is_empty());
    }

    #[tokio::test]
    async fn test_open_directory_workspace() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), &WorkspaceConfig::default()).unwrap();
        assert!(dir.path().join(DEFAULT_CONFIG_NAME).exists());

        let workspace = Workspace::open(dir.path()).await.unwrap();
        workspace
            .handle()
            .mutate(|doc| doc.add_block(BlockData::text("on disk"), None))
            .unwrap();
        workspace.flush().await.unwrap();

        assert!(dir.path().join(".blockpad").join("document.json").exists());
        workspace.close().await.unwrap();
    }
}
