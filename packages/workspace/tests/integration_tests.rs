/// Integration tests for the workspace
/// Tests handle → autosave → file store → reopen flow
use blockpad_editor::{BlockData, BlockId, BlockPatch, SerializedDocument};
use blockpad_workspace::{init, Workspace, WorkspaceConfig};
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> WorkspaceConfig {
    WorkspaceConfig {
        autosave_delay_ms: 20,
        ..WorkspaceConfig::default()
    }
}

#[tokio::test]
async fn test_edits_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &fast_config()).unwrap();

    let workspace = Workspace::open(dir.path()).await.unwrap();
    let (a, b) = workspace
        .handle()
        .mutate(|doc| {
            doc.set_title("Runbook");
            let a = doc.add_block(BlockData::text("check disks"), None);
            let b = doc.add_block(
                BlockData::new("warning-block")
                    .with_content("page oncall")
                    .with_attribute("severity", "high"),
                None,
            );
            doc.move_block(&b, 0);
            doc.update_block(&a, BlockPatch::content("check disks and inodes"));
            (a, b)
        })
        .unwrap();
    workspace.close().await.unwrap();

    let reopened = Workspace::open(dir.path()).await.unwrap();
    let snapshot = reopened.handle().snapshot();
    assert_eq!(snapshot.document.title, "Runbook");
    assert_eq!(snapshot.block_ids(), vec![&b, &a]);
    assert_eq!(
        snapshot.document.blocks[1].content.as_text(),
        Some("check disks and inodes")
    );
    assert_eq!(snapshot.document.blocks[0].attributes["severity"], "high");

    // History is session state and does not travel
    assert!(!snapshot.can_undo);
    reopened.close().await.unwrap();
}

#[tokio::test]
async fn test_autosave_writes_after_quiet_period() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &fast_config()).unwrap();
    let saved = dir.path().join(".blockpad").join("document.json");

    let workspace = Workspace::open(dir.path()).await.unwrap();
    workspace
        .handle()
        .mutate(|doc| doc.add_block(BlockData::text("later"), None))
        .unwrap();

    let mut attempts = 0;
    while !saved.exists() && attempts < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        attempts += 1;
    }

    let record: SerializedDocument =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(record.blocks.len(), 1);
    workspace.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_readers_see_consistent_snapshots_during_writes() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Arc::new(Workspace::open(dir.path()).await.unwrap());

    let writer = {
        let handle = workspace.handle().clone();
        std::thread::spawn(move || {
            for i in 0..200 {
                handle
                    .mutate(|doc| {
                        let id = doc.add_block(BlockData::text(format!("{i}")), Some(0));
                        if i % 3 == 0 {
                            doc.remove_block(&id);
                        }
                    })
                    .unwrap();
            }
        })
    };

    let reader = {
        let handle = workspace.handle().clone();
        std::thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = handle.snapshot();
                let mut ids: Vec<&BlockId> = snapshot.block_ids();
                let len = ids.len();
                ids.sort();
                ids.dedup();
                assert_eq!(ids.len(), len);
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(workspace.handle().snapshot().document.blocks.len(), 133);
    assert!(workspace.handle().read(|doc| doc.is_consistent()).unwrap());
    workspace.flush().await.unwrap();
}
