use anyhow::{bail, Result};
use blockpad_editor::BlockId;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::{commit, open};

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Id of the block to move
    pub id: String,

    /// Target position (clamped to the end)
    pub position: usize,
}

pub async fn move_block(args: MoveArgs, dir: &Path) -> Result<()> {
    let id = BlockId::from(args.id);
    let workspace = open(dir).await?;

    let landed = commit(workspace, |doc| {
        doc.move_block(&id, args.position)
            .then(|| doc.position_of(&id))
            .flatten()
    })
    .await?;

    let Some(position) = landed else {
        bail!("no block with id {id}");
    };

    println!(
        "  {} Moved {} to position {}",
        "✓".green(),
        id.as_str().bright_white(),
        position
    );
    Ok(())
}
