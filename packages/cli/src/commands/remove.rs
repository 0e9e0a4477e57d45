use anyhow::{bail, Result};
use blockpad_editor::BlockId;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::{commit, open};

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Id of the block to remove
    pub id: String,
}

pub async fn remove(args: RemoveArgs, dir: &Path) -> Result<()> {
    let id = BlockId::from(args.id);
    let workspace = open(dir).await?;

    if !commit(workspace, |doc| doc.remove_block(&id)).await? {
        bail!("no block with id {id}");
    }

    println!("  {} Removed {}", "✓".green(), id.as_str().bright_white());
    Ok(())
}
