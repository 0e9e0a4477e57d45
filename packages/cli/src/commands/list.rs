use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::{describe, open};

pub async fn list(dir: &Path) -> Result<()> {
    let workspace = open(dir).await?;
    let snapshot = workspace.handle().snapshot();
    workspace.close().await?;

    let document = &snapshot.document;
    println!("{}", document.title.bright_blue().bold());

    if document.blocks.is_empty() {
        println!("{}", "⚠️  No blocks yet".yellow());
        return Ok(());
    }

    for (position, block) in document.blocks.iter().enumerate() {
        println!("{}", describe(position, block));
    }
    Ok(())
}
