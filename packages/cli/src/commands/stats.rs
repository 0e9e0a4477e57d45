use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::open;

pub async fn stats(dir: &Path) -> Result<()> {
    let workspace = open(dir).await?;
    let (title, stats) = workspace
        .handle()
        .read(|doc| (doc.title().to_string(), doc.get_stats()))?;
    workspace.close().await?;

    println!("{}", title.bright_blue().bold());
    println!("  Blocks:         {}", stats.block_count);
    println!("  Content length: {}", stats.total_content_length);
    println!("  Created:        {}", stats.created_at.to_rfc3339());
    println!("  Updated:        {}", stats.updated_at.to_rfc3339());

    if !stats.kinds.is_empty() {
        println!();
        for (kind, count) in &stats.kinds {
            println!("  {:<16}{}", kind.cyan(), count);
        }
    }
    Ok(())
}
