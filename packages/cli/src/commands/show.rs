use anyhow::Result;
use std::path::Path;

use super::open;

pub async fn show(dir: &Path) -> Result<()> {
    let workspace = open(dir).await?;
    let json = workspace.handle().read(|doc| doc.to_json_pretty())??;
    workspace.close().await?;

    println!("{json}");
    Ok(())
}
