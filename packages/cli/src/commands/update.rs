use anyhow::{bail, Result};
use blockpad_editor::{BlockId, BlockPatch};
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::{commit, open, parse_attribute, parse_content};

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Id of the block to update
    pub id: String,

    /// New content
    #[arg(short, long)]
    pub content: Option<String>,

    /// Parse content as JSON
    #[arg(long)]
    pub json: bool,

    /// New kind
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Attribute as key=value (repeatable, `key=null` removes)
    #[arg(short, long = "attr")]
    pub attributes: Vec<String>,
}

pub async fn update(args: UpdateArgs, dir: &Path) -> Result<()> {
    let mut patch = BlockPatch::new();
    if let Some(content) = &args.content {
        patch = patch.with_content(parse_content(content, args.json)?);
    }
    if let Some(kind) = args.kind {
        patch = patch.with_kind(kind);
    }
    for raw in &args.attributes {
        let (key, value) = parse_attribute(raw)?;
        patch = patch.with_attribute(key, value);
    }

    if patch.is_empty() {
        bail!("nothing to update: pass --content, --kind or --attr");
    }

    let id = BlockId::from(args.id);
    let workspace = open(dir).await?;

    if !commit(workspace, |doc| doc.update_block(&id, patch)).await? {
        bail!("no block with id {id}");
    }

    println!("  {} Updated {}", "✓".green(), id.as_str().bright_white());
    Ok(())
}
