use anyhow::Result;
use blockpad_editor::{BlockData, DEFAULT_BLOCK_KIND};
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::{commit, open, parse_attribute, parse_content};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Block kind
    #[arg(short, long, default_value = DEFAULT_BLOCK_KIND)]
    pub kind: String,

    /// Block content
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Parse content as JSON
    #[arg(long)]
    pub json: bool,

    /// Insert position (appends when omitted or out of range)
    #[arg(short, long)]
    pub position: Option<usize>,

    /// Explicit block id
    #[arg(long)]
    pub id: Option<String>,

    /// Attribute as key=value (repeatable)
    #[arg(short, long = "attr")]
    pub attributes: Vec<String>,
}

pub async fn add(args: AddArgs, dir: &Path) -> Result<()> {
    let mut data = BlockData::new(args.kind).with_content(parse_content(&args.content, args.json)?);
    if let Some(id) = args.id {
        data = data.with_id(id);
    }
    for raw in &args.attributes {
        let (key, value) = parse_attribute(raw)?;
        data = data.with_attribute(key, value);
    }

    let workspace = open(dir).await?;
    let (id, position) = commit(workspace, |doc| {
        let id = doc.add_block(data, args.position);
        let position = doc.position_of(&id);
        (id, position)
    })
    .await?;

    println!(
        "  {} Added {} at position {}",
        "✓".green(),
        id.as_str().bright_white(),
        position.unwrap_or_default()
    );
    Ok(())
}
