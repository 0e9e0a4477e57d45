pub mod add;
pub mod init;
pub mod list;
pub mod remove;
pub mod reorder;
pub mod show;
pub mod stats;
pub mod update;

pub use add::{add, AddArgs};
pub use init::{init, InitArgs};
pub use list::list;
pub use remove::{remove, RemoveArgs};
pub use reorder::{move_block, MoveArgs};
pub use show::show;
pub use stats::stats;
pub use update::{update, UpdateArgs};

use std::path::Path;

use anyhow::{Context, Result};
use blockpad_editor::{Block, BlockContent};
use blockpad_workspace::Workspace;
use colored::Colorize;

/// Open the workspace in `dir` for a single command
pub(crate) async fn open(dir: &Path) -> Result<Workspace> {
    Workspace::open(dir)
        .await
        .with_context(|| format!("cannot open workspace at {}", dir.display()))
}

/// Run a mutation, then persist it before the process exits
pub(crate) async fn commit<R>(
    workspace: Workspace,
    f: impl FnOnce(&mut blockpad_editor::Document) -> R,
) -> Result<R> {
    let result = workspace.handle().mutate(f)?;
    workspace.close().await?;
    Ok(result)
}

/// Parse a `--content` value, as JSON when `structured` is set
pub(crate) fn parse_content(raw: &str, structured: bool) -> Result<BlockContent> {
    if structured {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("content is not valid JSON")?;
        Ok(BlockContent::from(value))
    } else {
        Ok(BlockContent::Text(raw.to_string()))
    }
}

/// Parse `key=value` attribute pairs; values that are not JSON are kept as strings
pub(crate) fn parse_attribute(raw: &str) -> Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("attribute `{raw}` must look like key=value"))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub(crate) fn describe(position: usize, block: &Block) -> String {
    let content = match &block.content {
        BlockContent::Text(text) => preview(text),
        BlockContent::Structured(value) => preview(&value.to_string()),
    };
    format!(
        "{:>3}  {}  {}  {}",
        position,
        block.id.as_str().bright_black(),
        block.kind.cyan(),
        content
    )
}

fn preview(text: &str) -> String {
    const WIDTH: usize = 48;
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > WIDTH || line.len() < text.len() {
        let cut: String = line.chars().take(WIDTH).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        let (key, value) = parse_attribute("severity=high").unwrap();
        assert_eq!(key, "severity");
        assert_eq!(value, serde_json::json!("high"));

        let (_, value) = parse_attribute("level=3").unwrap();
        assert_eq!(value, serde_json::json!(3));

        let (_, value) = parse_attribute("empty=null").unwrap();
        assert!(value.is_null());

        assert!(parse_attribute("missing").is_err());
    }

    #[test]
    fn test_parse_content() {
        assert_eq!(
            parse_content("plain", false).unwrap(),
            BlockContent::Text("plain".to_string())
        );
        assert!(matches!(
            parse_content(r#"{"rows": []}"#, true).unwrap(),
            BlockContent::Structured(_)
        ));
        assert!(parse_content("{oops", true).is_err());
        assert_eq!(
            parse_content(r#""hi""#, true).unwrap(),
            BlockContent::Text("hi".to_string())
        );
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first…");
        assert_eq!(preview(&"x".repeat(60)).chars().count(), 49);
    }
}
