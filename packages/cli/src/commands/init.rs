use anyhow::Result;
use blockpad_workspace::{WorkspaceConfig, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory for saved documents, relative to the workspace
    #[arg(short, long, default_value = ".blockpad")]
    pub store_dir: String,

    /// Maximum undo levels (0 = unlimited)
    #[arg(long, default_value_t = blockpad_editor::DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Autosave quiet period in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub autosave_delay_ms: u64,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, dir: &Path) -> Result<()> {
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockpad workspace...".bright_blue().bold());

    let config = WorkspaceConfig {
        store_dir: args.store_dir,
        history_limit: args.history_limit,
        autosave_delay_ms: args.autosave_delay_ms,
        ..WorkspaceConfig::default()
    };
    blockpad_workspace::init(dir, &config)?;

    println!("  {} Created {}/", "✓".green(), config.store_dir);
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: blockpad add --content \"Hello\"");
    println!("  2. Run: blockpad list");

    Ok(())
}
