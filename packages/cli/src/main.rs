mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add, init, list, move_block, remove, show, stats, update, AddArgs, InitArgs, MoveArgs,
    RemoveArgs, UpdateArgs,
};

/// Blockpad CLI - block-structured documents with undo history
#[derive(Parser, Debug)]
#[command(name = "blockpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace directory (defaults to the current directory)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Blockpad workspace
    Init(InitArgs),

    /// Add a block to the document
    Add(AddArgs),

    /// List blocks in document order
    List,

    /// Remove a block
    Remove(RemoveArgs),

    /// Move a block to a new position
    Move(MoveArgs),

    /// Update a block's content, kind or attributes
    Update(UpdateArgs),

    /// Print document statistics
    Stats,

    /// Print the serialized document
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => exit_with(err.into()),
        },
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &dir),
        Command::Add(args) => add(args, &dir).await,
        Command::List => list(&dir).await,
        Command::Remove(args) => remove(args, &dir).await,
        Command::Move(args) => move_block(args, &dir).await,
        Command::Update(args) => update(args, &dir).await,
        Command::Stats => stats(&dir).await,
        Command::Show => show(&dir).await,
    };

    if let Err(err) = result {
        exit_with(err);
    }
}

fn exit_with(err: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("{} {}", "Error:".red().bold(), err);
    eprintln!();
    std::process::exit(1);
}
