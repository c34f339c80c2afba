mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    BlocksArgs, ClearArgs, Context, DeleteArgs, DuplicateArgs, GenerateArgs, IndentArgs,
    InitArgs, InsertArgs, ItemCommand, MoveArgs, OutdentArgs, ReviewArgs,
};
use config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Lectern CLI - edit lesson pages block by block
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API base url (overrides apiUrl in the config)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Page to edit (overrides pageId in the config)
    #[arg(long, global = true)]
    page: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a lectern.config.json
    Init(InitArgs),

    /// List the blocks of a page
    Blocks(BlocksArgs),

    /// Insert a new block
    Insert(InsertArgs),

    /// Move a block up or down one place
    Move(MoveArgs),

    /// Duplicate a block right after itself
    Duplicate(DuplicateArgs),

    /// Delete a block
    Delete(DeleteArgs),

    /// Nest a list item under the item before it
    Indent(IndentArgs),

    /// Lift a sub-item back to the top level
    Outdent(OutdentArgs),

    /// Add or remove list items
    Item {
        #[command(subcommand)]
        command: ItemCommand,
    },

    /// Ask the AI service for learning metadata
    Generate(GenerateArgs),

    /// Sanity check metadata and apply the accepted corrections
    Review(ReviewArgs),

    /// Reset a block's learning metadata
    Clear(ClearArgs),
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cwd: &Path) -> anyhow::Result<()> {
    let config = Config::load(cwd)?.with_overrides(cli.api_url, cli.page);
    init_tracing(&config);

    let command = match cli.command {
        Command::Init(args) => {
            commands::init(args, cwd)?;
            return Ok(());
        }
        other => other,
    };

    let ctx = Context::new(config)?;
    match command {
        Command::Init(_) => Ok(()),
        Command::Blocks(args) => commands::list_blocks(args, &ctx).await,
        Command::Insert(args) => commands::insert(args, &ctx).await,
        Command::Move(args) => commands::move_block(args, &ctx).await,
        Command::Duplicate(args) => commands::duplicate(args, &ctx).await,
        Command::Delete(args) => commands::delete(args, &ctx).await,
        Command::Indent(args) => commands::indent(args, &ctx).await,
        Command::Outdent(args) => commands::outdent(args, &ctx).await,
        Command::Item { command } => commands::item(command, &ctx).await,
        Command::Generate(args) => commands::generate(args, &ctx).await,
        Command::Review(args) => commands::review(args, &ctx).await,
        Command::Clear(args) => commands::clear(args, &ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli, &cwd).await,
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {}", e)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
