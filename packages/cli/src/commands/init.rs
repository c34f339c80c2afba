use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// API base url to write into the config
    #[arg(long)]
    pub api_url: Option<String>,

    /// Default page id
    #[arg(long)]
    pub page: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

/// Write a config file. Returns `false` when one exists and `--force` was
/// not given.
pub fn init(args: InitArgs, cwd: &Path) -> Result<bool> {
    let config_path = Config::path(cwd);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(false);
    }

    let config = Config::default().with_overrides(args.api_url, args.page);
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!("    API:  {}", config.api_url);
    if let Some(page) = &config.page_id {
        println!("    Page: {}", page);
    }
    println!();
    println!("Next steps:");
    println!("  1. Run: lectern blocks --page <page-id>");
    println!("  2. Run: lectern insert paragraph --text \"...\"");

    Ok(true)
}
