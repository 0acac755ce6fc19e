use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::extractors::olaclick::attach_addons::attach_addons;
use crate::strategies::{run_cascade, StrategyContext, StrategyKind};
use crate::utilities::write_menu::{render_menu, write_menu};

// Import modules
mod config;
mod extractors;
mod fetch;
mod menu;
mod strategies;
mod utilities;

/// Fetches an OlaClick store menu and writes it as normalized JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file (TOML); missing file means built-in defaults
    #[arg(short, long, default_value = "Settings.toml")]
    settings: String,

    /// Output file, overrides `output.path`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Strategy to try, in order; repeat the flag for a custom cascade
    #[arg(long = "strategy", value_enum)]
    strategies: Vec<StrategyKind>,

    /// Print the menu instead of writing the file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration settings
    let config = match config::config::load_config(&cli.settings) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", format!("Failed to load configuration: {}", e).red());
            return Err(e.into());
        }
    };

    println!("{} {} - store '{}'", config.base.name, config.base.version, config.store.slug);

    let order = if cli.strategies.is_empty() {
        config.strategies.order.clone()
    } else {
        cli.strategies.clone()
    };

    let context = StrategyContext::new(&config)?;

    let (strategy, mut menu) = match run_cascade(&context, &order).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", format!("Fatal: could not get menu data: {:#}", e).red());
            std::process::exit(1);
        }
    };

    let attached = attach_addons(&mut menu, &config.addons.rules, &config.output.currency_prefix);
    if attached > 0 {
        println!("Attached {} addon groups from rules", attached);
    }

    if cli.dry_run {
        println!("{}", render_menu(&menu)?);
        return Ok(());
    }

    let path = cli.output.unwrap_or_else(|| PathBuf::from(&config.output.path));
    write_menu(&menu, &path).await?;

    println!(
        "{}",
        format!(
            "Success! '{}' updated: {} categories, {} items (strategy '{}')",
            path.display(),
            menu.categories().len(),
            menu.item_count(),
            strategy
        )
        .green()
    );

    Ok(())
}
