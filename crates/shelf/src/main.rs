#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use std::path::PathBuf;

mod browse;
mod display;
mod facets;
mod list;
mod session;
mod show;
mod tui;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Search and browse a CSV library catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Read settings from this file instead of ./shelf.toml
    #[arg(long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog in an interactive terminal UI
    #[command(alias = "b")]
    Browse(browse::BrowseArgs),

    /// Print items matching a search and facet filters
    #[command(alias = "ls")]
    List(list::ListArgs),

    /// Print the details of one item
    Show(show::ShowArgs),

    /// Print the filter options found in the catalog
    Facets(facets::FacetsArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Browse(args) => browse::execute(args, config),
        Commands::List(args) => list::execute(args, config),
        Commands::Show(args) => show::execute(args, config),
        Commands::Facets(args) => facets::execute(args, config),
    }
}
