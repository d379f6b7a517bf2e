use std::io::IsTerminal;
use std::path::Path;

use crate::session::load_config;
use crate::tui;
use anyhow::{Result, bail};
use clap::Args;

#[derive(Args, Debug, Clone)]
#[command(about = "Browse the catalog interactively")]
pub struct BrowseArgs {
    /// Catalog file or http(s) URL (defaults to the configured source)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,
}

pub fn execute(args: BrowseArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, args.source.as_deref())?;
    if !std::io::stdout().is_terminal() {
        bail!("`shelf browse` needs a terminal; use `shelf list` for piped output");
    }
    tui::run(config)
}
