use std::io::{self, Write};
use std::path::Path;

use crate::display::DetailDisplay;
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use shelf_catalog::present_detail;

#[derive(Args, Debug, Clone)]
#[command(about = "Print the detail view of one catalog item")]
pub struct ShowArgs {
    /// Value of the item's `id` field
    #[arg(value_name = "ID")]
    pub id: String,

    /// Catalog file or http(s) URL (defaults to the configured source)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,
}

pub fn execute(args: ShowArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(config_path, args.source.as_deref())?;

    let record = session
        .store
        .catalog()
        .find_by_id(&args.id)
        .ok_or_else(|| anyhow::anyhow!("No item with id '{}' in {}", args.id, session.source))?;

    let detail = present_detail(record, &session.view_options());
    let mut writer = io::stdout().lock();
    for line in DetailDisplay::new(&detail).to_cli_lines() {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
