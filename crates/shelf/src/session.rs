//! Config resolution and catalog loading shared by the one-shot commands.

use anyhow::{Context, Result};
use colored::Colorize;
use shelf_catalog::{
    CatalogStore, LOAD_FAILURE_MESSAGE, ShelfConfig, Source, ViewOptions, load_catalog,
};
use std::path::Path;

/// Resolve configuration: file (or defaults), then environment, then `source_arg`.
pub fn load_config(config_path: Option<&Path>, source_arg: Option<&str>) -> Result<ShelfConfig> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = ShelfConfig::load(config_path, &cwd)?;
    Ok(config.with_source_override(source_arg.map(str::to_string)))
}

/// A loaded catalog ready for filtering.
pub struct Session {
    pub config: ShelfConfig,
    pub source: Source,
    pub store: CatalogStore,
    pub dropped: usize,
}

impl Session {
    pub fn open(config_path: Option<&Path>, source_arg: Option<&str>) -> Result<Self> {
        let config = load_config(config_path, source_arg)?;
        let source = Source::parse(&config.source);
        let outcome = load_catalog(&source).context(LOAD_FAILURE_MESSAGE)?;
        let store = CatalogStore::new(outcome.records, &config.filter_fields);

        Ok(Self {
            config,
            source,
            store,
            dropped: outcome.dropped,
        })
    }

    pub fn view_options(&self) -> ViewOptions {
        self.config.view_options()
    }

    /// Mention skipped rows on stderr so piped stdout stays clean.
    pub fn report_dropped(&self) {
        if self.dropped > 0 {
            eprintln!(
                "{}",
                format!("{} malformed row(s) skipped", self.dropped).dimmed()
            );
        }
    }
}
