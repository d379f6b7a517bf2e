use std::io::{self, Write};
use std::path::Path;

use crate::display::CardDisplay;
use crate::session::Session;
use anyhow::Result;
use clap::{Args, ValueEnum};
use log::debug;
use shelf_catalog::{FilterState, Record, RenderedList, render_cards};

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum ListFormat {
    #[default]
    Cards,
    Json,
}

impl std::fmt::Display for ListFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFormat::Cards => write!(f, "cards"),
            ListFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Print the catalog items that pass the given filters")]
pub struct ListArgs {
    /// Catalog file or http(s) URL (defaults to the configured source)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Case-insensitive search over title, author and tags
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Keep items whose FIELD equals VALUE; repeat to accept several values
    #[arg(short = 'f', long = "facet", value_name = "FIELD=VALUE", value_parser = parse_facet)]
    pub facets: Vec<(String, String)>,

    /// Output format
    #[arg(long, default_value_t = ListFormat::Cards)]
    pub format: ListFormat,
}

pub fn execute(args: ListArgs, config_path: Option<&Path>) -> Result<()> {
    let mut session = Session::open(config_path, args.source.as_deref())?;
    debug!("listing {}", session.source);
    session.report_dropped();

    session.store.apply(filters_from_args(&args));
    let visible = session.store.visible();

    let mut writer = io::stdout().lock();
    match args.format {
        ListFormat::Json => write_json(&visible, &mut writer)?,
        ListFormat::Cards => {
            let rendered = render_cards(&visible, &session.view_options());
            write_cards(&rendered, &mut writer)?;
        }
    }
    Ok(())
}

fn filters_from_args(args: &ListArgs) -> FilterState {
    let mut filters = FilterState::new();
    if let Some(term) = &args.search {
        filters.set_search(term.as_str());
    }
    for (field, value) in &args.facets {
        filters.set_facet(field, value, true);
    }
    filters
}

/// Parse `FIELD=VALUE`. Only the first `=` splits, so values may contain `=`.
fn parse_facet(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((field.to_string(), value.trim().to_string()))
}

fn write_cards<W: Write>(rendered: &RenderedList<'_>, mut writer: W) -> io::Result<()> {
    match rendered {
        RenderedList::NoResults { message } => writeln!(writer, "{message}"),
        RenderedList::Cards(cards) => {
            for card in cards {
                for line in CardDisplay::from_card(card).to_cli_lines() {
                    writeln!(writer, "{line}")?;
                }
            }
            Ok(())
        }
    }
}

fn write_json<W: Write>(records: &[&Record], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::ViewOptions;

    fn record(id: &str, title: &str, author: &str) -> Record {
        [("id", id), ("title", title), ("author", author)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_parse_facet() {
        assert_eq!(
            parse_facet("category=Fiction"),
            Ok(("category".to_string(), "Fiction".to_string()))
        );
        assert_eq!(
            parse_facet("type=a=b"),
            Ok(("type".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_facet("type="), Ok(("type".to_string(), String::new())));
        assert!(parse_facet("category").is_err());
        assert!(parse_facet("=Fiction").is_err());
    }

    #[test]
    fn test_write_cards() {
        colored::control::set_override(false);
        let a = record("1", "Alpha", "Jane Doe");
        let b = record("2", "Beta", "John Roe");
        let rendered = render_cards(&[&a, &b], &ViewOptions::default());

        let mut out = Vec::new();
        write_cards(&rendered, &mut out).unwrap();
        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        Alpha
          Jane Doe · 1
        Beta
          John Roe · 2
        ");
    }

    #[test]
    fn test_write_no_results() {
        let rendered = render_cards(&[], &ViewOptions::default());
        let mut out = Vec::new();
        write_cards(&rendered, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No items match your criteria.\n");
    }

    #[test]
    fn test_write_json() {
        let a = record("1", "Alpha", "Jane Doe");
        let mut out = Vec::new();
        write_json(&[&a], &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "author": "Jane Doe", "id": "1", "title": "Alpha" }])
        );
    }
}
