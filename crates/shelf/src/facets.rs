use std::io::{self, Write};
use std::path::Path;

use crate::session::Session;
use anyhow::Result;
use clap::Args;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use shelf_catalog::{Catalog, FacetVocabulary};

pub const NO_FILTERS_MESSAGE: &str = "No filter fields configured.";

#[derive(Args, Debug, Clone)]
#[command(about = "Show the filter options discovered in the catalog")]
pub struct FacetsArgs {
    /// Catalog file or http(s) URL (defaults to the configured source)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,
}

pub fn execute(args: FacetsArgs, config_path: Option<&Path>) -> Result<()> {
    let session = Session::open(config_path, args.source.as_deref())?;
    session.report_dropped();

    let writer = io::stdout().lock();
    write_facet_table(
        session.store.vocabulary(),
        session.store.catalog(),
        writer,
    )?;
    Ok(())
}

fn write_facet_table<W: Write>(
    vocabulary: &FacetVocabulary,
    catalog: &Catalog,
    mut writer: W,
) -> io::Result<()> {
    if vocabulary.is_empty() {
        return writeln!(writer, "{NO_FILTERS_MESSAGE}");
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Filter", "Value", "Items"]);

    for group in vocabulary.groups() {
        for value in &group.values {
            let count = catalog
                .iter()
                .filter(|r| r.get(&group.field) == value.as_str())
                .count();
            let value_cell = if value.is_empty() {
                Cell::new("(empty)").add_attribute(Attribute::Dim)
            } else {
                Cell::new(value)
            };
            table.add_row(vec![Cell::new(&group.label), value_cell, Cell::new(count)]);
        }
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::Record;

    #[test]
    fn test_facet_table_counts_values() {
        let catalog: Catalog = [("Fiction", "Book"), ("Science", "Video"), ("Fiction", "")]
            .into_iter()
            .map(|(category, kind)| {
                [("category", category), ("type", kind)]
                    .into_iter()
                    .collect::<Record>()
            })
            .collect();
        let vocabulary = FacetVocabulary::discover(&catalog, &["category", "type"]);

        let mut out = Vec::new();
        write_facet_table(&vocabulary, &catalog, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let fiction = text
            .lines()
            .find(|l| l.contains("Fiction"))
            .expect("Fiction row");
        assert!(fiction.contains("Category"));
        assert!(fiction.contains('2'));
        assert!(text.contains("(empty)"));
        assert!(text.contains("Type"));
    }

    #[test]
    fn test_no_filter_fields() {
        let catalog: Catalog = [[("category", "Fiction")].into_iter().collect::<Record>()]
            .into_iter()
            .collect();
        let vocabulary = FacetVocabulary::discover::<&str>(&catalog, &[]);

        let mut out = Vec::new();
        write_facet_table(&vocabulary, &catalog, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No filter fields configured.\n");
    }
}
